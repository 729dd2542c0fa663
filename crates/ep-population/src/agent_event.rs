//! `AgentEvent` — the compound event of one infected agent.
//!
//! # One queue entry per infected agent
//!
//! Disease progression and the three contact behaviors each have their own
//! next-occurrence time, but the agent is filed in its shard's queue only
//! once, at the earliest of the four.  Dispatch runs exactly one sub-event
//! (see [`AgentEvent::due`]), redraws that sub-event's next time, and the
//! caller re-files the agent at the new minimum.  Queue size therefore tracks
//! the number of infected agents, not the population.
//!
//! Once the disease timeline has delivered RECOVERED the event is finished
//! and is never filed again.

use ep_core::{EventKey, PlaceRng, Tick};
use ep_disease::{BehaviorStream, BehaviorStreams, Disease, DiseaseState, DiseaseTimeline};

/// The four behaviors multiplexed by an [`AgentEvent`].
///
/// Declared in dispatch precedence: when several sub-events share the
/// earliest time, the first one listed wins.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum SubEvent {
    Disease,
    RandomContact,
    FamilyContact,
    RepeatableContact,
}

#[derive(Copy, Clone, Debug)]
pub struct AgentEvent {
    timeline:   DiseaseTimeline,
    random_at:  Tick,
    family_at:  Tick,
    repeat_at:  Tick,
    has_family: bool,
    /// Where the event is currently filed, if anywhere.
    key:        Option<EventKey>,
}

impl AgentEvent {
    /// Draw the timeline and the first occurrence of every contact behavior
    /// for an agent exposed at `exposed_at`.
    ///
    /// Contacts are counted from the onset of contagiousness.  Agents without
    /// household-mates never get a family contact.
    pub fn draw(
        exposed_at: Tick,
        has_family: bool,
        disease:    &dyn Disease,
        streams:    &BehaviorStreams,
        rng:        &mut PlaceRng,
    ) -> Self {
        let timeline = DiseaseTimeline::draw(exposed_at, disease, rng);
        let start = timeline.contagious_at();
        let family_at = if has_family {
            streams.family.next_event(start, rng)
        } else {
            Tick::NEVER
        };
        let random_at = streams.random.next_event(start, rng);
        let repeat_at = streams.repeatable.next_event(start, rng);
        Self {
            timeline,
            random_at,
            family_at,
            repeat_at,
            has_family,
            key: None,
        }
    }

    /// Earliest pending sub-event; the time this event is filed at.
    #[inline]
    pub fn time(&self) -> Tick {
        self.timeline
            .next_time()
            .min(self.random_at)
            .min(self.family_at)
            .min(self.repeat_at)
    }

    /// The sub-event that fires at [`time`](Self::time).
    ///
    /// # Panics
    /// Panics when no sub-event is pending.
    pub fn due(&self) -> SubEvent {
        let t = self.time();
        if !t.occurs() {
            panic!("agent event has nothing left to dispatch");
        }
        if self.timeline.next_time() == t {
            SubEvent::Disease
        } else if self.random_at == t {
            SubEvent::RandomContact
        } else if self.family_at == t {
            SubEvent::FamilyContact
        } else if self.repeat_at == t {
            SubEvent::RepeatableContact
        } else {
            panic!("agent event time {t} matches none of its sub-events")
        }
    }

    /// Consume the next disease progress step and return the new state.
    pub fn advance_disease(&mut self) -> DiseaseState {
        self.timeline.pop().state
    }

    /// Redraw the next occurrence of a contact sub-event that just fired at
    /// `now`.
    ///
    /// # Panics
    /// Panics for [`SubEvent::Disease`], whose times are fixed at exposure.
    pub fn redraw_contact(
        &mut self,
        which:   SubEvent,
        now:     Tick,
        streams: &BehaviorStreams,
        rng:     &mut PlaceRng,
    ) {
        match which {
            SubEvent::RandomContact     => self.random_at = streams.random.next_event(now, rng),
            SubEvent::FamilyContact     => self.family_at = streams.family.next_event(now, rng),
            SubEvent::RepeatableContact => self.repeat_at = streams.repeatable.next_event(now, rng),
            SubEvent::Disease => panic!("disease progress times are not redrawn"),
        }
    }

    /// A fresh event for the same agent exposed at the earlier `exposed_at`.
    pub fn redraw_from(
        &self,
        exposed_at: Tick,
        disease:    &dyn Disease,
        streams:    &BehaviorStreams,
        rng:        &mut PlaceRng,
    ) -> Self {
        Self::draw(exposed_at, self.has_family, disease, streams, rng)
    }

    /// `true` once RECOVERED has been delivered.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.timeline.is_finished()
    }

    #[inline]
    pub fn exposed_at(&self) -> Tick {
        self.timeline.exposed_at()
    }

    #[inline]
    pub fn timeline(&self) -> &DiseaseTimeline {
        &self.timeline
    }

    #[inline]
    pub fn has_family(&self) -> bool {
        self.has_family
    }

    #[inline]
    pub fn key(&self) -> Option<EventKey> {
        self.key
    }

    #[inline]
    pub fn set_key(&mut self, key: Option<EventKey>) {
        self.key = key;
    }

    /// Next time of one sub-event.
    pub fn sub_time(&self, which: SubEvent) -> Tick {
        match which {
            SubEvent::Disease           => self.timeline.next_time(),
            SubEvent::RandomContact     => self.random_at,
            SubEvent::FamilyContact     => self.family_at,
            SubEvent::RepeatableContact => self.repeat_at,
        }
    }
}
