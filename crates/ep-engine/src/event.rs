//! Shard event queue.
//!
//! Every shard owns one `EventQueue`: a `BTreeMap` keyed by [`EventKey`], so
//! popping the minimum always yields the earliest event with ties broken by
//! place index and then insertion order.  Keys never collide because the
//! sequence number is drawn from a per-queue counter; a collision anyway is a
//! broken invariant and panics.

use std::collections::BTreeMap;

use ep_core::{AgentId, EventKey, PlaceId, Tick};
use ep_population::{AgentSchedule, ContactInfo, ContactTarget};

// ── Events ────────────────────────────────────────────────────────────────────

/// Payload of one queue entry.  The place it concerns is part of its key.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Event {
    /// The compound event of an infected agent is due.
    Agent { agent: AgentId },
    /// Record a log entry for the place and reschedule.
    LogUpdate,
    /// The shard's barrier: stop the run phase here.
    Reconcile,
    /// A contact made by an agent on another shard, delivered at the time it
    /// was made.
    OffThreadContact {
        target: ContactTarget,
        info:   ContactInfo,
        /// Exchange round in which the record was produced.
        round:  u64,
    },
}

impl Event {
    /// Agent and cross-shard contact events.  Log updates and the barrier are
    /// bookkeeping and never keep a simulation alive.
    #[inline]
    pub fn is_work(&self) -> bool {
        matches!(self, Event::Agent { .. } | Event::OffThreadContact { .. })
    }
}

/// A random contact whose destination place lives on another shard.
///
/// Produced during a run phase into the source shard's outbox and imported by
/// the destination shard during the following reconcile phase.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct OffThreadContactRecord {
    pub time:   Tick,
    pub place:  PlaceId,
    pub target: ContactTarget,
    pub info:   ContactInfo,
    pub round:  u64,
}

// ── EventQueue ────────────────────────────────────────────────────────────────

/// Ordered event storage plus the shard's current time.
#[derive(Debug, Default)]
pub struct EventQueue {
    events:   BTreeMap<EventKey, Event>,
    now:      Tick,
    next_seq: u64,
    work:     usize,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `event` for `place` at `time`, returning its key.
    pub fn push(&mut self, time: Tick, place: PlaceId, event: Event) -> EventKey {
        assert!(time.occurs(), "cannot queue {event:?} for {place} at NEVER");
        let key = EventKey::new(time, place, self.next_seq);
        self.next_seq += 1;
        self.insert_keyed(key, event);
        key
    }

    /// Insert under an explicit key.
    ///
    /// # Panics
    /// Panics if the key is already queued.
    pub(crate) fn insert_keyed(&mut self, key: EventKey, event: Event) {
        if event.is_work() {
            self.work += 1;
        }
        if let Some(old) = self.events.insert(key, event) {
            panic!("duplicate event key {key}: {old:?} and {event:?}");
        }
    }

    /// Remove and return the earliest event.  Does not move `now`.
    pub fn pop(&mut self) -> Option<(EventKey, Event)> {
        let (key, event) = self.events.pop_first()?;
        if event.is_work() {
            self.work -= 1;
        }
        Some((key, event))
    }

    #[inline]
    pub fn now(&self) -> Tick {
        self.now
    }

    /// Set the clock to the time of the event being dispatched.  Imported
    /// contacts may carry times earlier than the last barrier, so this can
    /// move backwards.
    #[inline]
    pub(crate) fn set_now(&mut self, now: Tick) {
        self.now = now;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Queued agent and cross-shard contact events.
    #[inline]
    pub fn pending_work(&self) -> usize {
        self.work
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EventKey, &Event)> + '_ {
        self.events.iter()
    }
}

impl AgentSchedule for EventQueue {
    fn now(&self) -> Tick {
        self.now
    }

    fn insert(&mut self, place: PlaceId, agent: AgentId, at: Tick) -> EventKey {
        self.push(at, place, Event::Agent { agent })
    }

    fn remove(&mut self, key: EventKey) {
        match self.events.remove(&key) {
            Some(Event::Agent { .. }) => self.work -= 1,
            Some(other) => panic!("key {key} names {other:?}, not an agent event"),
            None => panic!("withdrawn agent event {key} is not queued"),
        }
    }
}
