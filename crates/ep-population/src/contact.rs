//! Contact descriptions and the seam between an `AgentGroup` and the queue
//! of the shard that owns it.

use ep_core::{AgentId, EventKey, PlaceId, PlaceRng, Tick};
use ep_disease::{AgeCohort, BehaviorStreams, ContactType, Disease, DiseaseState};
use serde::{Deserialize, Serialize};

/// Who a contact is aimed at, inside the destination place.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum ContactTarget {
    /// A specific agent.
    Agent(AgentId),
    /// A random member of the contactor's cohort other than this agent.
    /// Used when the contactor lives in the destination place.
    AnyoneBut(AgentId),
    /// A random member of the contactor's cohort.
    Anyone,
}

/// What the receiving place needs to know about the contactor.
///
/// Plain data, so it can cross shard boundaries inside a record.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct ContactInfo {
    pub age:   AgeCohort,
    pub state: DiseaseState,
    pub kind:  ContactType,
}

impl ContactInfo {
    #[inline]
    pub fn new(age: AgeCohort, state: DiseaseState, kind: ContactType) -> Self {
        Self { age, state, kind }
    }

    /// Chance that this contact infects a susceptible target.
    #[inline]
    pub fn transmission_probability(&self, disease: &dyn Disease) -> f64 {
        self.kind.intimacy() * disease.base_infectiousness()
    }
}

/// The part of a shard's event queue an `AgentGroup` may touch.
///
/// The engine's queue implements this; tests use a plain in-memory version.
pub trait AgentSchedule {
    /// Current time of the owning shard.
    fn now(&self) -> Tick;

    /// File the compound event of `agent` at `at`, returning its queue key.
    fn insert(&mut self, place: PlaceId, agent: AgentId, at: Tick) -> EventKey;

    /// Withdraw a previously filed event.
    ///
    /// # Panics
    /// Implementations panic when `key` is not queued.
    fn remove(&mut self, key: EventKey);
}

/// Everything a group needs to carry out a contact or an exposure.
///
/// `rng` must be the RNG of the place that owns the group being mutated.
pub struct ContactCtx<'a> {
    pub rng:      &'a mut PlaceRng,
    pub disease:  &'a dyn Disease,
    pub streams:  &'a BehaviorStreams,
    pub schedule: &'a mut dyn AgentSchedule,
}

impl<'a> ContactCtx<'a> {
    pub fn new(
        rng:      &'a mut PlaceRng,
        disease:  &'a dyn Disease,
        streams:  &'a BehaviorStreams,
        schedule: &'a mut dyn AgentSchedule,
    ) -> Self {
        Self { rng, disease, streams, schedule }
    }

    #[inline]
    pub fn now(&self) -> Tick {
        self.schedule.now()
    }
}

/// What a single contact did to its target.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ContactOutcome {
    /// The contactor was not contagious; nothing was drawn.
    NotContagious,
    /// The contactor's cohort has no eligible member in this place.
    NoTarget,
    /// A susceptible target was infected.
    Infected(AgentId),
    /// A susceptible target escaped infection.
    Escaped(AgentId),
    /// An infected target had its exposure moved earlier.
    Corrected(AgentId),
    /// The target was unaffected.
    NoEffect(AgentId),
}
