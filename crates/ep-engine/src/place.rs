//! A place as a shard holds it: its agents, its RNG, and its log.

use ep_core::{PlaceId, PlaceRng, ShardId, Tick};
use ep_population::{AgentGroup, GroupCounts};
use serde::Serialize;

/// Counters of one place at one log update.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize)]
pub struct PlaceSample {
    pub time:   Tick,
    pub counts: GroupCounts,
}

/// A [`PlaceSample`] tagged with where it came from, as handed to observers.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize)]
pub struct LogEntry {
    pub place:  PlaceId,
    pub shard:  ShardId,
    pub sample: PlaceSample,
}

/// Everything logged for one place over a run.
#[derive(Clone, Debug, Default)]
pub struct PlaceRecord {
    pub samples:        Vec<PlaceSample>,
    /// Time of the one-shot vaccination, if it happened.
    pub vaccinated_at:  Option<Tick>,
    pub vaccinated:     u32,
}

pub struct Place {
    pub(crate) id:     PlaceId,
    pub(crate) rng:    PlaceRng,
    pub(crate) group:  AgentGroup,
    pub(crate) record: PlaceRecord,
}

impl Place {
    pub(crate) fn new(id: PlaceId, rng: PlaceRng, group: AgentGroup) -> Self {
        Self { id, rng, group, record: PlaceRecord::default() }
    }

    #[inline]
    pub fn id(&self) -> PlaceId {
        self.id
    }

    #[inline]
    pub fn group(&self) -> &AgentGroup {
        &self.group
    }

    #[inline]
    pub fn record(&self) -> &PlaceRecord {
        &self.record
    }

    #[inline]
    pub fn counts(&self) -> GroupCounts {
        self.group.counts()
    }
}
