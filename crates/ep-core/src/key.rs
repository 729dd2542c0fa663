//! `EventKey` — the total order every shard queue is sorted by.
//!
//! Keys compare by time, then place index, then the per-shard sequence number.
//! The derive order of the fields *is* the contract, so do not reorder them.

use std::fmt;

use crate::{PlaceId, Tick};

/// Position of an event in a shard's queue.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct EventKey {
    pub time:  Tick,
    pub place: PlaceId,
    /// Unique per shard; only breaks ties.
    pub seq:   u64,
}

impl EventKey {
    #[inline]
    pub fn new(time: Tick, place: PlaceId, seq: u64) -> Self {
        Self { time, place, seq }
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}#{}", self.time, self.place, self.seq)
    }
}
