//! Plain data row types written by output backends.

use ep_engine::{LogEntry, RoundSummary};

/// One place's counters at one log update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaceLogRow {
    pub tick:           u64,
    /// `tick` in fractional days.
    pub day:            f64,
    pub place:          u32,
    pub shard:          u16,
    pub susceptible:    u32,
    pub contagious:     u32,
    pub non_contagious: u32,
    pub symptomatic:    u32,
    pub asymptomatic:   u32,
    pub recovered:      u32,
}

impl From<&LogEntry> for PlaceLogRow {
    fn from(e: &LogEntry) -> Self {
        let c = &e.sample.counts;
        Self {
            tick:           e.sample.time.0,
            day:            e.sample.time.as_days(),
            place:          e.place.0,
            shard:          e.shard.0,
            susceptible:    c.susceptible,
            contagious:     c.contagious,
            non_contagious: c.non_contagious,
            symptomatic:    c.symptomatic,
            asymptomatic:   c.asymptomatic,
            recovered:      c.recovered,
        }
    }
}

/// Global totals after one engine round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundRow {
    pub round:            u64,
    pub reconcile_number: u64,
    pub tick:             u64,
    pub infected:         u32,
    pub recovered:        u32,
    pub new_infections:   u32,
    pub transfers:        u64,
}

impl From<&RoundSummary> for RoundRow {
    fn from(s: &RoundSummary) -> Self {
        Self {
            round:            s.round,
            reconcile_number: s.reconcile_number,
            tick:             s.time.0,
            infected:         s.infected(),
            recovered:        s.totals.recovered,
            new_infections:   s.new_infections,
            transfers:        s.transfers as u64,
        }
    }
}
