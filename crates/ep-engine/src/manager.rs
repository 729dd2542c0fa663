//! `ThreadManager` — owns the shards and drives the round loop.
//!
//! # One round
//!
//! ```text
//! ① Run phase        every shard dispatches events up to its barrier
//!                    (in parallel with the `parallel` feature)
//! ② Log drain        per-place log entries go to the observer
//! ③ Reconcile phase  outboxes are collected in shard order
//!                      none pending → next logical round, barrier += period
//!                      some pending → import them, barrier stays put
//! ④ Summary          counters are gathered and handed to the observer
//! ```
//!
//! A logical reconcile round may therefore take several run phases: it only
//! ends once a run phase finishes without any shard producing a cross-shard
//! contact.  Every record is produced in one run phase and dispatched in a
//! later one, never the same.
//!
//! The run stops once no place holds an infected agent and no shard has agent
//! or cross-shard contact events left.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use ep_core::{PlaceId, ShardId, SimConfig, Tick};
use ep_disease::Disease;
use ep_population::GroupCounts;
use tracing::{debug, info};

use crate::{OffThreadContactRecord, Place, Scenario, Shard, ShardStats, SimObserver};

// ── Round reporting ───────────────────────────────────────────────────────────

/// State of one shard at the end of a round.
#[derive(Clone, Debug, PartialEq)]
pub struct ShardSummary {
    pub shard:          ShardId,
    pub counts:         GroupCounts,
    pub new_infections: u32,
    /// Agent and cross-shard contact events queued after the reconcile phase.
    pub pending:        usize,
    pub stats:          ShardStats,
}

/// What happened in one round.
#[derive(Clone, Debug, PartialEq)]
pub struct RoundSummary {
    /// Run phases completed so far, including this one.
    pub round:            u64,
    /// Logical reconcile round the run phase belonged to.
    pub reconcile_number: u64,
    /// Barrier time the run phase stopped at.
    pub time:             Tick,
    /// Cross-shard contacts moved during the reconcile phase.
    pub transfers:        usize,
    pub new_infections:   u32,
    pub totals:           GroupCounts,
    pub shards:           Vec<ShardSummary>,
}

impl RoundSummary {
    #[inline]
    pub fn infected(&self) -> u32 {
        self.totals.infected()
    }

    /// `true` when the round ended a logical reconcile round.
    #[inline]
    pub fn advanced(&self) -> bool {
        self.transfers == 0
    }
}

/// Why [`ThreadManager::run`] returned.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum RunOutcome {
    Finished,
    Paused,
}

// ── ThreadManager ─────────────────────────────────────────────────────────────

/// Drives a set of shards through barrier-synchronised rounds.
///
/// Create via [`EngineBuilder`][crate::EngineBuilder].
pub struct ThreadManager<D: Disease> {
    pub(crate) scenario:         Scenario<D>,
    pub(crate) shards:           Vec<Shard>,
    #[cfg(feature = "parallel")]
    pub(crate) pool:             rayon::ThreadPool,
    pub(crate) round:            u64,
    pub(crate) reconcile_number: u64,
    /// Time of the barrier every shard currently has queued.
    pub(crate) barrier_at:       Tick,
    /// Time the last run phase stopped at.
    pub(crate) clock:            Tick,
    pub(crate) paused:           Arc<AtomicBool>,
    pub(crate) ended:            bool,
}

impl<D: Disease> ThreadManager<D> {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run rounds until the epidemic is over or a pause is requested.
    ///
    /// A paused run can be resumed by clearing the pause flag and calling
    /// `run` again.  [`SimObserver::on_sim_end`] fires once, when the run
    /// finishes.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> RunOutcome {
        info!(
            shards = self.shards.len(),
            places = self.scenario.population.place_count(),
            disease = self.scenario.disease.name(),
            "simulation started"
        );
        while !self.is_finished() {
            if self.is_paused() {
                info!(round = self.round, at = self.clock.0, "simulation paused");
                return RunOutcome::Paused;
            }
            self.step(observer);
        }
        self.end(observer);
        RunOutcome::Finished
    }

    /// Run at most `n` rounds, stopping early once the epidemic is over.
    /// Ignores the pause flag.  Returns the number of rounds run.
    pub fn run_rounds<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> u64 {
        let mut done = 0;
        while done < n && !self.is_finished() {
            self.step(observer);
            done += 1;
        }
        if self.is_finished() {
            self.end(observer);
        }
        done
    }

    /// `true` once nobody is infected and no shard has work queued or
    /// waiting in an outbox.
    ///
    /// A queued cross-shard contact carries an infection that has not landed
    /// yet, so the infected count alone can reach zero one exchange too early.
    pub fn is_finished(&self) -> bool {
        self.shards.iter().all(|s| {
            s.counts().infected() == 0 && s.pending_work() == 0 && s.outbound() == 0
        })
    }

    /// Shared flag; setting it makes [`run`](Self::run) return at the next
    /// round boundary.
    pub fn pause_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.paused)
    }

    pub fn pause(&self) {
        self.paused.store(true, Ordering::Relaxed);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Relaxed)
    }

    // ── Queries ───────────────────────────────────────────────────────────

    #[inline]
    pub fn scenario(&self) -> &Scenario<D> {
        &self.scenario
    }

    #[inline]
    pub fn config(&self) -> &SimConfig {
        &self.scenario.config
    }

    #[inline]
    pub fn shards(&self) -> &[Shard] {
        &self.shards
    }

    /// Run phases completed.
    #[inline]
    pub fn round(&self) -> u64 {
        self.round
    }

    /// Logical reconcile rounds completed.
    #[inline]
    pub fn reconcile_number(&self) -> u64 {
        self.reconcile_number
    }

    /// Time the last run phase stopped at.
    #[inline]
    pub fn now(&self) -> Tick {
        self.clock
    }

    pub fn totals(&self) -> GroupCounts {
        let mut total = GroupCounts::default();
        for shard in &self.shards {
            total.accumulate(&shard.counts());
        }
        total
    }

    /// A place, looked up on the shard that owns it.
    pub fn place(&self, id: PlaceId) -> Option<&Place> {
        if id.index() >= self.scenario.population.place_count() {
            return None;
        }
        let owner = self.scenario.population.owner(id);
        self.shards[owner.index()].place(id)
    }

    // ── Round loop ────────────────────────────────────────────────────────

    fn step<O: SimObserver>(&mut self, observer: &mut O) -> RoundSummary {
        self.round += 1;
        let round = self.round;
        let reconcile_number = self.reconcile_number;

        self.run_phase(round);
        self.clock = self.barrier_at;

        let mut entries = Vec::new();
        for shard in &mut self.shards {
            entries.extend(shard.take_log());
        }
        if !entries.is_empty() {
            entries.sort_by_key(|e| (e.sample.time, e.place));
            observer.on_log_entries(&entries);
        }

        let transfers = self.reconcile(round);

        let mut shards = Vec::with_capacity(self.shards.len());
        let mut totals = GroupCounts::default();
        let mut new_infections = 0;
        for shard in &mut self.shards {
            let summary = ShardSummary {
                shard:          shard.id(),
                counts:         shard.counts(),
                new_infections: shard.take_new_infections(),
                pending:        shard.pending_work(),
                stats:          shard.stats(),
            };
            totals.accumulate(&summary.counts);
            new_infections += summary.new_infections;
            shards.push(summary);
        }

        let summary = RoundSummary {
            round,
            reconcile_number,
            time: self.clock,
            transfers,
            new_infections,
            totals,
            shards,
        };
        observer.on_round_end(&summary);
        summary
    }

    fn run_phase(&mut self, round: u64) {
        let scenario = &self.scenario;
        let shards = &mut self.shards;

        #[cfg(not(feature = "parallel"))]
        {
            for shard in shards.iter_mut() {
                shard.run_to_barrier(round, scenario);
            }
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            self.pool.install(|| {
                shards
                    .par_iter_mut()
                    .for_each(|shard| shard.run_to_barrier(round, scenario));
            });
        }
    }

    /// Move every outbox record to the shard that owns its place and arm the
    /// next barrier.  Returns the number of records moved.
    fn reconcile(&mut self, round: u64) -> usize {
        // Source shards are drained in index order so each inbox sees records
        // in the same order whatever the thread timing was.
        let mut inbound: Vec<Vec<OffThreadContactRecord>> = vec![Vec::new(); self.shards.len()];
        for shard in &mut self.shards {
            for (dest, records) in shard.take_outboxes().into_iter().enumerate() {
                inbound[dest].extend(records);
            }
        }
        let transfers: usize = inbound.iter().map(Vec::len).sum();

        if transfers == 0 {
            self.reconcile_number += 1;
            self.barrier_at = self.barrier_at + self.scenario.config.reconcile_period();
            debug!(
                reconcile = self.reconcile_number,
                round,
                at = self.clock.0,
                "reconcile round complete"
            );
        } else {
            debug!(round, transfers, at = self.clock.0, "exchanging cross-shard contacts");
            self.import_phase(inbound, round + 1);
        }

        for shard in &mut self.shards {
            shard.arm_barrier(self.barrier_at);
        }
        transfers
    }

    fn import_phase(&mut self, inbound: Vec<Vec<OffThreadContactRecord>>, delivery_round: u64) {
        let shards = &mut self.shards;

        #[cfg(not(feature = "parallel"))]
        {
            for (shard, records) in shards.iter_mut().zip(inbound) {
                shard.import(records, delivery_round);
            }
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            self.pool.install(|| {
                shards
                    .par_iter_mut()
                    .zip(inbound.into_par_iter())
                    .for_each(|(shard, records)| shard.import(records, delivery_round));
            });
        }
    }

    fn end<O: SimObserver>(&mut self, observer: &mut O) {
        if self.ended {
            return;
        }
        self.ended = true;
        let totals = self.totals();
        info!(
            rounds = self.round,
            reconcile_rounds = self.reconcile_number,
            at = self.clock.0,
            recovered = totals.recovered,
            susceptible = totals.susceptible,
            "simulation finished"
        );
        observer.on_sim_end(self.clock);
    }
}
