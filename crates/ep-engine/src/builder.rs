//! Fluent builder for constructing a [`ThreadManager`].

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use ep_core::{EpResult, ShardId, SimConfig, Tick};
use ep_disease::{BehaviorStreams, Disease};
use ep_population::DeployablePopulation;
use tracing::{info, warn};

use crate::{EngineError, EngineResult, Scenario, Shard, ThreadManager};

/// Fluent builder for [`ThreadManager<D>`].
///
/// # Required inputs
///
/// - [`SimConfig`]: run number, shard count, periods, interventions
/// - [`DeployablePopulation`]: dealt to exactly `config.num_threads` shards
/// - `D: Disease`: the natural history of the infection
///
/// # Optional inputs (have defaults)
///
/// | Method              | Default                                        |
/// |---------------------|------------------------------------------------|
/// | `.streams(s)`       | Built from `config.contact_streams`            |
/// | `.pool_threads(n)`  | `config.num_threads` (needs `parallel`)        |
///
/// # Example
///
/// ```rust,ignore
/// let population = DeployablePopulation::from_seeds(&seeds, &grid, config.scale, config.num_threads)?;
/// let mut engine = EngineBuilder::new(config, population, SwineFlu).build()?;
/// engine.run(&mut NoopObserver);
/// ```
pub struct EngineBuilder<D: Disease> {
    config:       SimConfig,
    population:   DeployablePopulation,
    disease:      D,
    streams:      Option<BehaviorStreams>,
    pool_threads: Option<usize>,
}

impl<D: Disease> EngineBuilder<D> {
    pub fn new(config: SimConfig, population: DeployablePopulation, disease: D) -> Self {
        Self {
            config,
            population,
            disease,
            streams:      None,
            pool_threads: None,
        }
    }

    /// Use prebuilt contact streams instead of `config.contact_streams`.
    pub fn streams(mut self, streams: BehaviorStreams) -> Self {
        self.streams = Some(streams);
        self
    }

    /// Size of the worker pool.  Shards are the unit of work, so more threads
    /// than shards only adds idle workers; fewer makes shards take turns.
    /// Results do not depend on this value.
    pub fn pool_threads(mut self, n: usize) -> Self {
        self.pool_threads = Some(n);
        self
    }

    /// Validate inputs, build every shard, seed the initial cases and return
    /// a ready-to-run [`ThreadManager`].
    pub fn build(self) -> EngineResult<ThreadManager<D>> {
        self.config.validate()?;

        // ── Validate shape ────────────────────────────────────────────────
        let shards = self.config.num_threads;
        if self.population.num_shards() != shards {
            return Err(EngineError::ShapeMismatch {
                expected: shards,
                got:      self.population.num_shards(),
                what:     "population shard count",
            });
        }
        if shards > self.population.place_count() {
            return Err(EngineError::Config(format!(
                "{shards} shards but only {} places; every shard needs a place",
                self.population.place_count()
            )));
        }
        if self.pool_threads == Some(0) {
            return Err(EngineError::Config("the worker pool needs at least one thread".into()));
        }

        let streams = match self.streams {
            Some(s) => s,
            None => BehaviorStreams::from_config(&self.config.contact_streams)?,
        };
        let scenario = Scenario {
            config:     self.config,
            population: self.population,
            disease:    self.disease,
            streams,
        };

        // ── Build shards ──────────────────────────────────────────────────
        #[cfg(feature = "parallel")]
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.pool_threads.unwrap_or(shards))
            .thread_name(|i| format!("ep-worker-{i}"))
            .build()
            .map_err(|e| EngineError::ThreadPool(e.to_string()))?;

        #[cfg(feature = "parallel")]
        let mut shard_list: Vec<Shard> = {
            use rayon::prelude::*;
            pool.install(|| {
                (0..shards)
                    .into_par_iter()
                    .map(|i| Shard::build(ShardId(i as u16), &scenario))
                    .collect::<EpResult<Vec<_>>>()
            })?
        };

        #[cfg(not(feature = "parallel"))]
        let mut shard_list: Vec<Shard> = (0..shards)
            .map(|i| Shard::build(ShardId(i as u16), &scenario))
            .collect::<EpResult<Vec<_>>>()?;

        // ── Seed initial cases ────────────────────────────────────────────
        let largest = scenario.population.largest_place();
        let owner = scenario.population.owner(largest);
        let wanted = scenario.config.initial_cases;
        let seeded = shard_list[owner.index()].seed_cases(largest, wanted, &scenario);
        if seeded < wanted {
            warn!(place = largest.0, wanted, seeded, "ran out of susceptible adults while seeding");
        }
        info!(place = largest.0, shard = owner.0, seeded, "initial cases seeded");

        let barrier_at = Tick::ZERO + scenario.config.reconcile_period();
        Ok(ThreadManager {
            scenario,
            shards: shard_list,
            #[cfg(feature = "parallel")]
            pool,
            round: 0,
            reconcile_number: 0,
            barrier_at,
            clock: Tick::ZERO,
            paused: Arc::new(AtomicBool::new(false)),
            ended: false,
        })
    }
}
