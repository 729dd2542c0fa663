//! `ep-engine` — barrier-synchronised parallel discrete-event engine.
//!
//! # Layout
//!
//! | Module         | Contents                                                 |
//! |----------------|----------------------------------------------------------|
//! | [`event`]      | `Event`, `EventQueue`, `OffThreadContactRecord`          |
//! | [`place`]      | `Place`, `PlaceRecord`, `PlaceSample`, `LogEntry`        |
//! | [`scenario`]   | `Scenario`: the read-only inputs shared by all shards    |
//! | [`shard`]      | `Shard`: one worker's places, queue and outboxes         |
//! | [`manager`]    | `ThreadManager`: the round loop                          |
//! | [`observer`]   | `SimObserver` hooks                                      |
//! | [`builder`]    | `EngineBuilder`                                          |
//!
//! Places are dealt to shards round-robin.  Each shard runs its own event
//! loop up to a shared barrier time; random contacts that cross a shard
//! boundary are buffered and exchanged at the barrier, then replayed at the
//! time they were made.  Given the same run number and shard count a run is
//! reproducible however the worker threads interleave.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                      |
//! |------------|-------------------------------------------------------------|
//! | `parallel` | Runs the run phase and contact imports on a Rayon pool.     |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use ep_core::SimConfig;
//! use ep_disease::SwineFlu;
//! use ep_engine::{EngineBuilder, NoopObserver};
//! use ep_population::{DeployablePopulation, GridGeometry};
//!
//! let config = SimConfig { num_threads: 4, ..SimConfig::default() };
//! let population = DeployablePopulation::from_seeds(&seeds, &GridGeometry::default(), 1.0, 4)?;
//! let mut engine = EngineBuilder::new(config, population, SwineFlu).build()?;
//! engine.run(&mut NoopObserver);
//! ```

pub mod builder;
pub mod error;
pub mod event;
pub mod manager;
pub mod observer;
pub mod place;
pub mod scenario;
pub mod shard;

#[cfg(test)]
mod tests;

pub use builder::EngineBuilder;
pub use error::{EngineError, EngineResult};
pub use event::{Event, EventQueue, OffThreadContactRecord};
pub use manager::{RoundSummary, RunOutcome, ShardSummary, ThreadManager};
pub use observer::{NoopObserver, SimObserver};
pub use place::{LogEntry, Place, PlaceRecord, PlaceSample};
pub use scenario::Scenario;
pub use shard::{Shard, ShardStats};
