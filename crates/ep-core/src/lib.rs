//! `ep-core` — foundational types for the `epi_pdes` epidemic engine.
//!
//! This crate is a dependency of every other `ep-*` crate.  It has no `ep-*`
//! dependencies and only a few external ones (`rand`, `thiserror`, plus optional
//! `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `AgentId`, `PlaceId`, `ShardId`                       |
//! | [`time`]        | `Tick`, `Duration`, `TICKS_PER_DAY`                   |
//! | [`key`]         | `EventKey` — the total order of the event queue       |
//! | [`rng`]         | `PlaceRng` (per-place, reproducible)                  |
//! | [`config`]      | `SimConfig`, `StreamSpec`, `VaccinationPolicy`        |
//! | [`error`]       | `EpError`, `EpResult`                                 |
//!
//! # Features
//!
//! | Feature | Effect                                                   |
//! |---------|----------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to ids, time and config.  |

pub mod config;
pub mod error;
pub mod ids;
pub mod key;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{ContactStreamsConfig, SimConfig, StreamSpec, VaccinationPolicy};
pub use error::{EpError, EpResult};
pub use ids::{AgentId, PlaceId, ShardId};
pub use key::EventKey;
pub use rng::PlaceRng;
pub use time::{Duration, TICKS_PER_DAY, Tick};
