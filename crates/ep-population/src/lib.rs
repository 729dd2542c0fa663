//! `ep-population` — who lives in each place and how they reach each other.
//!
//! | Module           | Contents                                                      |
//! |------------------|---------------------------------------------------------------|
//! | [`household`]    | `HouseholdFactory` trait and the US census `UsHouseholdMaker` |
//! | [`contact`]      | `ContactTarget`, `ContactInfo`, `AgentSchedule`, `ContactCtx` |
//! | [`agent_event`]  | `AgentEvent`: one queue entry per infected agent              |
//! | [`group`]        | `AgentGroup`: columnar per-place store and contact semantics  |
//! | [`deploy`]       | `DeployablePopulation`, `ContactDistribution`, `GridGeometry` |
//! | [`loader`]       | CSV place loader                                              |
//!
//! # Scheduling seam
//!
//! An `AgentGroup` never owns a queue.  Whenever an exposure creates or moves
//! a compound event, the group talks to the owning shard through the
//! [`AgentSchedule`] trait, which hands back the [`ep_core::EventKey`] the
//! event was filed under.  The group keeps that key next to the event so it
//! can pull the entry back out when the exposure time is corrected.

pub mod agent_event;
pub mod contact;
pub mod deploy;
pub mod group;
pub mod household;
pub mod loader;


pub use agent_event::{AgentEvent, SubEvent};
pub use contact::{AgentSchedule, ContactCtx, ContactInfo, ContactOutcome, ContactTarget};
pub use deploy::{ContactDistribution, DeployablePopulation, GridGeometry, PlaceSeed};
pub use group::{AgentGroup, GroupCounts, MIN_PLACE_POPULATION};
pub use household::{HouseholdFactory, UsHouseholdMaker, MAX_HOUSEHOLD_SIZE};
pub use loader::{load_places_csv, load_places_reader};
