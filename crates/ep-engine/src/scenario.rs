//! The read-only inputs shared by every shard during a run.

use ep_core::SimConfig;
use ep_disease::{AgeCohort, BehaviorStreams, Disease};
use ep_population::DeployablePopulation;

/// Configuration, population, disease and contact streams of one run.
///
/// Shards borrow this immutably from the run phase's worker threads, so
/// every field is `Sync`.
pub struct Scenario<D: Disease> {
    pub config:     SimConfig,
    pub population: DeployablePopulation,
    pub disease:    D,
    pub streams:    BehaviorStreams,
}

impl<D: Disease> Scenario<D> {
    /// Whether a random or repeatable contact by an agent of `age` goes
    /// ahead.  `draw` is only called when schools are not keeping the
    /// contactor home.
    pub(crate) fn contact_allowed(&self, age: AgeCohort, draw: impl FnOnce() -> f64) -> bool {
        if self.config.schools_closed && age == AgeCohort::Child {
            return false;
        }
        draw() < self.config.contact_probability()
    }
}
