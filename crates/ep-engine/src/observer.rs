//! Simulation observer trait for progress reporting and data collection.

use ep_core::Tick;

use crate::{LogEntry, RoundSummary};

/// Callbacks invoked by [`ThreadManager`][crate::ThreadManager] at round
/// boundaries, always from the thread that called `run`.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example — progress printer
///
/// ```rust,ignore
/// struct Progress;
///
/// impl SimObserver for Progress {
///     fn on_round_end(&mut self, s: &RoundSummary) {
///         if s.advanced() {
///             println!("{}: {} infected", s.time, s.infected());
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Log entries written by places during the last run phase, sorted by
    /// time and then place.
    fn on_log_entries(&mut self, _entries: &[LogEntry]) {}

    /// Called after every reconcile phase.
    fn on_round_end(&mut self, _summary: &RoundSummary) {}

    /// Called once when the run finishes.
    fn on_sim_end(&mut self, _final_time: Tick) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
