//! The `OutputWriter` trait implemented by all backend writers.

use crate::{OutputResult, PlaceLogRow, RoundRow};

/// Trait implemented by output backends.
///
/// All methods are infallible from the observer's perspective: errors are
/// stored internally and retrieved with
/// [`SimOutputObserver::take_error`][crate::SimOutputObserver::take_error].
pub trait OutputWriter {
    /// Write a batch of per-place log rows.
    fn write_place_log(&mut self, rows: &[PlaceLogRow]) -> OutputResult<()>;

    /// Write one round summary row.
    fn write_round(&mut self, row: &RoundRow) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent; safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
