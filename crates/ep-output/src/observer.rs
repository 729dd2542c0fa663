//! `SimOutputObserver<W>` — bridges `SimObserver` to an `OutputWriter`.

use ep_core::Tick;
use ep_engine::{LogEntry, RoundSummary, SimObserver};

use crate::row::{PlaceLogRow, RoundRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes place log entries and round summaries to any
/// [`OutputWriter`] backend.
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `engine.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer:     W,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, last_error: None }
    }

    /// Take the stored write error (if any) after `engine.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the run).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_log_entries(&mut self, entries: &[LogEntry]) {
        let rows: Vec<PlaceLogRow> = entries.iter().map(PlaceLogRow::from).collect();
        let result = self.writer.write_place_log(&rows);
        self.store_err(result);
    }

    fn on_round_end(&mut self, summary: &RoundSummary) {
        let result = self.writer.write_round(&RoundRow::from(summary));
        self.store_err(result);
    }

    fn on_sim_end(&mut self, _final_time: Tick) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
