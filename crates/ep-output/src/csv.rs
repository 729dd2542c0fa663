//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `place_log.csv`
//! - `rounds.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{OutputResult, PlaceLogRow, RoundRow};

pub const PLACE_LOG_FILE: &str = "place_log.csv";
pub const ROUNDS_FILE: &str = "rounds.csv";

/// Writes simulation output to two CSV files.
pub struct CsvWriter {
    place_log: Writer<File>,
    rounds:    Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Create the output directory if needed, open (or truncate) both files
    /// and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        std::fs::create_dir_all(dir)?;

        let mut place_log = Writer::from_path(dir.join(PLACE_LOG_FILE))?;
        place_log.write_record([
            "tick",
            "day",
            "place",
            "shard",
            "susceptible",
            "contagious",
            "non_contagious",
            "symptomatic",
            "asymptomatic",
            "recovered",
        ])?;

        let mut rounds = Writer::from_path(dir.join(ROUNDS_FILE))?;
        rounds.write_record([
            "round",
            "reconcile_number",
            "tick",
            "infected",
            "recovered",
            "new_infections",
            "transfers",
        ])?;

        Ok(Self {
            place_log,
            rounds,
            finished: false,
        })
    }
}

impl OutputWriter for CsvWriter {
    fn write_place_log(&mut self, rows: &[PlaceLogRow]) -> OutputResult<()> {
        for row in rows {
            self.place_log.write_record(&[
                row.tick.to_string(),
                format!("{:.2}", row.day),
                row.place.to_string(),
                row.shard.to_string(),
                row.susceptible.to_string(),
                row.contagious.to_string(),
                row.non_contagious.to_string(),
                row.symptomatic.to_string(),
                row.asymptomatic.to_string(),
                row.recovered.to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_round(&mut self, row: &RoundRow) -> OutputResult<()> {
        self.rounds.write_record(&[
            row.round.to_string(),
            row.reconcile_number.to_string(),
            row.tick.to_string(),
            row.infected.to_string(),
            row.recovered.to_string(),
            row.new_infections.to_string(),
            row.transfers.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.place_log.flush()?;
        self.rounds.flush()?;
        Ok(())
    }
}
