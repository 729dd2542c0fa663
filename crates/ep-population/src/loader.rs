//! CSV place loader.
//!
//! # CSV format
//!
//! One row per populated grid cell.  Place IDs are assigned in file order.
//!
//! ```csv
//! population,x,y
//! 120000,14,3
//! 4500,15,3
//! 880,15,4
//! ```
//!
//! Rows with a zero population are skipped so sparse grid exports can be
//! fed in directly; every other row becomes one place.

use std::io::Read;
use std::path::Path;

use ep_core::{EpError, EpResult};
use serde::Deserialize;
use tracing::debug;

use crate::PlaceSeed;

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct PlaceRecord {
    population: u32,
    x:          f64,
    y:          f64,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load place seeds from a CSV file.
pub fn load_places_csv(path: &Path) -> EpResult<Vec<PlaceSeed>> {
    let file = std::fs::File::open(path)?;
    load_places_reader(file)
}

/// Like [`load_places_csv`] but accepts any `Read` source.
pub fn load_places_reader<R: Read>(reader: R) -> EpResult<Vec<PlaceSeed>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut seeds = Vec::new();
    let mut skipped = 0usize;

    for (line, result) in csv_reader.deserialize::<PlaceRecord>().enumerate() {
        let row = result.map_err(|e| EpError::Parse(format!("place row {}: {e}", line + 1)))?;
        if !(row.x.is_finite() && row.y.is_finite()) {
            return Err(EpError::Parse(format!(
                "place row {}: coordinates ({}, {}) are not finite",
                line + 1,
                row.x,
                row.y
            )));
        }
        if row.population == 0 {
            skipped += 1;
            continue;
        }
        seeds.push(PlaceSeed { population: row.population, x: row.x, y: row.y });
    }

    debug!(places = seeds.len(), skipped, "loaded place seeds");
    Ok(seeds)
}
