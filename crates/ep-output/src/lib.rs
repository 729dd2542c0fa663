//! `ep-output` — simulation output writers for the epi_pdes engine.
//!
//! | Writer        | Files created                   |
//! |---------------|---------------------------------|
//! | [`CsvWriter`] | `place_log.csv`, `rounds.csv`   |
//!
//! Writers implement [`OutputWriter`] and are driven by
//! [`SimOutputObserver`], which implements `ep_engine::SimObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use ep_output::{CsvWriter, SimOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = SimOutputObserver::new(writer);
//! engine.run(&mut obs);
//! if let Some(e) = obs.take_error() {
//!     eprintln!("output error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SimOutputObserver;
pub use row::{PlaceLogRow, RoundRow};
pub use writer::OutputWriter;
