// Ingestion and statistics core for the disability monitoring dashboard.
//
// A spreadsheet is read into a `CellGrid`, the header row is located, rows
// are normalized into `Record`s and summarized. The `Controller` owns the
// resulting dataset and the active filter and serves memoized `Stats` to the
// presentation layer.

pub mod config;
pub mod error;
pub mod grid;
pub mod header;
pub mod loader;
pub mod output;
pub mod prefs;
pub mod reports;
pub mod source;
pub mod state;
pub mod synthetic;
pub mod types;
pub mod util;

pub use error::{IngestError, Result};
pub use state::Controller;
pub use types::{Filter, FilterPatch, Gender, ParsedData, Record, Stats};
