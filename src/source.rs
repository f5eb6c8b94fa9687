// Data sources and the fallback strategy that picks between them.

use crate::config::AppConfig;
use crate::error::{IngestError, Result};
use crate::grid::read_grid;
use crate::loader::{parse_grid, ExtractOptions};
use crate::synthetic;
use crate::types::ParsedData;
use chrono::{DateTime, Local};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

pub trait DataSource {
    fn name(&self) -> String;
    fn load(&self) -> Result<ParsedData>;
}

/// Real ingestion from a spreadsheet on disk.
#[derive(Debug, Clone)]
pub struct SpreadsheetSource {
    pub path: PathBuf,
    pub options: ExtractOptions,
}

impl SpreadsheetSource {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            path: config.data_path.clone(),
            options: config.extract_options(),
        }
    }
}

impl DataSource for SpreadsheetSource {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<ParsedData> {
        let grid = read_grid(&self.path)?;
        let (data, report) = parse_grid(&grid, &self.options);
        if report.truncated {
            warn!(
                limit = self.options.max_processed_rows,
                "row limit reached, remaining rows ignored"
            );
        }
        Ok(data)
    }
}

#[derive(Debug, Clone)]
pub struct SyntheticSource {
    pub seed: Option<u64>,
    pub year: i32,
}

impl SyntheticSource {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            seed: config.synthetic_seed,
            year: config.fallback_year,
        }
    }
}

impl DataSource for SyntheticSource {
    fn name(&self) -> String {
        "synthetic".to_string()
    }

    fn load(&self) -> Result<ParsedData> {
        Ok(synthetic::generate(self.seed, self.year))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Primary,
    Fallback,
}

#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub dataset: Arc<ParsedData>,
    pub origin: Origin,
    /// Non-fatal notice for the user when the fallback was used.
    pub warning: Option<String>,
    pub loaded_at: DateTime<Local>,
}

/// Load from `primary`; on error or too few records, substitute `fallback`.
///
/// Always yields a dataset. If even the fallback fails the dataset is empty
/// and the warning carries both errors.
pub fn load_with_fallback(
    primary: &dyn DataSource,
    fallback: &dyn DataSource,
    min_records: usize,
) -> LoadOutcome {
    let primary_result = primary.load().and_then(|data| {
        if data.records.len() < min_records {
            Err(IngestError::InsufficientData {
                found: data.records.len(),
                required: min_records,
            })
        } else {
            Ok(data)
        }
    });

    let err = match primary_result {
        Ok(data) => {
            info!(source = %primary.name(), records = data.records.len(), "dataset loaded");
            return LoadOutcome {
                dataset: Arc::new(data),
                origin: Origin::Primary,
                warning: None,
                loaded_at: Local::now(),
            };
        }
        Err(e) => e,
    };

    warn!(source = %primary.name(), error = %err, "ingestion failed, using fallback data");
    let (dataset, warning) = match fallback.load() {
        Ok(data) => (
            data,
            format!(
                "Could not load {} ({}); showing {} data instead",
                primary.name(),
                err,
                fallback.name()
            ),
        ),
        Err(fallback_err) => (
            ParsedData::default(),
            format!(
                "Could not load {} ({}); fallback {} also failed ({})",
                primary.name(),
                err,
                fallback.name(),
                fallback_err
            ),
        ),
    };

    LoadOutcome {
        dataset: Arc::new(dataset),
        origin: Origin::Fallback,
        warning: Some(warning),
        loaded_at: Local::now(),
    }
}
