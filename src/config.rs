use crate::error::Result;
use crate::loader::{ExtractOptions, ExtractionMode};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

pub const CONFIG_FILE: &str = "disability_monitor.json";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data_path: PathBuf,
    /// Fewer records than this and the synthetic dataset is used instead.
    pub min_records: usize,
    pub max_processed_rows: usize,
    pub header_scan_rows: usize,
    pub fallback_year: i32,
    pub search_limit: usize,
    pub top_regions: usize,
    pub extraction_mode: ExtractionMode,
    pub synthetic_seed: Option<u64>,
    pub preferences_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/database.xlsx"),
            min_records: 10,
            max_processed_rows: 200,
            header_scan_rows: 15,
            fallback_year: 2024,
            search_limit: 100,
            top_regions: 10,
            extraction_mode: ExtractionMode::RowLocal,
            synthetic_seed: None,
            preferences_path: PathBuf::from("view_preferences.json"),
        }
    }
}

impl AppConfig {
    /// Read the config file if there is one; a missing file means defaults.
    pub fn load(path: &Path) -> Result<AppConfig> {
        if !path.exists() {
            return Ok(AppConfig::default());
        }
        let s = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&s)?;
        info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    pub fn extract_options(&self) -> ExtractOptions {
        let file_name = self
            .data_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        ExtractOptions {
            mode: self.extraction_mode,
            max_processed_rows: self.max_processed_rows,
            header_scan_rows: self.header_scan_rows,
            year: None,
        }
        .with_year_from(file_name, self.fallback_year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IngestError;
    use std::io::Write;

    #[test]
    fn missing_file_gives_defaults() {
        let config = AppConfig::load(Path::new("no_such_config.json")).unwrap();
        assert_eq!(config.min_records, 10);
        assert_eq!(config.max_processed_rows, 200);
        assert_eq!(config.extraction_mode, ExtractionMode::RowLocal);
    }

    #[test]
    fn partial_file_overrides_some_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let body = serde_json::json!({
            "data_path": "stats_2023.xlsx",
            "min_records": 3,
            "extraction_mode": "column_headers",
        });
        write!(file, "{}", body).unwrap();
        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.min_records, 3);
        assert_eq!(config.search_limit, 100);
        let opts = config.extract_options();
        assert_eq!(opts.mode, ExtractionMode::ColumnHeaders);
        assert_eq!(opts.year, Some(2023));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = AppConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, IngestError::Json(_)));
    }
}
