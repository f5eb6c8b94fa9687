use thiserror::Error;

/// Dataset-level failures. Row-level problems never surface here; the
/// extractor skips those rows and keeps going.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("failed to read source file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to open workbook: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("failed to read csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("workbook has no worksheets")]
    EmptyWorkbook,

    #[error("only {found} records extracted, at least {required} required")]
    InsufficientData { found: usize, required: usize },
}

pub type Result<T> = std::result::Result<T, IngestError>;
