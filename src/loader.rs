use crate::grid::CellGrid;
use crate::header::{classify_header, locate_header};
use crate::reports::summarize;
use crate::types::{Gender, ParsedData, Record};
use crate::util::{contains_folded, positive_count, strip_region_code, year_from_file_name};
use serde::Deserialize;
use tracing::{debug, info};

/// Markers of aggregate rows that would double count the detail rows.
const SUBTOTAL_MARKERS: &[&str] = &["소계", "합계", "subtotal", "sum total"];
const GRAND_TOTAL_TYPES: &[&str] = &["총계", "grand total"];
const NATIONWIDE_REGIONS: &[&str] = &["전국", "nationwide"];

/// Row-local layout: region, type, total, female, male.
const MIN_ROW_CELLS: usize = 5;
const COL_REGION: usize = 0;
const COL_TYPE: usize = 1;
const COL_TOTAL: usize = 2;
const COL_FEMALE: usize = 3;
const COL_MALE: usize = 4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMode {
    /// Each row carries region, type and the three gender counts.
    #[default]
    RowLocal,
    /// Gender and type are encoded in the header of every count column.
    ColumnHeaders,
}

#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub mode: ExtractionMode,
    pub max_processed_rows: usize,
    pub header_scan_rows: usize,
    pub year: Option<i32>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            mode: ExtractionMode::RowLocal,
            max_processed_rows: 200,
            header_scan_rows: 15,
            year: Some(2024),
        }
    }
}

impl ExtractOptions {
    /// Year comes from the file name when it carries one, otherwise `fallback`.
    pub fn with_year_from(mut self, file_name: &str, fallback: i32) -> Self {
        self.year = Some(year_from_file_name(file_name).unwrap_or(fallback));
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractReport {
    pub total_rows: usize,
    pub header_row: usize,
    pub processed_rows: usize,
    pub skipped_rows: usize,
    pub records: usize,
    pub truncated: bool,
}

/// Locate the header, extract records and summarize them.
pub fn parse_grid(grid: &CellGrid, opts: &ExtractOptions) -> (ParsedData, ExtractReport) {
    let header_row = locate_header(grid, opts.header_scan_rows);
    let (records, report) = extract_records(grid, header_row, opts);
    info!(
        rows = report.total_rows,
        header_row,
        processed = report.processed_rows,
        skipped = report.skipped_rows,
        records = report.records,
        "parsed grid"
    );
    let summary = summarize(&records);
    (ParsedData { records, summary }, report)
}

pub fn extract_records(
    grid: &CellGrid,
    header_row: usize,
    opts: &ExtractOptions,
) -> (Vec<Record>, ExtractReport) {
    let mut records = Vec::new();
    let mut report = ExtractReport {
        total_rows: grid.len(),
        header_row,
        ..Default::default()
    };

    // Most recent non-blank region below the header, for merged region cells.
    let mut last_region: Option<String> = None;
    for i in (header_row + 1)..grid.len() {
        if report.processed_rows >= opts.max_processed_rows {
            report.truncated = true;
            break;
        }
        let before = records.len();
        let carried = last_region.as_deref();
        let accepted = match opts.mode {
            ExtractionMode::RowLocal => row_local(grid, i, carried, opts.year, &mut records),
            ExtractionMode::ColumnHeaders => {
                column_headers(grid, header_row, i, carried, opts.year, &mut records)
            }
        };
        if accepted {
            report.processed_rows += 1;
            debug!(row = i, emitted = records.len() - before, "row accepted");
        } else {
            report.skipped_rows += 1;
            debug!(row = i, "row skipped");
        }
        let cell = grid.cell(i, COL_REGION);
        if !cell.is_blank() {
            last_region = Some(cell.text());
        }
    }

    report.records = records.len();
    (records, report)
}

/// Region of row `i`; a blank cell takes `carried`, the last region seen below the header.
fn resolve_region(grid: &CellGrid, i: usize, carried: Option<&str>) -> Option<String> {
    let cell = grid.cell(i, COL_REGION);
    let raw = if cell.is_blank() {
        carried?.to_string()
    } else {
        cell.text()
    };
    let region = strip_region_code(&raw);
    if region.is_empty() || is_subtotal(&region) || is_nationwide(&region) {
        return None;
    }
    Some(region)
}

fn is_subtotal(s: &str) -> bool {
    SUBTOTAL_MARKERS.iter().any(|m| contains_folded(s, m))
}

fn is_grand_total(s: &str) -> bool {
    GRAND_TOTAL_TYPES.iter().any(|m| s.eq_ignore_ascii_case(m))
}

fn is_nationwide(s: &str) -> bool {
    NATIONWIDE_REGIONS.iter().any(|m| s.eq_ignore_ascii_case(m))
}

fn make_record(
    region: &str,
    gender: Gender,
    disability_type: &str,
    count: u64,
    year: Option<i32>,
    id: String,
) -> Record {
    Record {
        id,
        region: region.to_string(),
        gender,
        disability_type: disability_type.to_string(),
        count,
        year,
    }
}

fn row_local(
    grid: &CellGrid,
    i: usize,
    carried: Option<&str>,
    year: Option<i32>,
    out: &mut Vec<Record>,
) -> bool {
    if grid.row_len(i) < MIN_ROW_CELLS {
        return false;
    }
    let Some(region) = resolve_region(grid, i, carried) else {
        return false;
    };
    let disability_type = grid.cell(i, COL_TYPE).text();
    if disability_type.is_empty()
        || is_subtotal(&disability_type)
        || is_grand_total(&disability_type)
    {
        return false;
    }

    let columns = [
        (Gender::Total, COL_TOTAL),
        (Gender::Female, COL_FEMALE),
        (Gender::Male, COL_MALE),
    ];
    for (gender, col) in columns {
        let Some(count) = grid.cell(i, col).number().and_then(positive_count) else {
            continue;
        };
        let id = format!("{}_{}_{}_{}", region, gender.label(), disability_type, i);
        out.push(make_record(&region, gender, &disability_type, count, year, id));
    }
    true
}

fn column_headers(
    grid: &CellGrid,
    header_row: usize,
    i: usize,
    carried: Option<&str>,
    year: Option<i32>,
    out: &mut Vec<Record>,
) -> bool {
    if grid.row_len(i) < 2 {
        return false;
    }
    let Some(region) = resolve_region(grid, i, carried) else {
        return false;
    };

    let width = grid.row_len(i).min(grid.row_len(header_row));
    for col in 1..width {
        let Some(count) = grid.cell(i, col).number().and_then(positive_count) else {
            continue;
        };
        let header = grid.cell(header_row, col).text();
        if header.is_empty() {
            continue;
        }
        let (gender, disability_type) = classify_header(&header);
        let id = format!("{}_{}_{}_{}_{}", region, gender.label(), disability_type, i, col);
        out.push(make_record(&region, gender, disability_type, count, year, id));
    }
    true
}
