// Cell grid adapter over spreadsheet files.
//
// Workbooks (xlsx, xls, xlsb, ods) go through `calamine`; `.csv` files are
// read with the `csv` crate. Only the first worksheet is used.

use crate::error::{IngestError, Result};
use crate::util::{clean_text, parse_f64_safe};
use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Range, Reader};
use csv::ReaderBuilder;
use std::io::{Cursor, Read, Seek};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

static EMPTY: Cell = Cell::Empty;

impl Cell {
    /// Cleaned display text; integral numbers print without a fraction.
    pub fn text(&self) -> String {
        match self {
            Cell::Text(s) => clean_text(s),
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Cell::Number(n) => n.to_string(),
            Cell::Empty => String::new(),
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) => false,
            Cell::Empty => true,
        }
    }

    pub fn number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) if n.is_finite() => Some(*n),
            Cell::Number(_) => None,
            Cell::Text(s) => parse_f64_safe(Some(s.as_str())),
            Cell::Empty => None,
        }
    }
}

impl From<&Data> for Cell {
    fn from(value: &Data) -> Self {
        match value {
            Data::Empty => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Float(f) => Cell::Number(*f),
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Error(_) => Cell::Empty,
            other => Cell::Text(other.to_string()),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value.to_string())
        }
    }
}

/// Ragged rows of cells. Reads past the end of a row yield `Cell::Empty`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellGrid {
    rows: Vec<Vec<Cell>>,
}

impl CellGrid {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// Convenience constructor for all-text grids.
    pub fn from_strings<R, S>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(|s| Cell::from(s.as_ref())).collect())
            .collect();
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, idx: usize) -> Option<&[Cell]> {
        self.rows.get(idx).map(Vec::as_slice)
    }

    pub fn row_len(&self, idx: usize) -> usize {
        self.rows.get(idx).map_or(0, Vec::len)
    }

    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows.get(row).and_then(|r| r.get(col)).unwrap_or(&EMPTY)
    }
}

/// Read the first worksheet of a spreadsheet file into a grid.
pub fn read_grid(path: &Path) -> Result<CellGrid> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    if is_csv {
        let rdr = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)?;
        return csv_grid(rdr);
    }
    let mut wb = open_workbook_auto(path)?;
    first_sheet(&mut wb)
}

/// Same as [`read_grid`] for an in-memory workbook.
pub fn read_grid_from_bytes(bytes: Vec<u8>) -> Result<CellGrid> {
    let mut wb = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    first_sheet(&mut wb)
}

fn first_sheet<RS: Read + Seek>(wb: &mut calamine::Sheets<RS>) -> Result<CellGrid> {
    let name = wb
        .sheet_names()
        .first()
        .cloned()
        .ok_or(IngestError::EmptyWorkbook)?;
    let range = wb.worksheet_range(&name)?;
    let grid = range_grid(&range);
    debug!(sheet = %name, rows = grid.len(), "read worksheet");
    Ok(grid)
}

/// calamine pads every row to the used-range width; trailing empties are
/// dropped again so short rows stay short.
fn range_grid(range: &Range<Data>) -> CellGrid {
    let rows = range
        .rows()
        .map(|r| trim_trailing(r.iter().map(Cell::from).collect()))
        .collect();
    CellGrid::new(rows)
}

fn trim_trailing(mut row: Vec<Cell>) -> Vec<Cell> {
    while row.last() == Some(&Cell::Empty) {
        row.pop();
    }
    row
}

fn csv_grid<R: Read>(mut rdr: csv::Reader<R>) -> Result<CellGrid> {
    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(trim_trailing(record.iter().map(Cell::from).collect()));
    }
    debug!(rows = rows.len(), "read csv");
    Ok(CellGrid::new(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{parse_grid, ExtractOptions};
    use std::io::Write;

    #[test]
    fn out_of_range_cells_are_empty() {
        let grid = CellGrid::from_strings(vec![vec!["a", "b"], vec!["c"]]);
        assert_eq!(grid.cell(1, 0), &Cell::Text("c".into()));
        assert_eq!(grid.cell(1, 5), &Cell::Empty);
        assert_eq!(grid.cell(9, 0), &Cell::Empty);
        assert_eq!(grid.row_len(1), 1);
    }

    #[test]
    fn cell_text_and_number() {
        assert_eq!(Cell::Number(1200.0).text(), "1200");
        assert_eq!(Cell::Number(1.5).text(), "1.5");
        assert_eq!(Cell::Text(" 서울\n특별시 ".into()).text(), "서울 특별시");
        assert_eq!(Cell::Text("1,200".into()).number(), Some(1200.0));
        assert_eq!(Cell::Empty.number(), None);
        assert!(Cell::Text("  ".into()).is_blank());
    }

    #[test]
    fn reads_ragged_csv() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "title").unwrap();
        writeln!(file, "region,type,total,female,male").unwrap();
        writeln!(file, "Seoul,Visual,\"1,000\",400,600").unwrap();
        let grid = read_grid(file.path()).unwrap();
        assert_eq!(grid.len(), 3);
        assert_eq!(grid.row_len(0), 1);
        assert_eq!(grid.cell(2, 2).number(), Some(1000.0));
    }

    #[test]
    fn padded_workbook_rows_keep_their_real_length() {
        let mut range = Range::new((0, 0), (2, 4));
        for (col, h) in ["시군구별", "장애유형별", "전체", "여자", "남자"].iter().enumerate() {
            range.set_value((0, col as u32), Data::String(h.to_string()));
        }
        range.set_value((1, 0), Data::String("서울".into()));
        range.set_value((1, 1), Data::String("시각장애".into()));
        range.set_value((1, 2), Data::Float(30.0));
        range.set_value((2, 0), Data::String("부산".into()));
        range.set_value((2, 1), Data::String("청각장애".into()));
        range.set_value((2, 4), Data::Int(7));

        let grid = range_grid(&range);
        assert_eq!(grid.row_len(0), 5);
        assert_eq!(grid.row_len(1), 3);
        assert_eq!(grid.row_len(2), 5);

        let (data, report) = parse_grid(&grid, &ExtractOptions::default());
        assert_eq!(report.skipped_rows, 1);
        assert_eq!(data.records.len(), 1);
        assert_eq!(data.records[0].region, "부산");
        assert_eq!(data.records[0].count, 7);
    }

    #[test]
    fn trailing_empty_csv_fields_are_dropped() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "Seoul,Visual,5,,").unwrap();
        writeln!(file, ",,,,").unwrap();
        let grid = read_grid(file.path()).unwrap();
        assert_eq!(grid.row_len(0), 3);
        assert_eq!(grid.row_len(1), 0);
    }

    #[test]
    fn missing_workbook_is_an_error() {
        let err = read_grid(Path::new("does/not/exist.xlsx")).unwrap_err();
        assert!(matches!(err, IngestError::Workbook(_)));
    }

    #[test]
    fn garbage_bytes_are_not_a_workbook() {
        assert!(read_grid_from_bytes(b"not a workbook".to_vec()).is_err());
    }
}
