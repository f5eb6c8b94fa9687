use serde::Serialize;
use std::error::Error;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), Box<dyn Error>> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Markdown table of the first `max_rows` rows, or `None` if there are none.
pub fn render_table<T>(rows: &[T], max_rows: usize) -> Option<String>
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return None;
    }
    Some(Table::new(slice).with(Style::markdown()).to_string())
}

pub fn preview_table<T>(title: &str, note: Option<&str>, rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("{}", title);
    if let Some(n) = note {
        println!("({})", n);
    }
    println!();
    match render_table(rows, max_rows) {
        Some(table) => println!("{}\n", table),
        None => println!("(no rows)\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BreakdownRow;

    fn row(rank: usize, label: &str) -> BreakdownRow {
        BreakdownRow {
            rank,
            label: label.to_string(),
            count: "1,000".to_string(),
            percentage: "50.00".to_string(),
        }
    }

    #[test]
    fn table_is_truncated_to_max_rows() {
        let rows = vec![row(1, "서울특별시"), row(2, "부산광역시"), row(3, "대구광역시")];
        let table = render_table(&rows, 2).unwrap();
        assert!(table.contains("| Rank"));
        assert!(table.contains("부산광역시"));
        assert!(!table.contains("대구광역시"));
        assert!(render_table::<BreakdownRow>(&[], 5).is_none());
    }

    #[test]
    fn csv_and_json_are_written() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("regions.csv");
        write_csv(&csv_path, &[row(1, "Seoul")]).unwrap();
        let text = std::fs::read_to_string(&csv_path).unwrap();
        assert!(text.starts_with("Rank,Label,Count,Percentage"));
        assert!(text.contains("\"1,000\""));

        let json_path = dir.path().join("stats.json");
        write_json(&json_path, &serde_json::json!({"total_count": 3})).unwrap();
        let text = std::fs::read_to_string(&json_path).unwrap();
        assert!(text.contains("\"total_count\": 3"));
    }
}
