// Utility helpers for parsing and basic statistics.
//
// All of the "dirty" spreadsheet text handling lives here so the extractor
// can work with clean, typed values.
use num_format::{Locale, ToFormattedString};
use once_cell::sync::Lazy;
use regex::Regex;

static REGION_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\s*").expect("valid regex"));
static FILE_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"202[0-9]").expect("valid regex"));

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in spreadsheet exports.
///
/// - Strips thousands separators and any whitespace, including inner spaces.
/// - Rejects values that contain alphabetic characters.
/// - Returns `None` for empty or unparsable input ("absent", not zero).
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s: String = s?.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_alphabetic()) {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Headcount from a numeric value. Anything that does not round to a
/// positive integer is dropped.
pub fn positive_count(v: f64) -> Option<u64> {
    let rounded = v.round();
    if rounded.is_finite() && rounded > 0.0 {
        Some(rounded as u64)
    } else {
        None
    }
}

/// Collapse control whitespace that merged cells tend to carry.
pub fn clean_text(s: &str) -> String {
    s.replace(['\r', '\n', '\t'], " ").trim().to_string()
}

/// "11000 서울특별시" -> "서울특별시"
pub fn strip_region_code(s: &str) -> String {
    REGION_CODE.replace(s, "").into_owned()
}

pub fn year_from_file_name(name: &str) -> Option<i32> {
    FILE_YEAR.find(name).and_then(|m| m.as_str().parse().ok())
}

/// Share of `total`, defined as 0 when the total is empty.
pub fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    part as f64 / total as f64 * 100.0
}

/// Case-insensitive substring test for Latin text; Hangul has no case so the
/// lowercase fold is a no-op there.
pub fn contains_folded(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus locale-aware thousands separators (`1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: u64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_strips_separators_and_spaces() {
        assert_eq!(parse_f64_safe(Some(" 1,234 ")), Some(1234.0));
        assert_eq!(parse_f64_safe(Some("12 345")), Some(12345.0));
        assert_eq!(parse_f64_safe(Some("-")), None);
        assert_eq!(parse_f64_safe(Some("")), None);
        assert_eq!(parse_f64_safe(Some("n/a")), None);
        assert_eq!(parse_f64_safe(None), None);
    }

    #[test]
    fn zero_and_negative_counts_are_dropped() {
        assert_eq!(positive_count(0.0), None);
        assert_eq!(positive_count(-4.0), None);
        assert_eq!(positive_count(0.4), None);
        assert_eq!(positive_count(12.0), Some(12));
    }

    #[test]
    fn region_code_prefix_is_removed() {
        assert_eq!(strip_region_code("11 Seoul"), "Seoul");
        assert_eq!(strip_region_code("11000서울특별시"), "서울특별시");
        assert_eq!(strip_region_code("Seoul 11"), "Seoul 11");
    }

    #[test]
    fn year_is_read_from_file_name() {
        assert_eq!(year_from_file_name("disability_2023.xlsx"), Some(2023));
        assert_eq!(year_from_file_name("database.xlsx"), None);
    }

    #[test]
    fn percentage_of_empty_total_is_zero() {
        assert_eq!(percentage(10, 0), 0.0);
        assert_eq!(percentage(25, 100), 25.0);
    }

    #[test]
    fn numbers_are_grouped() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(0.0, 1), "0.0");
        assert_eq!(format_int(9855u64), "9,855");
    }
}
