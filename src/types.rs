use serde::{Deserialize, Serialize};
use std::fmt;
use tabled::Tabled;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Total,
}

impl Gender {
    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Total => "total",
        }
    }

    pub fn korean_label(self) -> &'static str {
        match self {
            Gender::Male => "남성",
            Gender::Female => "여성",
            Gender::Total => "전체",
        }
    }

    /// Male and female rows partition the population; `Total` duplicates them.
    pub fn is_breakdown(self) -> bool {
        matches!(self, Gender::Male | Gender::Female)
    }

    pub fn parse(s: &str) -> Option<Gender> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" | "남성" | "남자" => Some(Gender::Male),
            "female" | "f" | "여성" | "여자" => Some(Gender::Female),
            "total" | "전체" => Some(Gender::Total),
            _ => None,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One (region, gender, disability type, year) headcount observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub region: String,
    pub gender: Gender,
    pub disability_type: String,
    pub count: u64,
    pub year: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_records: usize,
    pub regions: Vec<String>,
    pub disability_types: Vec<String>,
    pub genders: Vec<Gender>,
    pub total_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedData {
    pub records: Vec<Record>,
    pub summary: Summary,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Filter {
    pub region: Option<String>,
    pub gender: Option<Gender>,
    pub disability_type: Option<String>,
    pub year_range: Option<(i32, i32)>,
    pub search_text: Option<String>,
}

impl Filter {
    pub fn is_empty(&self) -> bool {
        *self == Filter::default()
    }

    pub fn merge(&mut self, patch: FilterPatch) {
        if let Some(v) = patch.region {
            self.region = v;
        }
        if let Some(v) = patch.gender {
            self.gender = v;
        }
        if let Some(v) = patch.disability_type {
            self.disability_type = v;
        }
        if let Some(v) = patch.year_range {
            self.year_range = v;
        }
        if let Some(v) = patch.search_text {
            self.search_text = v;
        }
    }
}

/// Partial filter update. The outer `Option` says whether a field is touched,
/// the inner one whether it is set or cleared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterPatch {
    pub region: Option<Option<String>>,
    pub gender: Option<Option<Gender>>,
    pub disability_type: Option<Option<String>>,
    pub year_range: Option<Option<(i32, i32)>>,
    pub search_text: Option<Option<String>>,
}

impl FilterPatch {
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(Some(region.into()));
        self
    }

    pub fn gender(mut self, gender: Gender) -> Self {
        self.gender = Some(Some(gender));
        self
    }

    pub fn disability_type(mut self, disability_type: impl Into<String>) -> Self {
        self.disability_type = Some(Some(disability_type.into()));
        self
    }

    pub fn year_range(mut self, start: i32, end: i32) -> Self {
        self.year_range = Some(Some((start, end)));
        self
    }

    pub fn search_text(mut self, text: impl Into<String>) -> Self {
        self.search_text = Some(Some(text.into()));
        self
    }

    pub fn clear_region(mut self) -> Self {
        self.region = Some(None);
        self
    }

    pub fn clear_gender(mut self) -> Self {
        self.gender = Some(None);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionStat {
    pub region: String,
    pub count: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenderStat {
    pub gender: Gender,
    pub count: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeStat {
    #[serde(rename = "type")]
    pub disability_type: String,
    pub count: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearStat {
    pub year: i32,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Stats {
    pub total_count: u64,
    pub region_stats: Vec<RegionStat>,
    pub gender_stats: Vec<GenderStat>,
    pub type_stats: Vec<TypeStat>,
    pub top_regions: Vec<RegionStat>,
    pub yearly_trend: Option<Vec<YearStat>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterResult {
    pub records: Vec<Record>,
    pub stats: Stats,
}

// Rendered rows for console previews and CSV export.

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct RecordRow {
    #[serde(rename = "Region")]
    #[tabled(rename = "Region")]
    pub region: String,
    #[serde(rename = "Gender")]
    #[tabled(rename = "Gender")]
    pub gender: String,
    #[serde(rename = "DisabilityType")]
    #[tabled(rename = "DisabilityType")]
    pub disability_type: String,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: String,
    #[serde(rename = "Year")]
    #[tabled(rename = "Year")]
    pub year: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct BreakdownRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Label")]
    #[tabled(rename = "Label")]
    pub label: String,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: String,
    #[serde(rename = "Percentage")]
    #[tabled(rename = "Percentage")]
    pub percentage: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct TrendRow {
    #[serde(rename = "Year")]
    #[tabled(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_sets_and_clears_fields() {
        let mut filter = Filter::default();
        filter.merge(FilterPatch::default().region("서울").gender(Gender::Male));
        assert_eq!(filter.region.as_deref(), Some("서울"));
        assert_eq!(filter.gender, Some(Gender::Male));

        filter.merge(FilterPatch::default().search_text("시각"));
        assert_eq!(filter.region.as_deref(), Some("서울"));

        filter.merge(FilterPatch::default().clear_region().clear_gender());
        assert_eq!(filter.region, None);
        assert_eq!(filter.gender, None);
        assert_eq!(filter.search_text.as_deref(), Some("시각"));
    }

    #[test]
    fn gender_parses_korean_and_english_labels() {
        assert_eq!(Gender::parse("여성"), Some(Gender::Female));
        assert_eq!(Gender::parse(" Male "), Some(Gender::Male));
        assert_eq!(Gender::parse("전체"), Some(Gender::Total));
        assert_eq!(Gender::parse("other"), None);
        assert!(!Gender::Total.is_breakdown());
        for g in [Gender::Male, Gender::Female, Gender::Total] {
            assert_eq!(Gender::parse(g.korean_label()), Some(g));
        }
    }
}
