// Header row detection and header-cell classification.
//
// Both are driven by ordered rule tables; the first matching rule wins, so
// the order of every table below is significant.

use crate::grid::CellGrid;
use crate::types::Gender;
use tracing::debug;

/// Cell values that unambiguously name the female/male columns.
const FEMALE_CELLS: &[&str] = &["여자", "female"];
const MALE_CELLS: &[&str] = &["남자", "male"];

/// Any of these in the joined, lowercased row text marks a header row.
const HEADER_TOKENS: &[&str] = &[
    "여자", "남자", "여성", "남성", "지역", "시도", "구분", "성별", "장애", "전체", "남", "여",
    "계",
    "female", "male", "gender", "region", "province", "classification", "category", "disability",
    "total",
];

pub const ALL_TYPES: &str = "전체장애";
pub const PHYSICAL_EXTERNAL: &str = "신체외부장애";
pub const MENTAL_INTERNAL: &str = "정신내부장애";
pub const SEVERE: &str = "중증장애";
pub const MILD: &str = "경증장애";

/// Locate the header row. Never fails; falls back to row 0.
pub fn locate_header(grid: &CellGrid, scan_rows: usize) -> usize {
    if let Some(row) = grid.row(1) {
        let cells: Vec<String> = row.iter().map(|c| c.text().to_lowercase()).collect();
        let has = |tokens: &[&str]| cells.iter().any(|c| tokens.contains(&c.as_str()));
        if has(FEMALE_CELLS) && has(MALE_CELLS) {
            debug!("header found at row 1 (female/male columns)");
            return 1;
        }
    }

    for i in 0..scan_rows.min(grid.len()) {
        let Some(row) = grid.row(i) else { continue };
        if row.len() <= 1 {
            continue;
        }
        let joined = row
            .iter()
            .map(|c| c.text())
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        if HEADER_TOKENS.iter().any(|t| joined.contains(*t)) {
            debug!(row = i, "header found by token scan");
            return i;
        }
    }

    debug!("no header row matched, using row 0");
    0
}

/// A substring rule with an optional guard against false positives.
struct TokenRule {
    needle: &'static str,
    /// Match is rejected when this text immediately follows the needle.
    not_followed_by: Option<&'static str>,
    /// ASCII needles must sit on word boundaries.
    whole_word: bool,
}

impl TokenRule {
    const fn plain(needle: &'static str) -> Self {
        Self {
            needle,
            not_followed_by: None,
            whole_word: false,
        }
    }

    const fn guarded(needle: &'static str, not_followed_by: &'static str) -> Self {
        Self {
            needle,
            not_followed_by: Some(not_followed_by),
            whole_word: false,
        }
    }

    const fn word(needle: &'static str) -> Self {
        Self {
            needle,
            not_followed_by: None,
            whole_word: true,
        }
    }

    fn matches(&self, text: &str) -> bool {
        text.match_indices(self.needle).any(|(start, m)| {
            let end = start + m.len();
            let rest = &text[end..];
            if let Some(guard) = self.not_followed_by {
                if rest.starts_with(guard) {
                    return false;
                }
            }
            if self.whole_word {
                let before = text[..start].chars().next_back();
                let after = rest.chars().next();
                let is_word = |c: Option<char>| c.is_some_and(|c| c.is_ascii_alphanumeric());
                if is_word(before) || is_word(after) {
                    return false;
                }
            }
            true
        })
    }
}

const GENDER_RULES: &[(Gender, &[TokenRule])] = &[
    (
        Gender::Female,
        &[
            TokenRule::plain("여자"),
            TokenRule::plain("여성"),
            TokenRule::guarded("여", "러"),
            TokenRule::word("female"),
            TokenRule::word("women"),
        ],
    ),
    (
        Gender::Male,
        &[
            TokenRule::plain("남자"),
            TokenRule::plain("남성"),
            TokenRule::guarded("남", "녀"),
            TokenRule::word("male"),
            TokenRule::word("men"),
        ],
    ),
];

/// (token, canonical label). Full labels come first, then abbreviations,
/// then English aliases; `간` and `정신` overlap other labels, so order matters.
const SPECIFIC_TYPES: &[(&str, &str)] = &[
    ("지체장애", "지체장애"),
    ("뇌병변장애", "뇌병변장애"),
    ("시각장애", "시각장애"),
    ("청각장애", "청각장애"),
    ("언어장애", "언어장애"),
    ("지적장애", "지적장애"),
    ("자폐성장애", "자폐성장애"),
    ("정신장애", "정신장애"),
    ("신장장애", "신장장애"),
    ("심장장애", "심장장애"),
    ("호흡기장애", "호흡기장애"),
    ("간장애", "간장애"),
    ("안면장애", "안면장애"),
    ("장루요루장애", "장루요루장애"),
    ("뇌전증장애", "뇌전증장애"),
    ("중복장애", "중복장애"),
    ("지체", "지체장애"),
    ("뇌병변", "뇌병변장애"),
    ("시각", "시각장애"),
    ("청각", "청각장애"),
    ("언어", "언어장애"),
    ("지적", "지적장애"),
    ("자폐성", "자폐성장애"),
    ("정신", "정신장애"),
    ("신장", "신장장애"),
    ("심장", "심장장애"),
    ("호흡기", "호흡기장애"),
    ("간", "간장애"),
    ("안면", "안면장애"),
    ("장루", "장루요루장애"),
    ("뇌전증", "뇌전증장애"),
    ("physical", "지체장애"),
    ("brain", "뇌병변장애"),
    ("visual", "시각장애"),
    ("hearing", "청각장애"),
    ("speech", "언어장애"),
    ("intellectual", "지적장애"),
    ("autis", "자폐성장애"),
    ("mental", "정신장애"),
    ("kidney", "신장장애"),
    ("heart", "심장장애"),
    ("respiratory", "호흡기장애"),
    ("liver", "간장애"),
    ("facial", "안면장애"),
    ("ostomy", "장루요루장애"),
    ("epilep", "뇌전증장애"),
];

/// Fallback buckets when no specific type matched. Every token in a rule's
/// list must be present (`&&`); rules are alternatives (`||`).
const GENERIC_TYPES: &[(&[&[&str]], &str)] = &[
    (&[&["전체"], &["계"], &["합계"], &["total"], &["sum"]], ALL_TYPES),
    (&[&["신체"], &["외부"], &["body"], &["external"]], PHYSICAL_EXTERNAL),
    (&[&["정신", "내부"], &["internal", "mental"]], MENTAL_INTERNAL),
    (&[&["중증"], &["severe"]], SEVERE),
    (&[&["경증"], &["mild"]], MILD),
];

pub fn classify_gender(header: &str) -> Gender {
    let text = header.to_lowercase();
    GENDER_RULES
        .iter()
        .find(|(_, rules)| rules.iter().any(|r| r.matches(&text)))
        .map_or(Gender::Total, |(g, _)| *g)
}

/// First specific category mentioned in the header, expanded to its full label.
pub fn specific_type(header: &str) -> Option<&'static str> {
    let text = header.to_lowercase();
    SPECIFIC_TYPES
        .iter()
        .find(|(token, _)| text.contains(*token))
        .map(|(_, label)| *label)
}

pub fn classify_type(header: &str) -> &'static str {
    if let Some(label) = specific_type(header) {
        return label;
    }
    let text = header.to_lowercase();
    GENERIC_TYPES
        .iter()
        .find(|(alts, _)| alts.iter().any(|all| all.iter().all(|t| text.contains(*t))))
        .map_or(ALL_TYPES, |(_, label)| *label)
}

pub fn classify_header(header: &str) -> (Gender, &'static str) {
    let result = (classify_gender(header), classify_type(header));
    debug!(header, gender = %result.0, disability_type = result.1, "classified header");
    result
}
