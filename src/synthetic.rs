// Plausible stand-in dataset used when the spreadsheet cannot be ingested.

use crate::reports::summarize;
use crate::types::{Gender, ParsedData, Record};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::Range;

pub const REGIONS: [&str; 17] = [
    "서울특별시",
    "부산광역시",
    "대구광역시",
    "인천광역시",
    "광주광역시",
    "대전광역시",
    "울산광역시",
    "세종특별자치시",
    "경기도",
    "강원특별자치도",
    "충청북도",
    "충청남도",
    "전북특별자치도",
    "전라남도",
    "경상북도",
    "경상남도",
    "제주특별자치도",
];

pub const DISABILITY_TYPES: [&str; 15] = [
    "지체장애",
    "뇌병변장애",
    "시각장애",
    "청각장애",
    "언어장애",
    "지적장애",
    "자폐성장애",
    "정신장애",
    "신장장애",
    "심장장애",
    "호흡기장애",
    "간장애",
    "안면장애",
    "장루요루장애",
    "뇌전증장애",
];

/// Rough national proportions: physical is by far the largest group.
fn base_range(disability_type: &str) -> Range<u64> {
    match disability_type {
        "지체장애" => 10_000..60_000,
        "시각장애" | "청각장애" => 5_000..25_000,
        "지적장애" | "뇌병변장애" => 3_000..18_000,
        "정신장애" => 5_000..30_000,
        _ => 1_000..11_000,
    }
}

fn region_multiplier(region: &str) -> f64 {
    match region {
        "서울특별시" | "경기도" => 1.5,
        "부산광역시" | "대구광역시" | "인천광역시" => 0.8,
        "세종특별자치시" | "제주특별자치도" => 0.3,
        _ => 1.0,
    }
}

/// 17 regions x 2 genders x 15 types, one record each.
pub fn generate(seed: Option<u64>, year: i32) -> ParsedData {
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    };

    let mut records = Vec::with_capacity(REGIONS.len() * 2 * DISABILITY_TYPES.len());
    for region in REGIONS {
        for gender in [Gender::Male, Gender::Female] {
            for disability_type in DISABILITY_TYPES {
                let base = rng.random_range(base_range(disability_type));
                let count = (base as f64 * region_multiplier(region)).floor() as u64;
                if count == 0 {
                    continue;
                }
                records.push(Record {
                    id: format!("synthetic_{}", records.len()),
                    region: region.to_string(),
                    gender,
                    disability_type: disability_type.to_string(),
                    count,
                    year: Some(year),
                });
            }
        }
    }

    let summary = summarize(&records);
    ParsedData { records, summary }
}
