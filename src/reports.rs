use crate::types::{
    BreakdownRow, Filter, FilterResult, GenderStat, ParsedData, Record, RecordRow, RegionStat,
    Stats, Summary, TrendRow, TypeStat, YearStat,
};
use crate::util::{contains_folded, format_int, format_number, percentage};
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// UI dropdown value meaning "no constraint".
const ALL_SENTINEL: &str = "전체";

pub const DEFAULT_TOP_REGIONS: usize = 10;

/// Distinct values in first-seen order.
fn distinct<T, I>(items: I) -> Vec<T>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|v| seen.insert(v.clone()))
        .collect()
}

pub fn summarize(records: &[Record]) -> Summary {
    Summary {
        total_records: records.len(),
        regions: distinct(records.iter().map(|r| r.region.clone())),
        disability_types: distinct(records.iter().map(|r| r.disability_type.clone())),
        genders: distinct(records.iter().map(|r| r.gender)),
        total_count: records.iter().map(|r| r.count).sum(),
    }
}

fn constraint(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .filter(|v| !v.is_empty() && v.trim() != ALL_SENTINEL)
}

pub fn matches(record: &Record, filter: &Filter) -> bool {
    if let Some(region) = constraint(&filter.region) {
        if !record.region.contains(region) {
            return false;
        }
    }
    if let Some(gender) = filter.gender {
        if record.gender != gender {
            return false;
        }
    }
    if let Some(t) = constraint(&filter.disability_type) {
        if !record.disability_type.contains(t) {
            return false;
        }
    }
    if let Some((start, end)) = filter.year_range {
        match record.year {
            Some(y) if (start..=end).contains(&y) => {}
            _ => return false,
        }
    }
    if let Some(text) = filter.search_text.as_deref().filter(|t| !t.is_empty()) {
        if !contains_folded(&record.region, text)
            && !contains_folded(&record.disability_type, text)
        {
            return false;
        }
    }
    true
}

pub fn filter_records(data: &ParsedData, filter: &Filter) -> Vec<Record> {
    data.records
        .iter()
        .filter(|r| matches(r, filter))
        .cloned()
        .collect()
}

/// Filter the dataset and compute stats over what survives.
pub fn apply(data: &ParsedData, filter: &Filter, top_regions: usize) -> FilterResult {
    let records = filter_records(data, filter);
    let stats = compute_stats(&records, top_regions);
    FilterResult { records, stats }
}

/// Group-by sum in first-seen order, then sorted by descending count.
/// The sort is stable, so ties keep their first-seen order.
fn group_sum<'a, K, F>(records: impl Iterator<Item = &'a Record>, key: F) -> Vec<(K, u64)>
where
    K: Eq + Hash + Clone,
    F: Fn(&Record) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, u64)> = Vec::new();
    for r in records {
        let k = key(r);
        match index.get(&k) {
            Some(&i) => groups[i].1 += r.count,
            None => {
                index.insert(k.clone(), groups.len());
                groups.push((k, r.count));
            }
        }
    }
    groups.sort_by(|a, b| b.1.cmp(&a.1));
    groups
}

/// Stats over a filtered record set.
///
/// Totals and the region/type/year breakdowns only count male and female
/// records; `total` rows describe the same people and would double count.
/// The gender breakdown keeps them so the total/male/female split is visible.
pub fn compute_stats(records: &[Record], top_regions: usize) -> Stats {
    let breakdown = || records.iter().filter(|r| r.gender.is_breakdown());
    let total_count: u64 = breakdown().map(|r| r.count).sum();

    let region_stats: Vec<RegionStat> = group_sum(breakdown(), |r| r.region.clone())
        .into_iter()
        .map(|(region, count)| RegionStat {
            region,
            count,
            percentage: percentage(count, total_count),
        })
        .collect();

    let gender_stats = group_sum(records.iter(), |r| r.gender)
        .into_iter()
        .map(|(gender, count)| GenderStat {
            gender,
            count,
            percentage: percentage(count, total_count),
        })
        .collect();

    let type_stats = group_sum(breakdown(), |r| r.disability_type.clone())
        .into_iter()
        .map(|(disability_type, count)| TypeStat {
            disability_type,
            count,
            percentage: percentage(count, total_count),
        })
        .collect();

    let mut years: Vec<YearStat> = group_sum(breakdown().filter(|r| r.year.is_some()), |r| r.year)
        .into_iter()
        .filter_map(|(year, count)| year.map(|year| YearStat { year, count }))
        .collect();
    years.sort_by_key(|y| y.year);
    let yearly_trend = if years.is_empty() { None } else { Some(years) };

    let top = region_stats.iter().take(top_regions).cloned().collect();

    Stats {
        total_count,
        region_stats,
        gender_stats,
        type_stats,
        top_regions: top,
        yearly_trend,
    }
}

/// Free-text lookup over the whole dataset, ignoring the active filter.
pub fn search(data: &ParsedData, query: &str, limit: usize) -> Vec<Record> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }
    data.records
        .iter()
        .filter(|r| {
            contains_folded(&r.region, query)
                || contains_folded(&r.disability_type, query)
                || contains_folded(r.gender.label(), query)
                || contains_folded(r.gender.korean_label(), query)
        })
        .take(limit)
        .cloned()
        .collect()
}

// Rendering helpers for previews and exports.

pub fn record_rows(records: &[Record]) -> Vec<RecordRow> {
    records
        .iter()
        .map(|r| RecordRow {
            region: r.region.clone(),
            gender: r.gender.label().to_string(),
            disability_type: r.disability_type.clone(),
            count: format_int(r.count),
            year: r.year.map(|y| y.to_string()).unwrap_or_default(),
        })
        .collect()
}

fn breakdown_rows<'a>(entries: impl Iterator<Item = (&'a str, u64, f64)>) -> Vec<BreakdownRow> {
    entries
        .enumerate()
        .map(|(idx, (label, count, pct))| BreakdownRow {
            rank: idx + 1,
            label: label.to_string(),
            count: format_int(count),
            percentage: format_number(pct, 2),
        })
        .collect()
}

pub fn region_rows(stats: &Stats) -> Vec<BreakdownRow> {
    breakdown_rows(stats.region_stats.iter().map(|s| (s.region.as_str(), s.count, s.percentage)))
}

pub fn gender_rows(stats: &Stats) -> Vec<BreakdownRow> {
    breakdown_rows(stats.gender_stats.iter().map(|s| (s.gender.label(), s.count, s.percentage)))
}

pub fn type_rows(stats: &Stats) -> Vec<BreakdownRow> {
    breakdown_rows(
        stats
            .type_stats
            .iter()
            .map(|s| (s.disability_type.as_str(), s.count, s.percentage)),
    )
}

pub fn trend_rows(stats: &Stats) -> Vec<TrendRow> {
    stats
        .yearly_trend
        .iter()
        .flatten()
        .map(|y| TrendRow {
            year: y.year,
            count: format_int(y.count),
        })
        .collect()
}
