// Dashboard state: one owner, explicit actions, memoized derived stats.

use crate::config::AppConfig;
use crate::reports::{self, DEFAULT_TOP_REGIONS};
use crate::source::{
    load_with_fallback, DataSource, LoadOutcome, Origin, SpreadsheetSource, SyntheticSource,
};
use crate::types::{Filter, FilterPatch, FilterResult, ParsedData, Record, Stats};
use chrono::{DateTime, Local};
use std::cell::{Cell, RefCell};
use std::sync::Arc;
use tracing::debug;

/// Identifies one load request. Only the most recent one may land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadTicket(u64);

#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub dataset: Option<Arc<ParsedData>>,
    /// Bumped whenever `dataset` is replaced.
    pub generation: u64,
    pub filter: Filter,
    pub warning: Option<String>,
    pub origin: Option<Origin>,
    pub loaded_at: Option<DateTime<Local>>,
    pub is_loading: bool,
    pub latest_ticket: Option<LoadTicket>,
}

#[derive(Debug, Clone)]
pub enum Action {
    LoadStarted(LoadTicket),
    LoadFinished(LoadTicket, LoadOutcome),
    SetFilter(FilterPatch),
    ClearFilter,
}

impl DashboardState {
    pub fn reduce(mut self, action: Action) -> Self {
        match action {
            Action::LoadStarted(ticket) => {
                self.latest_ticket = Some(ticket);
                self.is_loading = true;
            }
            Action::LoadFinished(ticket, outcome) => {
                if self.latest_ticket != Some(ticket) {
                    debug!(?ticket, "stale load result ignored");
                    return self;
                }
                self.dataset = Some(outcome.dataset);
                self.generation += 1;
                self.warning = outcome.warning;
                self.origin = Some(outcome.origin);
                self.loaded_at = Some(outcome.loaded_at);
                self.is_loading = false;
            }
            // Filters only make sense once there is data to filter.
            Action::SetFilter(patch) => {
                if self.dataset.is_some() {
                    self.filter.merge(patch);
                }
            }
            Action::ClearFilter => {
                if self.dataset.is_some() {
                    self.filter = Filter::default();
                }
            }
        }
        self
    }
}

#[derive(Debug, Clone)]
pub struct Limits {
    pub min_records: usize,
    pub top_regions: usize,
    pub search_limit: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            min_records: 10,
            top_regions: DEFAULT_TOP_REGIONS,
            search_limit: 100,
        }
    }
}

type CacheKey = (u64, Filter);

pub struct Controller {
    state: DashboardState,
    primary: Box<dyn DataSource>,
    fallback: Box<dyn DataSource>,
    limits: Limits,
    next_ticket: u64,
    cache: RefCell<Option<(CacheKey, Arc<FilterResult>)>>,
    recomputations: Cell<usize>,
}

impl Controller {
    pub fn new(
        primary: Box<dyn DataSource>,
        fallback: Box<dyn DataSource>,
        limits: Limits,
    ) -> Self {
        Self {
            state: DashboardState::default(),
            primary,
            fallback,
            limits,
            next_ticket: 0,
            cache: RefCell::new(None),
            recomputations: Cell::new(0),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            Box::new(SpreadsheetSource::from_config(config)),
            Box::new(SyntheticSource::from_config(config)),
            Limits {
                min_records: config.min_records,
                top_regions: config.top_regions,
                search_limit: config.search_limit,
            },
        )
    }

    fn dispatch(&mut self, action: Action) {
        let state = std::mem::take(&mut self.state);
        self.state = state.reduce(action);
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.next_ticket += 1;
        let ticket = LoadTicket(self.next_ticket);
        self.dispatch(Action::LoadStarted(ticket));
        ticket
    }

    /// Results for anything but the latest ticket are dropped.
    pub fn finish_load(&mut self, ticket: LoadTicket, outcome: LoadOutcome) {
        self.dispatch(Action::LoadFinished(ticket, outcome));
    }

    pub fn fetch(&self) -> LoadOutcome {
        load_with_fallback(
            self.primary.as_ref(),
            self.fallback.as_ref(),
            self.limits.min_records,
        )
    }

    /// Load (or reload) the dataset. A dataset is always present afterwards.
    pub fn load_dataset(&mut self) -> LoadOutcome {
        let ticket = self.begin_load();
        let outcome = self.fetch();
        self.finish_load(ticket, outcome.clone());
        outcome
    }

    pub fn set_filter(&mut self, patch: FilterPatch) {
        self.dispatch(Action::SetFilter(patch));
    }

    pub fn clear_filter(&mut self) {
        self.dispatch(Action::ClearFilter);
    }

    pub fn filter(&self) -> &Filter {
        &self.state.filter
    }

    pub fn dataset(&self) -> Option<&Arc<ParsedData>> {
        self.state.dataset.as_ref()
    }

    pub fn warning(&self) -> Option<&str> {
        self.state.warning.as_deref()
    }

    /// Filtered records and stats, recomputed only when the dataset or the
    /// filter changed since the last call.
    pub fn result(&self) -> Arc<FilterResult> {
        let key: CacheKey = (self.state.generation, self.state.filter.clone());
        if let Some((cached_key, result)) = self.cache.borrow().as_ref() {
            if *cached_key == key {
                return Arc::clone(result);
            }
        }

        let empty = ParsedData::default();
        let data = self.state.dataset.as_deref().unwrap_or(&empty);
        let result = Arc::new(reports::apply(data, &key.1, self.limits.top_regions));
        self.recomputations.set(self.recomputations.get() + 1);
        *self.cache.borrow_mut() = Some((key, Arc::clone(&result)));
        result
    }

    pub fn stats(&self) -> Stats {
        self.result().stats.clone()
    }

    pub fn filtered_records(&self) -> Vec<Record> {
        self.result().records.clone()
    }

    pub fn search(&self, query: &str) -> Vec<Record> {
        match self.state.dataset.as_deref() {
            Some(data) => reports::search(data, query, self.limits.search_limit),
            None => Vec::new(),
        }
    }

    pub fn recomputations(&self) -> usize {
        self.recomputations.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::reports::summarize;
    use crate::types::Gender;

    struct Fixed(Vec<Record>);

    impl DataSource for Fixed {
        fn name(&self) -> String {
            "fixed".into()
        }

        fn load(&self) -> Result<ParsedData> {
            let summary = summarize(&self.0);
            Ok(ParsedData {
                records: self.0.clone(),
                summary,
            })
        }
    }

    fn rec(region: &str, gender: Gender, count: u64) -> Record {
        Record {
            id: format!("{}_{}", region, gender),
            region: region.into(),
            gender,
            disability_type: "시각장애".into(),
            count,
            year: Some(2024),
        }
    }

    fn controller() -> Controller {
        let mut records = Vec::new();
        for i in 0..5 {
            records.push(rec(&format!("Seoul {}", i), Gender::Male, 10));
            records.push(rec(&format!("Busan {}", i), Gender::Female, 5));
        }
        Controller::new(
            Box::new(Fixed(records)),
            Box::new(SyntheticSource { seed: Some(1), year: 2024 }),
            Limits::default(),
        )
    }

    #[test]
    fn filter_before_load_is_ignored() {
        let mut c = controller();
        c.set_filter(FilterPatch::default().region("Seoul"));
        assert!(c.filter().is_empty());
        assert_eq!(c.stats().total_count, 0);
    }

    #[test]
    fn load_then_filter_and_clear() {
        let mut c = controller();
        let outcome = c.load_dataset();
        assert_eq!(outcome.origin, Origin::Primary);
        assert_eq!(c.stats().total_count, 75);

        c.set_filter(FilterPatch::default().region("Seoul"));
        assert_eq!(c.stats().total_count, 50);
        assert!(c.filtered_records().iter().all(|r| r.region.starts_with("Seoul")));

        c.set_filter(FilterPatch::default().gender(Gender::Female));
        assert!(c.filtered_records().is_empty());

        c.clear_filter();
        assert_eq!(c.filtered_records().len(), 10);
    }

    #[test]
    fn stats_are_memoized_per_filter_and_dataset() {
        let mut c = controller();
        c.load_dataset();
        c.stats();
        c.stats();
        assert_eq!(c.recomputations(), 1);

        c.set_filter(FilterPatch::default().region("Seoul"));
        c.stats();
        c.filtered_records();
        assert_eq!(c.recomputations(), 2);

        // same filter value again: cache hit
        c.set_filter(FilterPatch::default().region("Seoul"));
        c.stats();
        assert_eq!(c.recomputations(), 2);

        c.load_dataset();
        c.stats();
        assert_eq!(c.recomputations(), 3);
    }

    #[test]
    fn stale_load_results_are_dropped() {
        let mut c = controller();
        let first = c.begin_load();
        let second = c.begin_load();
        let fresh = c.fetch();
        let stale = LoadOutcome {
            dataset: Arc::new(ParsedData::default()),
            ..fresh.clone()
        };

        c.finish_load(second, fresh);
        c.finish_load(first, stale);
        assert_eq!(c.dataset().unwrap().records.len(), 10);
        assert_eq!(c.state().generation, 1);
        assert!(!c.state().is_loading);
    }

    #[test]
    fn fallback_warning_is_surfaced() {
        let mut c = Controller::new(
            Box::new(Fixed(vec![rec("Seoul", Gender::Male, 1)])),
            Box::new(SyntheticSource { seed: Some(1), year: 2024 }),
            Limits::default(),
        );
        c.load_dataset();
        assert_eq!(c.state().origin, Some(Origin::Fallback));
        assert!(c.warning().is_some());
        assert_eq!(c.dataset().unwrap().records.len(), 510);
    }

    #[test]
    fn search_uses_whole_dataset() {
        let mut c = controller();
        c.load_dataset();
        c.set_filter(FilterPatch::default().region("Seoul"));
        assert_eq!(c.search("busan").len(), 5);
        assert!(c.search("").is_empty());
    }
}
