//! Report registry
//!
//! Builds one [`Report`] per calendar month over an inclusive range. Reports
//! are created eagerly but hold only their period until a metric is read.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{StatsError, StatsResult};
use crate::models::Period;
use crate::report::Report;

pub struct ReportRegistry {
    reports_dir: PathBuf,
    reports: BTreeMap<Period, Report>,
}

impl ReportRegistry {
    /// One report for every month from `start` to `end`, both inclusive.
    ///
    /// A `start` after `end` gives an empty registry.
    pub fn build(reports_dir: impl Into<PathBuf>, start: Period, end: Period) -> Self {
        let reports_dir = reports_dir.into();
        let mut reports = BTreeMap::new();

        let mut period = start;
        while period <= end {
            reports.insert(period, Report::with_base_dir(reports_dir.clone(), period));
            period = period.next();
        }

        debug!(
            start = %start,
            end = %end,
            count = reports.len(),
            "Built report registry"
        );

        Self {
            reports_dir,
            reports,
        }
    }

    pub fn reports_dir(&self) -> &Path {
        &self.reports_dir
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Look up a report by its `"<year>-<month>"` key. A zero-padded month is
    /// accepted too.
    pub fn get(&self, key: &str) -> Option<&Report> {
        Period::parse(key).ok().and_then(|p| self.reports.get(&p))
    }

    pub fn get_period(&self, period: Period) -> Option<&Report> {
        self.reports.get(&period)
    }

    /// Like [`ReportRegistry::get_period`] but an absent period is an error
    pub fn require(&self, period: Period) -> StatsResult<&Report> {
        self.get_period(period)
            .ok_or_else(|| StatsError::UnknownPeriod(period.to_string()))
    }

    /// Keys in chronological order
    pub fn keys(&self) -> impl Iterator<Item = String> + '_ {
        self.reports.keys().map(Period::to_string)
    }

    pub fn periods(&self) -> impl Iterator<Item = Period> + '_ {
        self.reports.keys().copied()
    }

    /// Reports in chronological order
    pub fn iter(&self) -> impl Iterator<Item = &Report> {
        self.reports.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period(y: i32, m: u32) -> Period {
        Period::new(y, m).unwrap()
    }

    #[test]
    fn test_build_quarter() {
        let registry = ReportRegistry::build("../reports", period(2022, 1), period(2022, 3));
        let keys: Vec<String> = registry.keys().collect();
        assert_eq!(keys, vec!["2022-1", "2022-2", "2022-3"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_build_across_year_boundary() {
        let registry = ReportRegistry::build("../reports", period(2022, 11), period(2023, 2));
        let keys: Vec<String> = registry.keys().collect();
        assert_eq!(keys, vec!["2022-11", "2022-12", "2023-1", "2023-2"]);
    }

    #[test]
    fn test_single_month_range() {
        let registry = ReportRegistry::build("../reports", period(2022, 9), period(2022, 9));
        assert_eq!(registry.len(), 1);
        assert!(registry.get("2022-9").is_some());
    }

    #[test]
    fn test_reversed_range_is_empty() {
        let registry = ReportRegistry::build("../reports", period(2023, 3), period(2021, 1));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_get_and_require() {
        let registry = ReportRegistry::build("r", period(2022, 1), period(2022, 12));
        assert_eq!(registry.get("2022-9").unwrap().period(), period(2022, 9));
        assert_eq!(registry.get("2022-09").unwrap().period(), period(2022, 9));
        assert!(registry.get("2023-1").is_none());
        assert!(registry.get("garbage").is_none());

        let err = registry.require(period(2023, 1)).err().unwrap();
        assert!(matches!(err, StatsError::UnknownPeriod(ref p) if p == "2023-1"));
    }

    #[test]
    fn test_reports_share_base_dir() {
        let registry = ReportRegistry::build("some/base", period(2021, 1), period(2021, 2));
        assert!(registry.iter().all(|r| r.reports_dir() == Path::new("some/base")));
        assert_eq!(registry.reports_dir(), Path::new("some/base"));
    }
}
