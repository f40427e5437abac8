//! Report Analysis Engine
//!
//! [`StatsAnalyzer`] is the entry point that ties the pieces together: it
//! builds a [`ReportRegistry`] for a period range, picks the requested
//! periods, and hands the results to the [`ReportDisplayManager`].
//!
//! ## Failure isolation
//!
//! Every period is evaluated independently. A missing or malformed artifact
//! fails that period only; it is logged, shown to the operator, and counted in
//! the returned [`RunOutcome`] while the remaining periods still run.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use reward_stats::analyzer::{ProcessOptions, StatsAnalyzer, StatsCommand};
//! use reward_stats::Period;
//!
//! # fn example() -> anyhow::Result<()> {
//! let analyzer = StatsAnalyzer::new();
//! let options = ProcessOptions {
//!     reports_dir: "../reports".into(),
//!     start: Period::new(2022, 9)?,
//!     end: Period::new(2023, 3)?,
//!     periods: Vec::new(),
//!     json_output: false,
//! };
//!
//! let outcome = analyzer.run_command(StatsCommand::Report, &options)?;
//! assert!(outcome.is_success());
//! # Ok(())
//! # }
//! ```

use anyhow::Result;
use std::path::PathBuf;
use tracing::{error, info, warn};

use crate::display::{DistributedTotal, PeriodFailure, ReportDisplayManager};
use crate::error::{StatsError, StatsResult};
use crate::loader::discover_periods;
use crate::models::{Period, ReportSummary};
use crate::registry::ReportRegistry;
use crate::report::Report;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsCommand {
    /// Full TOTALS / USERS report per period
    Report,
    /// One `Total Distributed` line per period
    Distributed,
    /// Period directories present on disk
    List,
}

#[derive(Debug, Clone)]
pub struct ProcessOptions {
    pub reports_dir: PathBuf,
    pub start: Period,
    pub end: Period,
    /// Periods to emit; empty means every period in the range
    pub periods: Vec<Period>,
    pub json_output: bool,
}

/// How many periods were emitted and how many failed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOutcome {
    pub succeeded: usize,
    pub failed: usize,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

pub struct StatsAnalyzer {
    display_manager: ReportDisplayManager,
}

impl Default for StatsAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn failure(period: Period, err: &StatsError) -> PeriodFailure {
    error!(period = %period, error = %err, "Failed to build report");
    PeriodFailure {
        period: period.to_string(),
        error: err.to_string(),
    }
}

impl StatsAnalyzer {
    pub fn new() -> Self {
        Self {
            display_manager: ReportDisplayManager::new(),
        }
    }

    pub fn with_display_manager(display_manager: ReportDisplayManager) -> Self {
        Self { display_manager }
    }

    /// The requested reports in the order asked for; every period in the
    /// registry when `periods` is empty.
    pub fn select<'a>(
        &self,
        registry: &'a ReportRegistry,
        periods: &[Period],
    ) -> Vec<(Period, StatsResult<&'a Report>)> {
        if periods.is_empty() {
            return registry.iter().map(|r| (r.period(), Ok(r))).collect();
        }
        periods
            .iter()
            .map(|&p| (p, registry.require(p)))
            .collect()
    }

    pub fn collect_summaries(
        &self,
        registry: &ReportRegistry,
        periods: &[Period],
    ) -> (Vec<ReportSummary>, Vec<PeriodFailure>) {
        let mut summaries = Vec::new();
        let mut failures = Vec::new();
        for (period, selected) in self.select(registry, periods) {
            match selected.and_then(Report::summary) {
                Ok(summary) => summaries.push(summary),
                Err(e) => failures.push(failure(period, &e)),
            }
        }
        (summaries, failures)
    }

    pub fn collect_distributed(
        &self,
        registry: &ReportRegistry,
        periods: &[Period],
    ) -> (Vec<DistributedTotal>, Vec<PeriodFailure>) {
        let mut totals = Vec::new();
        let mut failures = Vec::new();
        for (period, selected) in self.select(registry, periods) {
            match selected.and_then(Report::total_rewards_distributed) {
                Ok(total) => totals.push(DistributedTotal {
                    period: period.to_string(),
                    total_rewards_distributed: total,
                }),
                Err(e) => failures.push(failure(period, &e)),
            }
        }
        (totals, failures)
    }

    fn run_report(&self, registry: &ReportRegistry, options: &ProcessOptions) -> RunOutcome {
        if options.json_output {
            let (summaries, failures) = self.collect_summaries(registry, &options.periods);
            self.display_manager
                .display_reports_json(&summaries, &failures);
            return RunOutcome {
                succeeded: summaries.len(),
                failed: failures.len(),
            };
        }

        let mut outcome = RunOutcome::default();
        for (period, selected) in self.select(registry, &options.periods) {
            match selected.and_then(Report::report) {
                Ok(()) => outcome.succeeded += 1,
                Err(e) => {
                    self.display_manager.display_failure(&failure(period, &e));
                    outcome.failed += 1;
                }
            }
        }
        outcome
    }

    fn run_distributed(&self, registry: &ReportRegistry, options: &ProcessOptions) -> RunOutcome {
        let (totals, failures) = self.collect_distributed(registry, &options.periods);
        self.display_manager
            .display_distributed(&totals, &failures, options.json_output);
        RunOutcome {
            succeeded: totals.len(),
            failed: failures.len(),
        }
    }

    fn run_list(&self, options: &ProcessOptions) -> Result<RunOutcome> {
        let listings = discover_periods(&options.reports_dir)?;
        info!(count = listings.len(), "Discovered report periods");
        self.display_manager
            .display_listing(&listings, options.json_output);
        Ok(RunOutcome {
            succeeded: listings.len(),
            failed: 0,
        })
    }

    fn build_registry(&self, options: &ProcessOptions) -> ReportRegistry {
        let registry = ReportRegistry::build(&options.reports_dir, options.start, options.end);
        if registry.is_empty() {
            warn!(
                start = %options.start,
                end = %options.end,
                "No periods in the requested range"
            );
        }
        registry
    }

    pub fn run_command(&self, command: StatsCommand, options: &ProcessOptions) -> Result<RunOutcome> {
        let outcome = match command {
            StatsCommand::List => self.run_list(options)?,
            StatsCommand::Report => self.run_report(&self.build_registry(options), options),
            StatsCommand::Distributed => {
                self.run_distributed(&self.build_registry(options), options)
            }
        };

        info!(
            succeeded = outcome.succeeded,
            failed = outcome.failed,
            "Finished"
        );
        Ok(outcome)
    }
}
