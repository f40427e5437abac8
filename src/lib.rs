//! Reward Stats Library
//!
//! Aggregates monthly reward-distribution and staking artifacts into summary
//! statistics. Each reporting period is a directory `<reports>/<year>-<month>/`
//! holding five pre-computed JSON files; this library loads them lazily,
//! validates them into typed records, and derives totals and user counts.
//!
//! ## Architecture Overview
//!
//! - [`models`] - Typed artifact records, [`Period`], readable-unit conversion
//! - [`loader`] - Artifact paths, JSON loading, period-directory discovery
//! - [`report`] - [`Report`]: lazily loaded artifacts and memoized metrics
//! - [`registry`] - [`ReportRegistry`]: one report per month over a range
//! - [`display`] - Text layout and JSON output
//! - [`analyzer`] - [`StatsAnalyzer`]: run a command over a range of periods
//! - [`config`] - Configuration with file and environment variable support
//! - [`logging`] - Structured logging setup
//! - [`error`] - [`StatsError`]
//!
//! ## Example
//!
//! ```rust,no_run
//! use reward_stats::{Period, ReportRegistry};
//!
//! # fn example() -> Result<(), reward_stats::StatsError> {
//! let registry = ReportRegistry::build(
//!     "../reports",
//!     Period::new(2022, 1)?,
//!     Period::new(2022, 3)?,
//! );
//!
//! if let Some(report) = registry.get("2022-2") {
//!     println!("distributed: {}", report.total_distributed()?);
//!     report.report()?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod analyzer;
pub mod config;
pub mod display;
pub mod error;
pub mod loader;
pub mod logging;
pub mod models;
pub mod registry;
pub mod report;

pub use analyzer::StatsAnalyzer;
pub use error::{StatsError, StatsResult};
pub use models::{Period, ReportSummary};
pub use registry::ReportRegistry;
pub use report::Report;
