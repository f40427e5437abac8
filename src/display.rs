//! Output Formatting and Display Management
//!
//! Human-readable and JSON renderings of period reports.
//!
//! ## Report Layout
//!
//! The text layout is fixed: a header naming the period, a TOTALS section with
//! readable token amounts, then a USERS section with counts. Headers are
//! colored when the terminal supports it; metric lines are always plain so the
//! output stays greppable.
//!
//! ## JSON Output
//!
//! With `json_output` enabled, reports are emitted as
//! `{"reports": [...], "errors": [...]}` where every failed period appears in
//! `errors` with its message instead of aborting the whole run.

use colored::Colorize;
use serde::Serialize;
use std::io::{self, Write};

use crate::loader::PeriodListing;
use crate::models::ReportSummary;

/// Shortest exact rendering of a readable amount; whole values keep a `.0`
pub fn format_amount(value: f64) -> String {
    format!("{:?}", value)
}

/// Write the TOTALS / USERS layout for one period
pub fn write_summary<W: Write>(w: &mut W, s: &ReportSummary) -> io::Result<()> {
    let header = format!("********* REPORT FOR {} *********", s.period);
    writeln!(w, "{}", header.bright_white().bold())?;
    writeln!(w)?;
    writeln!(w, "{}", "----- TOTALS -----".bright_cyan())?;
    writeln!(
        w,
        "Total rewards distributed: {}",
        format_amount(s.total_rewards_distributed)
    )?;
    writeln!(
        w,
        "Total distributed in epoch: {}",
        format_amount(s.total_distributed)
    )?;
    writeln!(w, "Total slashed: {}", format_amount(s.total_slashed))?;
    writeln!(w, "Total rewards: {}", format_amount(s.total_rewards))?;
    writeln!(w, "Total claims: {}", format_amount(s.total_claims))?;
    writeln!(w, "Total Active SLICE: {}", format_amount(s.total_active_slice))?;
    writeln!(
        w,
        "Total Inactive SLICE: {}",
        format_amount(s.total_inactive_slice)
    )?;
    writeln!(w)?;
    writeln!(w, "{}", "----- USERS -----".bright_cyan())?;
    writeln!(w, "Total users: {}", s.total_users)?;
    writeln!(w, "Distributed users (non zero): {}", s.distributed_users)?;
    writeln!(w, "Non Distributed users: {}", s.non_distributed_users)?;
    writeln!(w, "Total Active Users: {}", s.total_active_user)?;
    writeln!(w, "Total Inactive Users: {}", s.total_inactive_user)?;
    writeln!(w, "Total Slashed Users: {}", s.total_slashed_user)?;
    writeln!(w)?;
    Ok(())
}

/// A period that could not be reported, as it appears in JSON output
#[derive(Debug, Clone, Serialize)]
pub struct PeriodFailure {
    pub period: String,
    pub error: String,
}

/// `Total Distributed` line for one period
#[derive(Debug, Clone, Serialize)]
pub struct DistributedTotal {
    pub period: String,
    #[serde(rename = "totalRewardsDistributed")]
    pub total_rewards_distributed: f64,
}

pub struct ReportDisplayManager {
    json_pretty: bool,
}

impl Default for ReportDisplayManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportDisplayManager {
    pub fn new() -> Self {
        Self { json_pretty: true }
    }

    pub fn with_json_pretty(json_pretty: bool) -> Self {
        Self { json_pretty }
    }

    fn to_json<T: Serialize>(&self, value: &T) -> serde_json::Result<String> {
        if self.json_pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        }
    }

    fn print_json<T: Serialize>(&self, value: &T) {
        match self.to_json(value) {
            Ok(json_str) => println!("{}", json_str),
            Err(e) => eprintln!("Error serializing report data to JSON: {}", e),
        }
    }

    pub fn display_reports_json(&self, summaries: &[ReportSummary], failures: &[PeriodFailure]) {
        let output = serde_json::json!({"reports": summaries, "errors": failures});
        self.print_json(&output);
    }

    /// Report a failed period on stderr
    pub fn display_failure(&self, failure: &PeriodFailure) {
        eprintln!(
            "{} {}: {}",
            "Error:".bright_red().bold(),
            failure.period,
            failure.error
        );
    }

    pub fn display_distributed(
        &self,
        totals: &[DistributedTotal],
        failures: &[PeriodFailure],
        json_output: bool,
    ) {
        if json_output {
            let output = serde_json::json!({"distributed": totals, "errors": failures});
            self.print_json(&output);
            return;
        }

        for total in totals {
            println!(
                "Year: {}, Total Distributed: {}",
                total.period.bright_white().bold(),
                format_amount(total.total_rewards_distributed).bright_green()
            );
        }
        for failure in failures {
            self.display_failure(failure);
        }
    }

    pub fn display_listing(&self, listings: &[PeriodListing], json_output: bool) {
        if json_output {
            let periods: Vec<_> = listings
                .iter()
                .map(|l| {
                    serde_json::json!({
                        "period": l.period.to_string(),
                        "complete": l.is_complete(),
                        "missing": l.missing.iter().map(|k| k.relative_path()).collect::<Vec<_>>(),
                    })
                })
                .collect();
            self.print_json(&serde_json::json!({ "periods": periods }));
            return;
        }

        if listings.is_empty() {
            println!("No report periods found.");
            return;
        }

        println!(
            "{} {} report periods found:",
            "📅".bright_blue(),
            listings.len().to_string().bright_white().bold()
        );
        for listing in listings {
            if listing.is_complete() {
                println!(
                    "   {}: {}",
                    listing.period.to_string().bright_white().bold(),
                    "complete".bright_green()
                );
            } else {
                let missing: Vec<&str> =
                    listing.missing.iter().map(|k| k.relative_path()).collect();
                println!(
                    "   {}: {} {}",
                    listing.period.to_string().bright_white().bold(),
                    "missing".bright_red(),
                    missing.join(", ")
                );
            }
        }
    }
}
