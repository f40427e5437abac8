//! Per-period report
//!
//! A [`Report`] owns one month's artifacts and the metrics derived from them.
//! Construction does no I/O. Each artifact is read on first use and kept for
//! the lifetime of the report; each metric is computed once from the loaded
//! artifacts and memoized. Artifacts never change during a run, so nothing is
//! ever invalidated.
//!
//! A failed load is not memoized: asking again surfaces the same error again.

use once_cell::unsync::OnceCell;
use serde::de::DeserializeOwned;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::display::write_summary;
use crate::error::{StatsError, StatsResult};
use crate::loader::{load_artifact, ArtifactKind, DEFAULT_REPORTS_DIR};
use crate::models::*;

pub struct Report {
    period: Period,
    reports_dir: PathBuf,
    distribution: OnceCell<Vec<DistributionEntry>>,
    slashed: OnceCell<Vec<SlashedEntry>>,
    claims: OnceCell<ClaimsDocument>,
    rewards: OnceCell<Vec<RewardEntry>>,
    reporter_db: OnceCell<ReporterDatabase>,
    metrics: MetricCache,
}

#[derive(Default)]
struct MetricCache {
    total_distributed_raw: OnceCell<TokenAmount>,
    total_slashed_raw: OnceCell<TokenAmount>,
    total_rewards_raw: OnceCell<TokenAmount>,
    total_claims_raw: OnceCell<TokenAmount>,
    total_users: OnceCell<usize>,
    distributed_users: OnceCell<usize>,
    non_distributed_users: OnceCell<usize>,
    total_active_slice: OnceCell<f64>,
    total_inactive_slice: OnceCell<f64>,
    total_active_user: OnceCell<usize>,
    total_inactive_user: OnceCell<usize>,
    total_slashed_user: OnceCell<usize>,
}

fn sum_raw<'a, T, I>(records: I) -> TokenAmount
where
    T: Amounted + 'a,
    I: IntoIterator<Item = &'a T>,
{
    records
        .into_iter()
        .fold(0, |acc: TokenAmount, r| acc.saturating_add(r.raw_amount()))
}

fn count_where<'a, T, I, F>(records: I, predicate: F) -> usize
where
    T: 'a,
    I: IntoIterator<Item = &'a T>,
    F: Fn(&T) -> bool,
{
    records.into_iter().filter(|r| predicate(r)).count()
}

impl Report {
    /// Report for `year`-`month` under the default `../reports` directory
    pub fn new(year: i32, month: u32) -> StatsResult<Self> {
        Ok(Self::with_base_dir(DEFAULT_REPORTS_DIR, Period::new(year, month)?))
    }

    pub fn with_base_dir(reports_dir: impl Into<PathBuf>, period: Period) -> Self {
        Self {
            period,
            reports_dir: reports_dir.into(),
            distribution: OnceCell::new(),
            slashed: OnceCell::new(),
            claims: OnceCell::new(),
            rewards: OnceCell::new(),
            reporter_db: OnceCell::new(),
            metrics: MetricCache::default(),
        }
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn reports_dir(&self) -> &Path {
        &self.reports_dir
    }

    /// Artifacts that have been read so far
    pub fn loaded_artifacts(&self) -> Vec<ArtifactKind> {
        let loaded = [
            self.distribution.get().is_some(),
            self.slashed.get().is_some(),
            self.claims.get().is_some(),
            self.rewards.get().is_some(),
            self.reporter_db.get().is_some(),
        ];
        ArtifactKind::ALL
            .into_iter()
            .zip(loaded)
            .filter_map(|(kind, is_loaded)| is_loaded.then_some(kind))
            .collect()
    }

    fn load<T: DeserializeOwned>(&self, kind: ArtifactKind) -> StatsResult<T> {
        load_artifact(&self.reports_dir, self.period, kind)
    }

    // readers

    pub fn distribution(&self) -> StatsResult<&[DistributionEntry]> {
        self.distribution
            .get_or_try_init(|| self.load(ArtifactKind::Distribution))
            .map(Vec::as_slice)
    }

    pub fn slashed(&self) -> StatsResult<&[SlashedEntry]> {
        self.slashed
            .get_or_try_init(|| self.load(ArtifactKind::Slashed))
            .map(Vec::as_slice)
    }

    pub fn claims(&self) -> StatsResult<&ClaimsDocument> {
        self.claims.get_or_try_init(|| self.load(ArtifactKind::Claims))
    }

    pub fn rewards(&self) -> StatsResult<&[RewardEntry]> {
        self.rewards
            .get_or_try_init(|| self.load(ArtifactKind::Rewards))
            .map(Vec::as_slice)
    }

    pub fn reporter_db(&self) -> StatsResult<&ReporterDatabase> {
        self.reporter_db
            .get_or_try_init(|| self.load(ArtifactKind::ReporterDb))
    }

    // raw totals

    pub fn total_distributed_raw(&self) -> StatsResult<TokenAmount> {
        self.metrics
            .total_distributed_raw
            .get_or_try_init(|| self.distribution().map(|d| sum_raw(d)))
            .copied()
    }

    pub fn total_slashed_raw(&self) -> StatsResult<TokenAmount> {
        self.metrics
            .total_slashed_raw
            .get_or_try_init(|| self.slashed().map(|s| sum_raw(s)))
            .copied()
    }

    pub fn total_rewards_raw(&self) -> StatsResult<TokenAmount> {
        self.metrics
            .total_rewards_raw
            .get_or_try_init(|| self.rewards().map(|r| sum_raw(r)))
            .copied()
    }

    pub fn total_claims_raw(&self) -> StatsResult<TokenAmount> {
        self.metrics
            .total_claims_raw
            .get_or_try_init(|| self.claims().map(|c| sum_raw(c.recipients.values())))
            .copied()
    }

    // readable totals

    pub fn total_distributed(&self) -> StatsResult<f64> {
        self.total_distributed_raw().map(to_readable)
    }

    pub fn total_slashed(&self) -> StatsResult<f64> {
        self.total_slashed_raw().map(to_readable)
    }

    pub fn total_rewards(&self) -> StatsResult<f64> {
        self.total_rewards_raw().map(to_readable)
    }

    /// Sum over every recipient in the claims document, claimed or not
    pub fn total_claims(&self) -> StatsResult<f64> {
        self.total_claims_raw().map(to_readable)
    }

    /// The claims pipeline's own running total. Not derived from
    /// [`Report::total_claims`] and not expected to match it.
    pub fn total_rewards_distributed(&self) -> StatsResult<f64> {
        Ok(to_readable(self.claims()?.total_rewards_distributed))
    }

    /// Mean distributed amount per distribution record, 0.0 when there are none
    pub fn average_distributed(&self) -> StatsResult<f64> {
        let users = self.total_users()?;
        if users == 0 {
            return Ok(0.0);
        }
        Ok(self.total_distributed()? / users as f64)
    }

    // user counts

    pub fn total_users(&self) -> StatsResult<usize> {
        self.metrics
            .total_users
            .get_or_try_init(|| self.distribution().map(|d| d.len()))
            .copied()
    }

    pub fn distributed_users(&self) -> StatsResult<usize> {
        self.metrics
            .distributed_users
            .get_or_try_init(|| {
                self.distribution()
                    .map(|d| count_where(d, DistributionEntry::is_distributed))
            })
            .copied()
    }

    pub fn non_distributed_users(&self) -> StatsResult<usize> {
        self.metrics
            .non_distributed_users
            .get_or_try_init(|| {
                self.distribution()
                    .map(|d| count_where(d, |e: &DistributionEntry| !e.is_distributed()))
            })
            .copied()
    }

    // reporter database

    /// Readable `slice_amount` held by accounts in `state`. An unknown state
    /// matches nothing and yields 0.0.
    pub fn total_for_state(&self, state: &str) -> StatsResult<f64> {
        let accounts = &self.reporter_db()?.accounts;
        Ok(to_readable(sum_raw(
            accounts.values().filter(|a| a.is_in_state(state)),
        )))
    }

    pub fn count_for_state(&self, state: &str) -> StatsResult<usize> {
        let accounts = &self.reporter_db()?.accounts;
        Ok(count_where(accounts.values(), |a: &ReporterAccount| a.is_in_state(state)))
    }

    /// Every account in the reporter database, whatever its state
    pub fn total_accounts(&self) -> StatsResult<usize> {
        Ok(self.reporter_db()?.accounts.len())
    }

    pub fn total_active_slice(&self) -> StatsResult<f64> {
        self.metrics
            .total_active_slice
            .get_or_try_init(|| self.total_for_state(state::ACTIVE))
            .copied()
    }

    pub fn total_inactive_slice(&self) -> StatsResult<f64> {
        self.metrics
            .total_inactive_slice
            .get_or_try_init(|| self.total_for_state(state::INACTIVE))
            .copied()
    }

    pub fn total_active_user(&self) -> StatsResult<usize> {
        self.metrics
            .total_active_user
            .get_or_try_init(|| self.count_for_state(state::ACTIVE))
            .copied()
    }

    pub fn total_inactive_user(&self) -> StatsResult<usize> {
        self.metrics
            .total_inactive_user
            .get_or_try_init(|| self.count_for_state(state::INACTIVE))
            .copied()
    }

    pub fn total_slashed_user(&self) -> StatsResult<usize> {
        self.metrics
            .total_slashed_user
            .get_or_try_init(|| self.count_for_state(state::SLASHED))
            .copied()
    }

    // output

    /// Every metric of this period. Fails on the first artifact that cannot
    /// be loaded.
    pub fn summary(&self) -> StatsResult<ReportSummary> {
        Ok(ReportSummary {
            period: self.period.to_string(),
            total_rewards_distributed: self.total_rewards_distributed()?,
            total_distributed: self.total_distributed()?,
            average_distributed: self.average_distributed()?,
            total_slashed: self.total_slashed()?,
            total_rewards: self.total_rewards()?,
            total_claims: self.total_claims()?,
            total_active_slice: self.total_active_slice()?,
            total_inactive_slice: self.total_inactive_slice()?,
            total_users: self.total_users()?,
            distributed_users: self.distributed_users()?,
            non_distributed_users: self.non_distributed_users()?,
            total_active_user: self.total_active_user()?,
            total_inactive_user: self.total_inactive_user()?,
            total_slashed_user: self.total_slashed_user()?,
        })
    }

    /// Write the TOTALS / USERS layout into `writer`.
    ///
    /// All metrics are computed before anything is written, so a broken
    /// artifact never leaves a half-printed report behind.
    pub fn write_report<W: Write>(&self, writer: &mut W) -> StatsResult<()> {
        let summary = self.summary()?;
        write_summary(writer, &summary).map_err(|e| StatsError::Output(e.to_string()))
    }

    /// Print the report to standard output
    pub fn report(&self) -> StatsResult<()> {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        self.write_report(&mut handle)
    }
}
