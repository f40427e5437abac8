//! Artifact discovery and loading
//!
//! Each period lives in `<reports_dir>/<year>-<month>/` and carries five JSON
//! artifacts. This module knows their relative paths, reads and validates them
//! into typed records, and discovers which period directories exist.

use glob::glob;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{StatsError, StatsResult};
use crate::models::Period;

/// Default location of the per-period report directories
pub const DEFAULT_REPORTS_DIR: &str = "../reports";

/// The five artifacts a period directory is expected to contain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Distribution,
    Slashed,
    Claims,
    Rewards,
    ReporterDb,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 5] = [
        ArtifactKind::Distribution,
        ArtifactKind::Slashed,
        ArtifactKind::Claims,
        ArtifactKind::Rewards,
        ArtifactKind::ReporterDb,
    ];

    pub fn relative_path(&self) -> &'static str {
        match self {
            Self::Distribution => "json/distribution.json",
            Self::Slashed => "json/slashed.json",
            Self::Claims => "claims.json",
            Self::Rewards => "json/rewards.json",
            Self::ReporterDb => "reporter-db.json",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Distribution => "distribution",
            Self::Slashed => "slashed",
            Self::Claims => "claims",
            Self::Rewards => "rewards",
            Self::ReporterDb => "reporter database",
        }
    }
}

/// Directory holding all artifacts of `period`
pub fn period_dir(reports_dir: &Path, period: Period) -> PathBuf {
    reports_dir.join(period.to_string())
}

pub fn artifact_path(reports_dir: &Path, period: Period, kind: ArtifactKind) -> PathBuf {
    period_dir(reports_dir, period).join(kind.relative_path())
}

/// Read one artifact of `period` and validate it into `T`.
///
/// A missing file is [`StatsError::ArtifactMissing`]; unparseable content or
/// a record lacking a required field is [`StatsError::MalformedArtifact`].
pub fn load_artifact<T>(reports_dir: &Path, period: Period, kind: ArtifactKind) -> StatsResult<T>
where
    T: DeserializeOwned,
{
    let path = artifact_path(reports_dir, period, kind);
    debug!(period = %period, artifact = kind.name(), path = %path.display(), "Loading artifact");

    let file = match File::open(&path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(StatsError::ArtifactMissing {
                period,
                artifact: kind.name(),
                path,
            });
        }
        Err(e) => {
            return Err(StatsError::Io {
                path,
                reason: e.to_string(),
            });
        }
    };

    serde_json::from_reader(BufReader::new(file)).map_err(|e| StatsError::MalformedArtifact {
        period,
        artifact: kind.name(),
        path,
        reason: e.to_string(),
    })
}

/// Which artifacts of a discovered period are present on disk
#[derive(Debug, Clone)]
pub struct PeriodListing {
    pub period: Period,
    pub present: Vec<ArtifactKind>,
    pub missing: Vec<ArtifactKind>,
}

impl PeriodListing {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Find every `<year>-<month>` directory under `reports_dir`, oldest first.
///
/// Directory names that are not valid periods are skipped, as are names that
/// differ from the canonical unpadded key (`2022-09`), since reports never read
/// from them.
pub fn discover_periods(reports_dir: &Path) -> StatsResult<Vec<PeriodListing>> {
    let pattern = reports_dir.join("*-*");
    let entries = glob(&pattern.to_string_lossy()).map_err(|e| StatsError::Io {
        path: reports_dir.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut listings = Vec::new();
    for entry in entries.flatten() {
        if !entry.is_dir() {
            continue;
        }
        let Some(name) = entry.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Ok(period) = Period::parse(name) else {
            debug!(dir = %entry.display(), "Skipping directory that is not a period");
            continue;
        };
        if period.to_string() != name {
            debug!(
                dir = %entry.display(),
                expected = %period,
                "Skipping non-canonical period directory"
            );
            continue;
        }

        let (present, missing): (Vec<_>, Vec<_>) = ArtifactKind::ALL
            .into_iter()
            .partition(|kind| entry.join(kind.relative_path()).is_file());
        listings.push(PeriodListing {
            period,
            present,
            missing,
        });
    }

    listings.sort_by_key(|l| l.period);
    Ok(listings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClaimsDocument, DistributionEntry};
    use std::fs;
    use tempfile::TempDir;

    fn period(y: i32, m: u32) -> Period {
        Period::new(y, m).unwrap()
    }

    #[test]
    fn test_artifact_paths() {
        let base = Path::new("../reports");
        assert_eq!(
            artifact_path(base, period(2022, 9), ArtifactKind::Distribution),
            PathBuf::from("../reports/2022-9/json/distribution.json")
        );
        assert_eq!(
            artifact_path(base, period(2023, 1), ArtifactKind::ReporterDb),
            PathBuf::from("../reports/2023-1/reporter-db.json")
        );
        assert_eq!(
            artifact_path(base, period(2023, 1), ArtifactKind::Claims),
            PathBuf::from("../reports/2023-1/claims.json")
        );
    }

    #[test]
    fn test_load_missing_artifact() {
        let temp_dir = TempDir::new().unwrap();
        let err = load_artifact::<Vec<DistributionEntry>>(
            temp_dir.path(),
            period(2022, 1),
            ArtifactKind::Distribution,
        )
        .unwrap_err();
        assert!(err.is_missing());
    }

    #[test]
    fn test_load_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("2022-1");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("claims.json"), "not json at all").unwrap();

        let err = load_artifact::<ClaimsDocument>(temp_dir.path(), period(2022, 1), ArtifactKind::Claims)
            .unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_load_valid_artifact() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("2022-1").join("json");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("distribution.json"), r#"[{"amount": 1}, {"amount": 2}]"#).unwrap();

        let entries: Vec<DistributionEntry> =
            load_artifact(temp_dir.path(), period(2022, 1), ArtifactKind::Distribution).unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_discover_periods() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("2022-10").join("json")).unwrap();
        fs::create_dir_all(root.join("2022-9")).unwrap();
        fs::create_dir_all(root.join("not-a-period")).unwrap();
        fs::write(root.join("2022-10").join("claims.json"), "{}").unwrap();
        fs::write(root.join("2022-10").join("json").join("distribution.json"), "[]").unwrap();

        let listings = discover_periods(root).unwrap();
        let periods: Vec<String> = listings.iter().map(|l| l.period.to_string()).collect();
        assert_eq!(periods, vec!["2022-9", "2022-10"]);

        assert!(listings[0].present.is_empty());
        assert_eq!(
            listings[1].present,
            vec![ArtifactKind::Distribution, ArtifactKind::Claims]
        );
        assert!(!listings[1].is_complete());
    }

    #[test]
    fn test_discover_skips_padded_directories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        for kind in ArtifactKind::ALL {
            let path = root.join("2022-09").join(kind.relative_path());
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "{}").unwrap();
        }
        fs::create_dir_all(root.join("2022-10")).unwrap();

        let listings = discover_periods(root).unwrap();
        let periods: Vec<String> = listings.iter().map(|l| l.period.to_string()).collect();
        assert_eq!(periods, vec!["2022-10"]);
    }
}
