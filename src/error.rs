//! Error types for report aggregation
//!
//! Every failure is tied to the period and artifact that produced it so one
//! broken month never hides the others.

use std::path::PathBuf;

use thiserror::Error;

use crate::models::Period;

#[derive(Error, Debug)]
pub enum StatsError {
    /// A required JSON artifact does not exist for the period
    #[error("{artifact} not found for {period}: {}", .path.display())]
    ArtifactMissing {
        period: Period,
        artifact: &'static str,
        path: PathBuf,
    },

    /// The artifact exists but is not valid JSON or lacks a required field
    #[error("Malformed {artifact} for {period} ({}): {reason}", .path.display())]
    MalformedArtifact {
        period: Period,
        artifact: &'static str,
        path: PathBuf,
        reason: String,
    },

    /// Any other I/O failure while reading an artifact
    #[error("I/O error reading {}: {reason}", .path.display())]
    Io { path: PathBuf, reason: String },

    /// Writing the formatted report failed
    #[error("Output error: {0}")]
    Output(String),

    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    /// A period was requested that the registry was not built for
    #[error("Period {0} is outside the requested range")]
    UnknownPeriod(String),
}

impl StatsError {
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::ArtifactMissing { .. })
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedArtifact { .. })
    }
}

pub type StatsResult<T> = Result<T, StatsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_artifact_display() {
        let err = StatsError::ArtifactMissing {
            period: Period::new(2022, 9).unwrap(),
            artifact: "claims",
            path: PathBuf::from("../reports/2022-9/claims.json"),
        };
        assert_eq!(
            err.to_string(),
            "claims not found for 2022-9: ../reports/2022-9/claims.json"
        );
        assert!(err.is_missing());
        assert!(!err.is_malformed());
    }

    #[test]
    fn test_malformed_artifact_display() {
        let err = StatsError::MalformedArtifact {
            period: Period::new(2023, 1).unwrap(),
            artifact: "distribution",
            path: PathBuf::from("r/2023-1/json/distribution.json"),
            reason: "missing field `amount`".into(),
        };
        assert_eq!(
            err.to_string(),
            "Malformed distribution for 2023-1 (r/2023-1/json/distribution.json): missing field `amount`"
        );
        assert!(err.is_malformed());
    }

    #[test]
    fn test_unknown_period_display() {
        let err = StatsError::UnknownPeriod("2030-1".into());
        assert_eq!(err.to_string(), "Period 2030-1 is outside the requested range");
    }
}
