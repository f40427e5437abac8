//! Core Data Models
//!
//! Typed records for the five per-period artifacts, the [`Period`] key, and
//! the conversion from raw integer token units to readable units.
//!
//! ## Artifacts
//!
//! - [`DistributionEntry`] - per-recipient allocation (`json/distribution.json`)
//! - [`SlashedEntry`] - penalty deduction (`json/slashed.json`)
//! - [`RewardEntry`] - reward record (`json/rewards.json`)
//! - [`ClaimsDocument`] / [`ClaimEntry`] - claims snapshot (`claims.json`)
//! - [`ReporterDatabase`] / [`ReporterAccount`] - account states (`reporter-db.json`)
//!
//! Amounts are raw integers scaled by 10^18. The artifacts are not consistent
//! about how they encode them, so every amount field accepts an integer, a
//! whole float literal, or a decimal string (see [`amount`]).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::StatsError;

/// Raw token amount (smallest unit: 10^-18 of a token)
pub type TokenAmount = u128;

pub const UNITS_PER_TOKEN: f64 = 1e18;

/// Convert a raw amount into readable token units
pub fn to_readable(raw: TokenAmount) -> f64 {
    raw as f64 / UNITS_PER_TOKEN
}

/// A calendar month reporting window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self, StatsError> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|_| Self { year, month })
            .ok_or_else(|| StatsError::InvalidPeriod(format!("{}-{}", year, month)))
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The following month, rolling over into the next year after December
    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Parse `"2022-9"` or `"2022-09"`
    pub fn parse(s: &str) -> Result<Self, StatsError> {
        let s = s.trim();
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| StatsError::InvalidPeriod(s.to_string()))?;
        let year: i32 = year
            .parse()
            .map_err(|_| StatsError::InvalidPeriod(s.to_string()))?;
        let month: u32 = month
            .parse()
            .map_err(|_| StatsError::InvalidPeriod(s.to_string()))?;
        Self::new(year, month)
    }
}

/// Month is never zero-padded: this is also the on-disk directory name.
impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.year, self.month)
    }
}

impl FromStr for Period {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Account states recorded in the reporter database
pub mod state {
    pub const ACTIVE: &str = "active";
    pub const INACTIVE: &str = "inactive";
    pub const SLASHED: &str = "slashed";
}

/// Anything that carries a single raw amount used in aggregation
pub trait Amounted {
    fn raw_amount(&self) -> TokenAmount;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionEntry {
    #[serde(with = "amount")]
    pub amount: TokenAmount,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlashedEntry {
    #[serde(with = "amount")]
    pub slice_amount: TokenAmount,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardEntry {
    #[serde(with = "amount")]
    pub amount: TokenAmount,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimEntry {
    #[serde(with = "amount")]
    pub amount: TokenAmount,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimsDocument {
    /// Running total maintained by the claims pipeline, independent of `recipients`
    #[serde(rename = "totalRewardsDistributed", with = "amount")]
    pub total_rewards_distributed: TokenAmount,
    pub recipients: HashMap<String, ClaimEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReporterAccount {
    pub state: String,
    #[serde(with = "amount")]
    pub slice_amount: TokenAmount,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReporterDatabase {
    pub accounts: HashMap<String, ReporterAccount>,
}

impl Amounted for DistributionEntry {
    fn raw_amount(&self) -> TokenAmount {
        self.amount
    }
}

impl Amounted for SlashedEntry {
    fn raw_amount(&self) -> TokenAmount {
        self.slice_amount
    }
}

impl Amounted for RewardEntry {
    fn raw_amount(&self) -> TokenAmount {
        self.amount
    }
}

impl Amounted for ClaimEntry {
    fn raw_amount(&self) -> TokenAmount {
        self.amount
    }
}

impl Amounted for ReporterAccount {
    fn raw_amount(&self) -> TokenAmount {
        self.slice_amount
    }
}

impl DistributionEntry {
    pub fn is_distributed(&self) -> bool {
        self.amount != 0
    }
}

impl ReporterAccount {
    pub fn is_in_state(&self, state: &str) -> bool {
        self.state == state
    }
}

/// Every metric of one period, in readable units where amounts are involved
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub period: String,
    #[serde(rename = "totalRewardsDistributed")]
    pub total_rewards_distributed: f64,
    #[serde(rename = "totalDistributed")]
    pub total_distributed: f64,
    #[serde(rename = "averageDistributed")]
    pub average_distributed: f64,
    #[serde(rename = "totalSlashed")]
    pub total_slashed: f64,
    #[serde(rename = "totalRewards")]
    pub total_rewards: f64,
    #[serde(rename = "totalClaims")]
    pub total_claims: f64,
    #[serde(rename = "totalActiveSlice")]
    pub total_active_slice: f64,
    #[serde(rename = "totalInactiveSlice")]
    pub total_inactive_slice: f64,
    #[serde(rename = "totalUsers")]
    pub total_users: usize,
    #[serde(rename = "distributedUsers")]
    pub distributed_users: usize,
    #[serde(rename = "nonDistributedUsers")]
    pub non_distributed_users: usize,
    #[serde(rename = "totalActiveUsers")]
    pub total_active_user: usize,
    #[serde(rename = "totalInactiveUsers")]
    pub total_inactive_user: usize,
    #[serde(rename = "totalSlashedUsers")]
    pub total_slashed_user: usize,
}

/// Serde adapter for raw amounts.
///
/// Accepts a JSON integer, a whole non-negative float (`5e18`), or a decimal
/// string. Serializes back as a decimal string so values above `u64::MAX`
/// survive a round trip.
pub mod amount {
    use super::TokenAmount;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawAmount {
        Unsigned(u64),
        Signed(i64),
        Float(f64),
        Text(String),
    }

    pub fn serialize<S>(value: &TokenAmount, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<TokenAmount, D::Error>
    where
        D: Deserializer<'de>,
    {
        match RawAmount::deserialize(deserializer)? {
            RawAmount::Unsigned(n) => Ok(n as TokenAmount),
            RawAmount::Signed(n) => Err(D::Error::custom(format!(
                "amount must not be negative, got {}",
                n
            ))),
            RawAmount::Float(f) => {
                if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f < TokenAmount::MAX as f64 {
                    Ok(f as TokenAmount)
                } else {
                    Err(D::Error::custom(format!(
                        "amount must be a non-negative whole number, got {}",
                        f
                    )))
                }
            }
            RawAmount::Text(s) => s.trim().parse::<TokenAmount>().map_err(|_| {
                D::Error::custom(format!("amount is not an integer string: {:?}", s))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_display_is_unpadded() {
        assert_eq!(Period::new(2022, 9).unwrap().to_string(), "2022-9");
        assert_eq!(Period::new(2023, 12).unwrap().to_string(), "2023-12");
    }

    #[test]
    fn test_period_rejects_bad_month() {
        assert!(Period::new(2022, 0).is_err());
        assert!(Period::new(2022, 13).is_err());
    }

    #[test]
    fn test_period_next_rolls_over_year() {
        let dec = Period::new(2022, 12).unwrap();
        assert_eq!(dec.next(), Period::new(2023, 1).unwrap());
        assert_eq!(
            Period::new(2022, 3).unwrap().next(),
            Period::new(2022, 4).unwrap()
        );
    }

    #[test]
    fn test_period_parse() {
        assert_eq!(Period::parse("2022-9").unwrap(), Period::new(2022, 9).unwrap());
        assert_eq!(Period::parse("2022-09").unwrap(), Period::new(2022, 9).unwrap());
        assert!(Period::parse("2022").is_err());
        assert!(Period::parse("2022-x").is_err());
        assert!(Period::parse("2022-13").is_err());
    }

    #[test]
    fn test_period_ordering_is_chronological() {
        let a = Period::new(2022, 12).unwrap();
        let b = Period::new(2023, 1).unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_amount_accepts_integer_float_and_string() {
        let entries: Vec<DistributionEntry> = serde_json::from_str(
            r#"[{"amount": 0}, {"amount": 5e18}, {"amount": "3000000000000000000"}]"#,
        )
        .unwrap();
        let amounts: Vec<TokenAmount> = entries.iter().map(|e| e.amount).collect();
        assert_eq!(amounts, vec![0, 5_000_000_000_000_000_000, 3_000_000_000_000_000_000]);
    }

    #[test]
    fn test_amount_rejects_negative_and_fractional() {
        assert!(serde_json::from_str::<RewardEntry>(r#"{"amount": -1}"#).is_err());
        assert!(serde_json::from_str::<RewardEntry>(r#"{"amount": 1.5}"#).is_err());
        assert!(serde_json::from_str::<RewardEntry>(r#"{"amount": "abc"}"#).is_err());
    }

    #[test]
    fn test_missing_field_is_an_error() {
        assert!(serde_json::from_str::<SlashedEntry>(r#"{"amount": 1}"#).is_err());
        assert!(serde_json::from_str::<ReporterAccount>(r#"{"slice_amount": 1}"#).is_err());
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let entry: DistributionEntry =
            serde_json::from_str(r#"{"address": "0xabc", "amount": 7}"#).unwrap();
        assert_eq!(entry.amount, 7);
    }

    #[test]
    fn test_to_readable() {
        assert_eq!(to_readable(1_500_000_000_000_000_000), 1.5);
        assert_eq!(to_readable(0), 0.0);
    }
}
