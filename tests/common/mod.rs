#![allow(dead_code)]

use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Three recipients, one of them with nothing distributed: 8 tokens in total
pub const DISTRIBUTION: &str =
    r#"[{"address": "0x01", "amount": 0}, {"address": "0x02", "amount": 5e18}, {"address": "0x03", "amount": 3000000000000000000}]"#;

pub const SLASHED: &str = r#"[{"slice_amount": 250000000000000000}]"#;

pub const REWARDS: &str = r#"[{"amount": 4000000000000000000}, {"amount": "6000000000000000000"}]"#;

pub const CLAIMS: &str = r#"{
    "totalRewardsDistributed": "2000000000000000000",
    "recipients": {
        "a": {"amount": "1000000000000000000"},
        "b": {"amount": "500000000000000000"}
    }
}"#;

pub const REPORTER_DB: &str = r#"{
    "accounts": {
        "x": {"state": "active", "slice_amount": 1e18},
        "y": {"state": "inactive", "slice_amount": 2e18},
        "z": {"state": "slashed", "slice_amount": 4000000000000000000}
    }
}"#;

/// A temporary reports directory laid out as `<year>-<month>/...`
pub struct ReportsFixture {
    dir: TempDir,
}

impl ReportsFixture {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, period: &str, relative: &str, content: &str) {
        let path = self.dir.path().join(period).join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create period dir");
        }
        fs::write(&path, content).expect("Failed to write artifact");
    }

    pub fn remove(&self, period: &str, relative: &str) {
        fs::remove_file(self.dir.path().join(period).join(relative))
            .expect("Failed to remove artifact");
    }

    /// Write all five artifacts for `period` using the sample documents above
    pub fn write_complete_period(&self, period: &str) {
        self.write(period, "json/distribution.json", DISTRIBUTION);
        self.write(period, "json/slashed.json", SLASHED);
        self.write(period, "json/rewards.json", REWARDS);
        self.write(period, "claims.json", CLAIMS);
        self.write(period, "reporter-db.json", REPORTER_DB);
    }
}
