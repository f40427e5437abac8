//! Configuration system
//!
//! Layered configuration:
//! - Built-in defaults
//! - Config file (optional, TOML)
//! - Environment variable overrides
//! - Validation
//!
//! Command-line flags are applied on top by the binary.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::loader::DEFAULT_REPORTS_DIR;
use crate::models::Period;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Where report artifacts and log files live
    pub paths: PathsConfig,

    /// Output configuration
    pub output: OutputConfig,

    /// Default period range
    pub range: RangeConfig,

    /// File the configuration was read from, if any
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub output: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub reports_dir: PathBuf,
    pub log_directory: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub json_pretty: bool,
    pub color: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeConfig {
    pub start: String,
    pub end: String,
    /// Periods shown when the command line names neither periods nor a range
    pub periods: Vec<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "WARN".to_string(),
            format: "pretty".to_string(),
            output: "console".to_string(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            reports_dir: PathBuf::from(DEFAULT_REPORTS_DIR),
            log_directory: PathBuf::from("logs"),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            json_pretty: true,
            color: true,
        }
    }
}

impl Default for RangeConfig {
    fn default() -> Self {
        Self {
            start: "2021-1".to_string(),
            end: "2023-3".to_string(),
            periods: [
                "2022-9", "2022-10", "2022-11", "2022-12", "2023-1", "2023-2", "2023-3",
            ]
            .iter()
            .map(|p| p.to_string())
            .collect(),
        }
    }
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: [&str; 3] = ["pretty", "json", "compact"];
const LOG_OUTPUTS: [&str; 3] = ["console", "file", "both"];

impl RangeConfig {
    pub fn start_period(&self) -> Result<Period> {
        Period::parse(&self.start).with_context(|| format!("Invalid range start: {}", self.start))
    }

    pub fn end_period(&self) -> Result<Period> {
        Period::parse(&self.end).with_context(|| format!("Invalid range end: {}", self.end))
    }

    /// Default period selection; empty means every period in the range
    pub fn default_periods(&self) -> Result<Vec<Period>> {
        self.periods
            .iter()
            .map(|p| Period::parse(p).with_context(|| format!("Invalid default period: {}", p)))
            .collect()
    }
}

impl Config {
    /// Load configuration from file, environment, and defaults
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        let config_paths = [
            PathBuf::from("reward-stats.toml"),
            PathBuf::from(".reward-stats.toml"),
            dirs::config_dir()
                .map(|d| d.join("reward-stats").join("config.toml"))
                .unwrap_or_default(),
        ];

        for path in &config_paths {
            if path.is_file() {
                config = Self::load_from_file(path)?;
                break;
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a TOML file; absent keys keep their defaults
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.source = Some(path.to_path_buf());

        Ok(config)
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = env::var("LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = env::var("LOG_FORMAT") {
            self.logging.format = val;
        }
        if let Ok(val) = env::var("LOG_OUTPUT") {
            self.logging.output = val;
        }

        if let Ok(val) = env::var("REWARD_STATS_REPORTS_DIR") {
            self.paths.reports_dir = PathBuf::from(val);
        }
        if let Ok(val) = env::var("REWARD_STATS_LOG_DIR") {
            self.paths.log_directory = PathBuf::from(val);
        }

        if let Ok(val) = env::var("REWARD_STATS_START") {
            self.range.start = val;
        }
        if let Ok(val) = env::var("REWARD_STATS_END") {
            self.range.end = val;
        }
        if let Ok(val) = env::var("REWARD_STATS_PERIODS") {
            self.range.periods = val
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from)
                .collect();
        }

        if let Ok(val) = env::var("REWARD_STATS_JSON_PRETTY") {
            self.output.json_pretty = val
                .parse()
                .context("Invalid REWARD_STATS_JSON_PRETTY")?;
        }
        if let Ok(val) = env::var("REWARD_STATS_COLOR") {
            self.output.color = val.parse().context("Invalid REWARD_STATS_COLOR")?;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let level = self.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(anyhow::anyhow!(
                "Unknown log level '{}', expected one of {:?}",
                self.logging.level,
                LOG_LEVELS
            ));
        }

        if !LOG_FORMATS.contains(&self.logging.format.as_str()) {
            return Err(anyhow::anyhow!(
                "Unknown log format '{}', expected one of {:?}",
                self.logging.format,
                LOG_FORMATS
            ));
        }

        if !LOG_OUTPUTS.contains(&self.logging.output.as_str()) {
            return Err(anyhow::anyhow!(
                "Unknown log output '{}', expected one of {:?}",
                self.logging.output,
                LOG_OUTPUTS
            ));
        }

        let start = self.range.start_period()?;
        let end = self.range.end_period()?;
        if start > end {
            return Err(anyhow::anyhow!(
                "Range start {} is after range end {}",
                start,
                end
            ));
        }

        for period in self.range.default_periods()? {
            if period < start || period > end {
                return Err(anyhow::anyhow!(
                    "Default period {} is outside the range {} to {}",
                    period,
                    start,
                    end
                ));
            }
        }

        Ok(())
    }

    /// Save current configuration to file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        info!(path = %path.display(), "Configuration saved to file");

        Ok(())
    }
}
