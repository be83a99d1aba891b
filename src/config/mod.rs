//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::models::QueueType;
use crate::parse_duration;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Snapshot retention policy.
///
/// Durations are human-friendly strings ("24h", "30d", "52w"). The specific
/// depths are operational choices; only their ordering is enforced: rows stay
/// in the main tier for `main`, get compacted once older than `archive`, and
/// are deleted outright once older than `max`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionConfig {
    #[serde(default = "default_main_retention")]
    pub main: String,

    #[serde(default = "default_archive_retention")]
    pub archive: String,

    #[serde(default = "default_max_retention")]
    pub max: String,
}

fn default_main_retention() -> String {
    "30d".to_string()
}

fn default_archive_retention() -> String {
    "180d".to_string()
}

fn default_max_retention() -> String {
    "720d".to_string()
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            main: default_main_retention(),
            archive: default_archive_retention(),
            max: default_max_retention(),
        }
    }
}

impl RetentionConfig {
    pub fn main_duration(&self) -> Option<chrono::Duration> {
        parse_chrono(&self.main)
    }

    pub fn archive_duration(&self) -> Option<chrono::Duration> {
        parse_chrono(&self.archive)
    }

    pub fn max_duration(&self) -> Option<chrono::Duration> {
        parse_chrono(&self.max)
    }
}

fn parse_chrono(s: &str) -> Option<chrono::Duration> {
    let std = parse_duration(s)?;
    chrono::Duration::from_std(std).ok()
}

/// Keyset pagination limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Hard cap on rows per page.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,

    /// Cap on the absolute page-jump distance, bounding the offset cost.
    #[serde(default = "default_max_page_diff")]
    pub max_page_diff: u32,
}

fn default_max_page_size() -> u32 {
    100
}

fn default_max_page_diff() -> u32 {
    10
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            max_page_size: default_max_page_size(),
            max_page_diff: default_max_page_diff(),
        }
    }
}

/// Scheduler cadences for the daemon mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// How often to capture team snapshots.
    #[serde(default = "default_snapshot_interval")]
    pub snapshot_interval: String,

    /// How often to run the archive/compact/expire cycle.
    #[serde(default = "default_maintenance_interval")]
    pub maintenance_interval: String,
}

fn default_snapshot_interval() -> String {
    "1h".to_string()
}

fn default_maintenance_interval() -> String {
    "24h".to_string()
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            snapshot_interval: default_snapshot_interval(),
            maintenance_interval: default_maintenance_interval(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// The primary ladder queue; snapshots of other queues are flagged
    /// secondary.
    #[serde(default)]
    pub primary_queue: QueueType,

    #[serde(default)]
    pub retention: RetentionConfig,

    #[serde(default)]
    pub pagination: PaginationConfig,

    #[serde(default)]
    pub schedule: ScheduleConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            primary_queue: QueueType::default(),
            retention: RetentionConfig::default(),
            pagination: PaginationConfig::default(),
            schedule: ScheduleConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &PathBuf) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let main = self.retention.main_duration().ok_or_else(|| {
            ConfigError::ValidationError(format!("Invalid retention.main: {}", self.retention.main))
        })?;
        let archive = self.retention.archive_duration().ok_or_else(|| {
            ConfigError::ValidationError(format!(
                "Invalid retention.archive: {}",
                self.retention.archive
            ))
        })?;
        let max = self.retention.max_duration().ok_or_else(|| {
            ConfigError::ValidationError(format!("Invalid retention.max: {}", self.retention.max))
        })?;

        if main > archive || archive > max {
            return Err(ConfigError::ValidationError(
                "Retention depths must satisfy main <= archive <= max".to_string(),
            ));
        }

        if self.pagination.max_page_size == 0 {
            return Err(ConfigError::ValidationError(
                "max_page_size must be greater than 0".to_string(),
            ));
        }
        if self.pagination.max_page_diff == 0 {
            return Err(ConfigError::ValidationError(
                "max_page_diff must be greater than 0".to_string(),
            ));
        }

        if parse_duration(&self.schedule.snapshot_interval).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "Invalid snapshot_interval: {}",
                self.schedule.snapshot_interval
            )));
        }
        if parse_duration(&self.schedule.maintenance_interval).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "Invalid maintenance_interval: {}",
                self.schedule.maintenance_interval
            )));
        }

        Ok(())
    }
}
