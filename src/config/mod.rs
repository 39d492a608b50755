//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::calculate::UnknownPlayerPolicy;

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

/// Ledger file locations and merge policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Player ledger (CSV), relative to `data_dir` unless absolute
    #[serde(default = "default_ledger_file")]
    pub ledger_file: PathBuf,

    /// Applied-match log (JSONL)
    #[serde(default = "default_upload_log_file")]
    pub upload_log_file: PathBuf,

    /// Sorted leaderboard export (CSV)
    #[serde(default = "default_leaderboard_file")]
    pub leaderboard_file: PathBuf,

    /// Directory of archived match files
    #[serde(default = "default_archive_dir")]
    pub archive_dir: PathBuf,

    /// What to do with rows for players not in the ledger
    #[serde(default)]
    pub unknown_player: UnknownPlayerPolicy,
}

fn default_ledger_file() -> PathBuf {
    PathBuf::from("players_master.csv")
}

fn default_upload_log_file() -> PathBuf {
    PathBuf::from("match_uploads.jsonl")
}

fn default_leaderboard_file() -> PathBuf {
    PathBuf::from("leaderboard.csv")
}

fn default_archive_dir() -> PathBuf {
    PathBuf::from("match_logs")
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            ledger_file: default_ledger_file(),
            upload_log_file: default_upload_log_file(),
            leaderboard_file: default_leaderboard_file(),
            archive_dir: default_archive_dir(),
            unknown_player: UnknownPlayerPolicy::default(),
        }
    }
}

/// Undo/redo retention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Maximum number of undo snapshots kept
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Keep history on disk so it survives restarts
    #[serde(default = "default_persist")]
    pub persist: bool,

    #[serde(default = "default_history_file")]
    pub history_file: PathBuf,
}

fn default_max_depth() -> usize {
    50
}

fn default_persist() -> bool {
    true
}

fn default_history_file() -> PathBuf {
    PathBuf::from("state/history.json")
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            persist: default_persist(),
            history_file: default_history_file(),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
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

    #[serde(default)]
    pub ledger: LedgerConfig,

    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default)]
    pub server: ServerConfig,
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
            ledger: LedgerConfig::default(),
            history: HistoryConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history.max_depth == 0 {
            return Err(ConfigError::ValidationError(
                "History max_depth must be greater than 0".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        let files = [
            ("ledger_file", &self.ledger.ledger_file),
            ("upload_log_file", &self.ledger.upload_log_file),
            ("leaderboard_file", &self.ledger.leaderboard_file),
            ("history_file", &self.history.history_file),
        ];
        for (name, path) in files {
            if path.file_name().is_none() {
                return Err(ConfigError::ValidationError(format!(
                    "{} must name a file",
                    name
                )));
            }
        }

        if self.ledger.ledger_file == self.ledger.leaderboard_file {
            return Err(ConfigError::ValidationError(
                "ledger_file and leaderboard_file must differ".to_string(),
            ));
        }

        Ok(())
    }
}
