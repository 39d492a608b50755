//! Filesystem persistence.
//!
//! Handles reading and writing everything the tracker keeps on disk:
//! - The player ledger and leaderboard (CSV)
//! - The match upload log (JSONL, append-only)
//! - Archived match files (CSV)
//! - Snapshot history (JSON)
//!
//! Files that are replaced as a whole go through [`write_atomic`], so a
//! reader never sees a half-written file.

mod archive;
mod jsonl;
mod ledger_store;
mod upload_log;

pub use archive::*;
pub use jsonl::*;
pub use ledger_store::*;
pub use upload_log::*;

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::config::AppConfig;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Malformed entry at {path:?} line {line}: {source}")]
    MalformedEntry {
        path: PathBuf,
        line: usize,
        source: serde_json::Error,
    },
}

/// Resolved locations of every file the tracker uses.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub ledger_file: PathBuf,
    pub upload_log_file: PathBuf,
    pub leaderboard_file: PathBuf,
    pub archive_dir: PathBuf,
    pub history_file: PathBuf,
}

impl StorageConfig {
    /// Default layout under `data_dir`.
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            ledger_file: data_dir.join("players_master.csv"),
            upload_log_file: data_dir.join("match_uploads.jsonl"),
            leaderboard_file: data_dir.join("leaderboard.csv"),
            archive_dir: data_dir.join("match_logs"),
            history_file: data_dir.join("state").join("history.json"),
            data_dir,
        }
    }

    /// Layout from configuration; relative entries resolve under `data_dir`.
    pub fn from_config(config: &AppConfig) -> Self {
        let data_dir = config.data_dir.clone();
        let resolve = |p: &Path| {
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                data_dir.join(p)
            }
        };
        Self {
            ledger_file: resolve(&config.ledger.ledger_file),
            upload_log_file: resolve(&config.ledger.upload_log_file),
            leaderboard_file: resolve(&config.ledger.leaderboard_file),
            archive_dir: resolve(&config.ledger.archive_dir),
            history_file: resolve(&config.history.history_file),
            data_dir: data_dir.clone(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}

/// Ensure the parent directory of `path` exists.
pub(crate) fn ensure_parent(path: &Path) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Replace `path` with `contents`: write a sibling temp file, sync it, then
/// rename it over the target.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), StorageError> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| StorageError::InvalidPath(path.display().to_string()))?;
    ensure_parent(path)?;

    let temp_path = path.with_file_name(format!(".{}.tmp", file_name));
    {
        let mut file = File::create(&temp_path)?;
        file.write_all(contents)?;
        file.flush()?;
        file.sync_all()?;
    }

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e.into());
    }

    debug!("Wrote {} bytes to {:?}", contents.len(), path);
    Ok(())
}
