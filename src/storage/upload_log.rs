//! Match upload log: which matches have already been merged.

use std::path::{Path, PathBuf};

use tracing::info;

use super::{JsonlReader, JsonlWriter, StorageError};
use crate::error::LedgerError;
use crate::models::{MatchId, UploadEntry};

/// Append-only record of applied matches, backed by a JSONL file.
pub struct UploadLog {
    writer: JsonlWriter<UploadEntry>,
    entries: Vec<UploadEntry>,
}

impl UploadLog {
    /// Open the log at `path`, reading any existing entries.
    ///
    /// A malformed line fails the open; an applied match is never forgotten.
    pub fn open(path: PathBuf) -> Result<Self, StorageError> {
        let entries = JsonlReader::<UploadEntry>::new(path.clone()).read_all()?;
        info!("Upload log has {} applied matches", entries.len());
        Ok(Self {
            writer: JsonlWriter::new(path),
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        self.writer.path()
    }

    pub fn is_applied(&self, match_id: &MatchId) -> bool {
        self.get(match_id).is_some()
    }

    pub fn get(&self, match_id: &MatchId) -> Option<&UploadEntry> {
        self.entries.iter().find(|e| e.match_id == *match_id)
    }

    /// Applied matches, oldest first.
    pub fn entries(&self) -> &[UploadEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record a match as applied.
    ///
    /// Fails with `DuplicateMatch` if it is already present. The entry is
    /// only kept in memory once it is durably appended.
    pub fn record_applied(&mut self, entry: UploadEntry) -> Result<(), LedgerError> {
        if self.is_applied(&entry.match_id) {
            return Err(LedgerError::DuplicateMatch(entry.match_id));
        }
        self.writer.append(&entry)?;
        info!("Recorded match {} as applied", entry.match_id);
        self.entries.push(entry);
        Ok(())
    }
}
