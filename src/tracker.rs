//! Tracker session.
//!
//! Ties the pieces together for one interactive session:
//! 1. Dedup check against the upload log
//! 2. Score and merge the match into a ledger copy
//! 3. Persist the ledger, then the log entry
//! 4. Push the pre-mutation snapshot
//!
//! Reset, undo and redo go through the same store and history. A `Tracker`
//! takes `&mut self` for every mutation, so wrapping it in a mutex makes the
//! whole sequence a single critical section.

use chrono::Utc;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::calculate::{merge_match, Credit, UnknownPlayerPolicy};
use crate::config::AppConfig;
use crate::error::{LedgerError, Result};
use crate::history::{Mutation, SnapshotHistory};
use crate::leaderboard::{self, Standing};
use crate::models::{Ledger, MatchId, MatchUpload, PlayerKey, PlayerRecord, UploadEntry};
use crate::storage::{LedgerStore, MatchArchive, StorageConfig, UploadLog};

/// Behaviour knobs, normally taken from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct TrackerOptions {
    pub unknown_player: UnknownPlayerPolicy,
    pub max_depth: usize,
    pub persist_history: bool,
}

impl Default for TrackerOptions {
    fn default() -> Self {
        Self {
            unknown_player: UnknownPlayerPolicy::default(),
            max_depth: 50,
            persist_history: true,
        }
    }
}

impl From<&AppConfig> for TrackerOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            unknown_player: config.ledger.unknown_player,
            max_depth: config.history.max_depth,
            persist_history: config.history.persist,
        }
    }
}

/// What an applied match did to the ledger.
#[derive(Debug, Clone, Serialize)]
pub struct MatchReport {
    pub match_id: MatchId,
    pub rows: usize,
    pub points_awarded: i64,
    pub credited: Vec<Credit>,
    pub skipped: Vec<PlayerKey>,
    pub registered: Vec<PlayerKey>,
    pub snapshot_version: u64,
}

pub struct Tracker {
    storage: StorageConfig,
    store: LedgerStore,
    uploads: UploadLog,
    archive: MatchArchive,
    history: SnapshotHistory,
    options: TrackerOptions,
}

impl Tracker {
    /// Open a session using the configured file layout.
    pub fn open(config: &AppConfig) -> Result<Self> {
        Self::with_storage(StorageConfig::from_config(config), TrackerOptions::from(config))
    }

    pub fn with_storage(storage: StorageConfig, options: TrackerOptions) -> Result<Self> {
        let history = if options.persist_history {
            SnapshotHistory::load_or_new(&storage.history_file, options.max_depth)
        } else {
            SnapshotHistory::new(options.max_depth)
        };

        let tracker = Self {
            store: LedgerStore::new(storage.ledger_file.clone()),
            uploads: UploadLog::open(storage.upload_log_file.clone())?,
            archive: MatchArchive::new(storage.archive_dir.clone()),
            history,
            options,
            storage,
        };
        info!(
            "Tracker ready (ledger: {:?}, initialized: {})",
            tracker.store.path(),
            tracker.store.is_initialized()
        );
        Ok(tracker)
    }

    pub fn storage(&self) -> &StorageConfig {
        &self.storage
    }

    pub fn is_initialized(&self) -> bool {
        self.store.is_initialized()
    }

    /// The current stored ledger.
    pub fn ledger(&self) -> Result<Ledger> {
        self.store.load()
    }

    pub fn history(&self) -> &SnapshotHistory {
        &self.history
    }

    pub fn is_applied(&self, match_id: &MatchId) -> bool {
        self.uploads.is_applied(match_id)
    }

    pub fn upload(&self, match_id: &MatchId) -> Option<&UploadEntry> {
        self.uploads.get(match_id)
    }

    pub fn uploads(&self) -> &[UploadEntry] {
        self.uploads.entries()
    }

    /// Ranked top `n` of the current ledger.
    pub fn leaderboard(&self, n: usize) -> Result<Vec<Standing>> {
        Ok(leaderboard::standings(&self.store.load()?, n))
    }

    /// Add players to the ledger, creating it if needed.
    ///
    /// Creating the ledger is not undoable; adding to an existing one is.
    /// A key that is already present fails the whole call.
    pub fn register_players(&mut self, players: Vec<PlayerRecord>) -> Result<usize> {
        let count = players.len();

        if !self.store.is_initialized() {
            let ledger = Ledger::from_records(players).map_err(LedgerError::DuplicatePlayer)?;
            self.store.save(&ledger)?;
            // Snapshots left over from a previous ledger must not restore over this one.
            self.history.clear();
            info!("Initialized ledger with {} players", count);
            self.after_change(&ledger);
            return Ok(count);
        }

        if players.is_empty() {
            return Ok(0);
        }

        let prior = self.store.load()?;
        let mut updated = prior.clone();
        for player in players {
            updated.insert(player).map_err(LedgerError::DuplicatePlayer)?;
        }

        self.store.save(&updated)?;
        self.history
            .before_mutation(prior, Mutation::Register { players: count });
        info!("Registered {} players", count);
        self.after_change(&updated);
        Ok(count)
    }

    /// Merge a match into the ledger exactly once.
    pub fn apply_match(&mut self, upload: &MatchUpload) -> Result<MatchReport> {
        let match_id = upload.match_id.clone();
        if self.uploads.is_applied(&match_id) {
            warn!("Rejected re-upload of match {}", match_id);
            return Err(LedgerError::DuplicateMatch(match_id));
        }

        let prior = self.store.load()?;
        let outcome = merge_match(&upload.rows, &prior, self.options.unknown_player)?;

        self.store.save(&outcome.ledger)?;

        let entry = UploadEntry {
            match_id: match_id.clone(),
            applied_at: Utc::now(),
            rows: upload.len(),
            points_awarded: outcome.points_awarded(),
        };
        if let Err(e) = self.uploads.record_applied(entry) {
            if let Err(restore) = self.store.save(&prior) {
                error!(
                    "Failed to restore ledger after log write failure for match {}: {}",
                    match_id, restore
                );
            }
            return Err(e);
        }

        let version = self.history.before_mutation(
            prior,
            Mutation::Match {
                match_id: match_id.clone(),
            },
        );

        if let Err(e) = self.archive.store(upload) {
            warn!("Failed to archive match {}: {}", match_id, e);
        }
        self.after_change(&outcome.ledger);

        info!(
            "Applied match {}: {} rows, {} points",
            match_id,
            upload.len(),
            outcome.points_awarded()
        );

        Ok(MatchReport {
            points_awarded: outcome.points_awarded(),
            match_id,
            rows: upload.len(),
            credited: outcome.credited,
            skipped: outcome.skipped,
            registered: outcome.registered,
            snapshot_version: version,
        })
    }

    /// Zero every player's points.
    pub fn reset(&mut self) -> Result<Ledger> {
        let prior = self.store.load()?;
        let mut updated = prior.clone();
        updated.reset_points();

        self.store.save(&updated)?;
        self.history.before_mutation(prior, Mutation::Reset);
        info!("Reset points for {} players", updated.len());
        self.after_change(&updated);
        Ok(updated)
    }

    /// Restore the ledger as it was before the most recent mutation.
    pub fn undo(&mut self) -> Result<Ledger> {
        let prior = self
            .history
            .peek_undo()
            .ok_or(LedgerError::NothingToUndo)?
            .ledger
            .clone();
        let current = self.store.load()?;

        self.store.save(&prior)?;
        let restored = self.history.undo(current)?;
        self.after_change(&restored);
        Ok(restored)
    }

    /// Re-apply the most recently undone mutation.
    pub fn redo(&mut self) -> Result<Ledger> {
        let next = self
            .history
            .peek_redo()
            .ok_or(LedgerError::NothingToRedo)?
            .ledger
            .clone();
        let current = self.store.load()?;

        self.store.save(&next)?;
        let restored = self.history.redo(current)?;
        self.after_change(&restored);
        Ok(restored)
    }

    /// Persist history and refresh the leaderboard export. Failures here
    /// don't undo the change; they are logged.
    fn after_change(&self, ledger: &Ledger) {
        if self.options.persist_history {
            if let Err(e) = self.history.save(&self.storage.history_file) {
                warn!("Failed to persist history: {}", e);
            }
        }
        if let Err(e) = leaderboard::export_csv(ledger, &self.storage.leaderboard_file) {
            warn!("Failed to export leaderboard: {}", e);
        }
    }
}
