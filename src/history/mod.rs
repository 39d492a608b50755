//! Snapshot history for undo/redo.
//!
//! Two stacks of full ledger copies. Every mutation pushes the ledger as it
//! was *before* the change onto the undo stack and clears the redo stack;
//! undo and redo move the current ledger to the opposite stack. History is
//! linear: there is no branching, and a new mutation after an undo discards
//! everything that could have been redone.
//!
//! Snapshots are tagged with a monotonically increasing version and a content
//! digest. The undo stack is bounded; the oldest snapshot is evicted first.

use std::collections::VecDeque;
use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::LedgerError;
use crate::models::{Ledger, MatchId, SnapshotDigest};
use crate::storage::{write_atomic, StorageError};

/// The kind of change a snapshot was taken before.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Mutation {
    Match { match_id: MatchId },
    Reset,
    Register { players: usize },
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mutation::Match { match_id } => write!(f, "match {}", match_id),
            Mutation::Reset => write!(f, "reset"),
            Mutation::Register { players } => write!(f, "registration of {} players", players),
        }
    }
}

/// A full ledger copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u64,
    pub digest: SnapshotDigest,
    pub taken_at: DateTime<Utc>,
    /// The change that separates this snapshot from its neighbour state
    pub mutation: Mutation,
    pub ledger: Ledger,
}

/// Lightweight view of one snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotInfo {
    pub version: u64,
    pub digest: SnapshotDigest,
    pub taken_at: DateTime<Utc>,
    pub mutation: Mutation,
    pub players: usize,
}

impl From<&Snapshot> for SnapshotInfo {
    fn from(s: &Snapshot) -> Self {
        Self {
            version: s.version,
            digest: s.digest.clone(),
            taken_at: s.taken_at,
            mutation: s.mutation.clone(),
            players: s.ledger.len(),
        }
    }
}

/// Both stacks, most recent first.
#[derive(Debug, Clone, Serialize)]
pub struct HistorySummary {
    pub max_depth: usize,
    pub undo: Vec<SnapshotInfo>,
    pub redo: Vec<SnapshotInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotHistory {
    max_depth: usize,
    next_version: u64,
    /// Past states, most recent last
    undo: VecDeque<Snapshot>,
    /// Future states, most recent last
    redo: Vec<Snapshot>,
}

impl SnapshotHistory {
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth: max_depth.max(1),
            next_version: 1,
            undo: VecDeque::new(),
            redo: Vec::new(),
        }
    }

    fn snapshot(&mut self, ledger: Ledger, mutation: Mutation) -> Snapshot {
        let version = self.next_version;
        self.next_version += 1;
        Snapshot {
            version,
            digest: ledger.digest(),
            taken_at: Utc::now(),
            mutation,
            ledger,
        }
    }

    fn push_undo(&mut self, snapshot: Snapshot) {
        self.undo.push_back(snapshot);
        while self.undo.len() > self.max_depth {
            if let Some(evicted) = self.undo.pop_front() {
                debug!("Evicted snapshot v{} (retention {})", evicted.version, self.max_depth);
            }
        }
    }

    /// Record the pre-mutation ledger and drop any pending redo states.
    /// Returns the new snapshot's version.
    pub fn before_mutation(&mut self, ledger: Ledger, mutation: Mutation) -> u64 {
        let snapshot = self.snapshot(ledger, mutation);
        let version = snapshot.version;
        debug!("Snapshot v{} before {}", version, snapshot.mutation);
        self.push_undo(snapshot);
        if !self.redo.is_empty() {
            debug!("Discarding {} redo states", self.redo.len());
            self.redo.clear();
        }
        version
    }

    /// Step back: returns the prior ledger, which becomes current.
    /// `current` is kept on the redo stack.
    pub fn undo(&mut self, current: Ledger) -> Result<Ledger, LedgerError> {
        let prior = self.undo.pop_back().ok_or(LedgerError::NothingToUndo)?;
        let forward = self.snapshot(current, prior.mutation.clone());
        info!("Undo {} (restoring v{})", prior.mutation, prior.version);
        self.redo.push(forward);
        Ok(prior.ledger)
    }

    /// Step forward: returns the next ledger, which becomes current.
    /// `current` goes back on the undo stack.
    pub fn redo(&mut self, current: Ledger) -> Result<Ledger, LedgerError> {
        let next = self.redo.pop().ok_or(LedgerError::NothingToRedo)?;
        let back = self.snapshot(current, next.mutation.clone());
        info!("Redo {} (restoring v{})", next.mutation, next.version);
        self.push_undo(back);
        Ok(next.ledger)
    }

    /// The snapshot the next undo would restore.
    pub fn peek_undo(&self) -> Option<&Snapshot> {
        self.undo.back()
    }

    /// The snapshot the next redo would restore.
    pub fn peek_redo(&self) -> Option<&Snapshot> {
        self.redo.last()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    pub fn summary(&self) -> HistorySummary {
        HistorySummary {
            max_depth: self.max_depth,
            undo: self.undo.iter().rev().map(SnapshotInfo::from).collect(),
            redo: self.redo.iter().rev().map(SnapshotInfo::from).collect(),
        }
    }

    /// Load persisted history, or start empty if there is none or it can't be
    /// read. The configured `max_depth` wins over the persisted one.
    pub fn load_or_new(path: &Path, max_depth: usize) -> Self {
        if !path.exists() {
            return Self::new(max_depth);
        }

        let loaded = std::fs::read_to_string(path)
            .map_err(StorageError::from)
            .and_then(|s| serde_json::from_str::<SnapshotHistory>(&s).map_err(StorageError::from));

        match loaded {
            Ok(mut history) => {
                history.max_depth = max_depth.max(1);
                while history.undo.len() > history.max_depth {
                    history.undo.pop_front();
                }
                info!(
                    "Loaded history: {} undo, {} redo",
                    history.undo.len(),
                    history.redo.len()
                );
                history
            }
            Err(e) => {
                warn!("Ignoring unreadable history at {:?}: {}", path, e);
                Self::new(max_depth)
            }
        }
    }

    /// Atomically persist both stacks.
    pub fn save(&self, path: &Path) -> Result<(), StorageError> {
        let json = serde_json::to_vec(self)?;
        write_atomic(path, &json)
    }
}

impl Default for SnapshotHistory {
    fn default() -> Self {
        Self::new(50)
    }
}
