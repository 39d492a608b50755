//! Errors raised by ledger operations.

use std::path::PathBuf;

use thiserror::Error;

use crate::ingest::SchemaError;
use crate::models::{MatchId, PlayerKey};
use crate::storage::StorageError;

/// Every failure a caller of the tracker can observe.
///
/// Each error is scoped to the operation that raised it: the stored ledger,
/// the upload log and the snapshot history are unchanged afterwards.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("Match {0} has already been applied")]
    DuplicateMatch(MatchId),

    #[error("Ledger has not been initialized (no players registered at {0})")]
    StoreUnavailable(PathBuf),

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    #[error("Player {0} is not in the ledger")]
    PlayerNotFound(PlayerKey),

    #[error("Player {0} is already registered")]
    DuplicatePlayer(PlayerKey),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type Result<T, E = LedgerError> = std::result::Result<T, E>;
