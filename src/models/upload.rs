//! Upload log entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::MatchId;

/// One match that has been merged into the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadEntry {
    pub match_id: MatchId,

    /// When the match was applied
    pub applied_at: DateTime<Utc>,

    /// Number of rows in the uploaded file
    #[serde(default)]
    pub rows: usize,

    /// Sum of points credited to ledger players
    #[serde(default)]
    pub points_awarded: i64,
}

impl UploadEntry {
    pub fn new(match_id: MatchId, applied_at: DateTime<Utc>) -> Self {
        Self {
            match_id,
            applied_at,
            rows: 0,
            points_awarded: 0,
        }
    }
}
