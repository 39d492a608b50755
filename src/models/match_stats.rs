//! Per-player match statistics as uploaded.

use serde::{Deserialize, Serialize};

use super::{MatchId, PlayerKey};

/// One row of an uploaded match file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchStatRow {
    pub match_id: MatchId,
    pub jersey_no: u32,
    pub reg_no: String,

    /// Present only when the upload carries a name column; used when
    /// unknown players are registered on the fly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,

    pub score: u32,
    pub runner_rounds: u32,
    pub runout_fielding: u32,
    pub catch: u32,
    pub assist: u32,
    pub errors: u32,
    pub runout_running: u32,
}

impl MatchStatRow {
    /// A row with every stat at zero.
    pub fn blank(match_id: impl Into<MatchId>, jersey_no: u32, reg_no: impl Into<String>) -> Self {
        Self {
            match_id: match_id.into(),
            jersey_no,
            reg_no: reg_no.into(),
            player_name: None,
            score: 0,
            runner_rounds: 0,
            runout_fielding: 0,
            catch: 0,
            assist: 0,
            errors: 0,
            runout_running: 0,
        }
    }

    pub fn player_key(&self) -> PlayerKey {
        PlayerKey::new(self.jersey_no, self.reg_no.clone())
    }
}

/// A parsed match file: its ID and every row, in file order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchUpload {
    pub match_id: MatchId,
    pub rows: Vec<MatchStatRow>,
}

impl MatchUpload {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
