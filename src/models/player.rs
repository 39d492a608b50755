//! Player identity and cumulative ledger state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Composite identity of a player: jersey number plus registration number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerKey {
    pub jersey_no: u32,
    pub reg_no: String,
}

impl PlayerKey {
    pub fn new(jersey_no: u32, reg_no: impl Into<String>) -> Self {
        Self {
            jersey_no,
            reg_no: reg_no.into(),
        }
    }
}

impl fmt::Display for PlayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} ({})", self.jersey_no, self.reg_no)
    }
}

/// A player's entry in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    /// Jersey number
    pub jersey_no: u32,

    /// Registration number
    pub reg_no: String,

    /// Display name
    pub player_name: String,

    /// Cumulative points; may go negative
    pub total_points: i64,
}

impl PlayerRecord {
    /// Create a record with zero points.
    pub fn new(jersey_no: u32, reg_no: impl Into<String>, player_name: impl Into<String>) -> Self {
        Self {
            jersey_no,
            reg_no: reg_no.into(),
            player_name: player_name.into(),
            total_points: 0,
        }
    }

    /// Builder-style helper to set the starting points.
    pub fn with_points(mut self, total_points: i64) -> Self {
        self.total_points = total_points;
        self
    }

    pub fn key(&self) -> PlayerKey {
        PlayerKey::new(self.jersey_no, self.reg_no.clone())
    }

    /// Whether this record is identified by `key`, without allocating.
    pub fn matches(&self, key: &PlayerKey) -> bool {
        self.jersey_no == key.jersey_no && self.reg_no == key.reg_no
    }
}
