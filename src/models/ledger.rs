//! The ledger: every registered player with their cumulative points.

use serde::{Deserialize, Serialize};

use super::{PlayerKey, PlayerRecord, SnapshotDigest};

/// Player records in insertion order.
///
/// The composite [`PlayerKey`] is unique; [`Ledger::insert`] and
/// [`Ledger::from_records`] enforce this, and no other method can add records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    players: Vec<PlayerRecord>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a ledger, failing on the first duplicated key.
    pub fn from_records(records: Vec<PlayerRecord>) -> Result<Self, PlayerKey> {
        let mut ledger = Self::new();
        for record in records {
            ledger.insert(record)?;
        }
        Ok(ledger)
    }

    /// Append a record. Returns the key back if it is already present.
    pub fn insert(&mut self, record: PlayerRecord) -> Result<(), PlayerKey> {
        let key = record.key();
        if self.contains(&key) {
            return Err(key);
        }
        self.players.push(record);
        Ok(())
    }

    pub fn get(&self, key: &PlayerKey) -> Option<&PlayerRecord> {
        self.players.iter().find(|p| p.matches(key))
    }

    pub fn get_mut(&mut self, key: &PlayerKey) -> Option<&mut PlayerRecord> {
        self.players.iter_mut().find(|p| p.matches(key))
    }

    pub fn contains(&self, key: &PlayerKey) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PlayerRecord> {
        self.players.iter()
    }

    pub fn records(&self) -> &[PlayerRecord] {
        &self.players
    }

    pub fn into_records(self) -> Vec<PlayerRecord> {
        self.players
    }

    /// Sum of every player's points.
    pub fn total_points(&self) -> i64 {
        self.players.iter().map(|p| p.total_points).sum()
    }

    /// Zero every player's points, keeping identity and names.
    pub fn reset_points(&mut self) {
        for player in &mut self.players {
            player.total_points = 0;
        }
    }

    /// Content digest over every record, in order.
    pub fn digest(&self) -> SnapshotDigest {
        let fields: Vec<String> = self
            .players
            .iter()
            .flat_map(|p| {
                [
                    p.jersey_no.to_string(),
                    p.reg_no.clone(),
                    p.player_name.clone(),
                    p.total_points.to_string(),
                ]
            })
            .collect();
        SnapshotDigest::generate(fields.iter().map(String::as_str))
    }
}

impl<'a> IntoIterator for &'a Ledger {
    type Item = &'a PlayerRecord;
    type IntoIter = std::slice::Iter<'a, PlayerRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.players.iter()
    }
}
