//! Leaderboard projection.
//!
//! A read-only view of the ledger sorted by total points, highest first.
//! Ties keep ledger insertion order (the sort is stable), so a player
//! registered earlier ranks ahead of a later one on equal points.

use std::path::Path;

use serde::Serialize;

use crate::models::{Ledger, PlayerRecord};
use crate::storage::{write_records_csv, StorageError};

/// Number of players shown by default.
pub const DEFAULT_TOP: usize = 5;

/// All records, highest points first.
pub fn ranked(ledger: &Ledger) -> Vec<&PlayerRecord> {
    let mut records: Vec<&PlayerRecord> = ledger.iter().collect();
    records.sort_by(|a, b| b.total_points.cmp(&a.total_points));
    records
}

/// At most `n` records, highest points first.
pub fn top_n(ledger: &Ledger, n: usize) -> Vec<PlayerRecord> {
    ranked(ledger).into_iter().take(n).cloned().collect()
}

/// A ranked row. Equal points share a rank ("1, 2, 2, 4").
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Standing {
    pub rank: usize,
    #[serde(flatten)]
    pub player: PlayerRecord,
}

/// Standard competition ranking over the first `n` records.
pub fn standings(ledger: &Ledger, n: usize) -> Vec<Standing> {
    let mut out: Vec<Standing> = Vec::new();
    for (idx, player) in ranked(ledger).into_iter().take(n).enumerate() {
        let rank = match out.last() {
            Some(prev) if prev.player.total_points == player.total_points => prev.rank,
            _ => idx + 1,
        };
        out.push(Standing {
            rank,
            player: player.clone(),
        });
    }
    out
}

/// Write the full leaderboard as ledger-shaped CSV.
pub fn export_csv(ledger: &Ledger, path: &Path) -> Result<(), StorageError> {
    write_records_csv(path, ranked(ledger))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ledger(entries: &[(&str, i64)]) -> Ledger {
        Ledger::from_records(
            entries
                .iter()
                .enumerate()
                .map(|(i, (name, pts))| {
                    PlayerRecord::new(i as u32 + 1, format!("R{}", i + 1), *name).with_points(*pts)
                })
                .collect(),
        )
        .unwrap()
    }

    fn names(records: &[PlayerRecord]) -> Vec<&str> {
        records.iter().map(|r| r.player_name.as_str()).collect()
    }

    #[test]
    fn test_top_n_sorted_descending() {
        let l = ledger(&[("A", 3), ("B", 10), ("C", -2), ("D", 7)]);
        assert_eq!(names(&top_n(&l, 5)), vec!["B", "D", "A", "C"]);
    }

    #[test]
    fn test_top_n_truncates() {
        let l = ledger(&[("A", 1), ("B", 2), ("C", 3), ("D", 4), ("E", 5), ("F", 6)]);
        let top = top_n(&l, 5);
        assert_eq!(top.len(), 5);
        assert_eq!(names(&top), vec!["F", "E", "D", "C", "B"]);
    }

    #[test]
    fn test_top_n_ties_keep_insertion_order() {
        let l = ledger(&[("A", 5), ("B", 9), ("C", 5), ("D", 5)]);
        assert_eq!(names(&top_n(&l, 4)), vec!["B", "A", "C", "D"]);
        assert_eq!(names(&top_n(&l, 2)), vec!["B", "A"]);
    }

    #[test]
    fn test_top_n_empty_and_zero() {
        assert!(top_n(&Ledger::new(), 5).is_empty());
        assert!(top_n(&ledger(&[("A", 1)]), 0).is_empty());
    }

    #[test]
    fn test_top_n_does_not_mutate() {
        let l = ledger(&[("A", 1), ("B", 2)]);
        let before = l.clone();
        let _ = top_n(&l, 5);
        assert_eq!(l, before);
    }

    #[test]
    fn test_standings_shared_ranks() {
        let l = ledger(&[("A", 10), ("B", 7), ("C", 7), ("D", 3)]);
        let ranks: Vec<usize> = standings(&l, 10).iter().map(|s| s.rank).collect();
        assert_eq!(ranks, vec![1, 2, 2, 4]);
    }

    #[test]
    fn test_standing_serializes_flat() {
        let l = ledger(&[("A", 10)]);
        let json = serde_json::to_value(&standings(&l, 1)[0]).unwrap();
        assert_eq!(json["rank"], 1);
        assert_eq!(json["player_name"], "A");
        assert_eq!(json["total_points"], 10);
    }

    #[test]
    fn test_export_csv() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("leaderboard.csv");
        let l = ledger(&[("A", 1), ("B", 4)]);

        export_csv(&l, &path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "Jersey No,Reg No,Player Name,Total Points");
        assert_eq!(lines[1], "2,R2,B,4");
        assert_eq!(lines[2], "1,R1,A,1");
    }
}
