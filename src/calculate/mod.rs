//! Scoring engine.
//!
//! Converts raw match statistics into weighted points and merges them into
//! a ledger:
//! - Fixed signed weight per stat column
//! - Per-row match points
//! - Transactional merge of a whole match into a ledger copy

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::LedgerError;
use crate::ingest;
use crate::models::{Ledger, MatchStatRow, PlayerKey, PlayerRecord};

/// Points awarded per unit of each stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringWeights {
    pub score: i64,
    pub runner_rounds: i64,
    pub runout_fielding: i64,
    pub catch: i64,
    pub assist: i64,
    pub errors: i64,
    pub runout_running: i64,
}

/// The tournament's weight table.
pub const WEIGHTS: ScoringWeights = ScoringWeights {
    score: 1,
    runner_rounds: 2,
    runout_fielding: 7,
    catch: 5,
    assist: 3,
    errors: -2,
    runout_running: -3,
};

/// What to do with a match row whose player is not in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownPlayerPolicy {
    /// Drop the row's contribution and carry on.
    #[default]
    Skip,
    /// Fail the whole match with `PlayerNotFound`.
    Reject,
    /// Add the player to the ledger, named from the row if it has a name.
    Register,
}

/// Each stat of `row` as `(column, count, weight)`.
pub fn weighted_fields(row: &MatchStatRow) -> [(&'static str, u32, i64); 7] {
    [
        (ingest::COL_SCORE, row.score, WEIGHTS.score),
        (ingest::COL_RUNNER_ROUNDS, row.runner_rounds, WEIGHTS.runner_rounds),
        (ingest::COL_RUNOUT_FIELDING, row.runout_fielding, WEIGHTS.runout_fielding),
        (ingest::COL_CATCH, row.catch, WEIGHTS.catch),
        (ingest::COL_ASSIST, row.assist, WEIGHTS.assist),
        (ingest::COL_ERRORS, row.errors, WEIGHTS.errors),
        (ingest::COL_RUNOUT_RUNNING, row.runout_running, WEIGHTS.runout_running),
    ]
}

/// Weighted sum of a row's seven stats.
pub fn compute_match_points(row: &MatchStatRow) -> i64 {
    weighted_fields(row)
        .iter()
        .map(|(_, count, weight)| i64::from(*count) * weight)
        .sum()
}

/// Points credited to one player by a merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credit {
    pub player: PlayerKey,
    pub points: i64,
}

/// Result of merging a match into a ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    /// The updated ledger
    pub ledger: Ledger,

    /// One entry per applied row, in file order
    pub credited: Vec<Credit>,

    /// Rows dropped because their player is unknown
    pub skipped: Vec<PlayerKey>,

    /// Players added to the ledger by this merge
    pub registered: Vec<PlayerKey>,
}

impl MergeOutcome {
    /// Sum of points credited to ledger players.
    pub fn points_awarded(&self) -> i64 {
        self.credited.iter().map(|c| c.points).sum()
    }
}

/// Merge every row into a copy of `ledger`.
///
/// Rows for the same player accumulate. The input ledger is never touched,
/// so on error nothing has been applied.
pub fn merge_match(
    rows: &[MatchStatRow],
    ledger: &Ledger,
    policy: UnknownPlayerPolicy,
) -> Result<MergeOutcome, LedgerError> {
    let mut updated = ledger.clone();
    let mut credited = Vec::with_capacity(rows.len());
    let mut skipped = Vec::new();
    let mut registered = Vec::new();

    for row in rows {
        let key = row.player_key();
        let points = compute_match_points(row);

        if !updated.contains(&key) {
            match policy {
                UnknownPlayerPolicy::Skip => {
                    warn!(
                        "Match {}: player {} not in ledger, dropping {} points",
                        row.match_id, key, points
                    );
                    skipped.push(key);
                    continue;
                }
                UnknownPlayerPolicy::Reject => return Err(LedgerError::PlayerNotFound(key)),
                UnknownPlayerPolicy::Register => {
                    let name = row.player_name.clone().unwrap_or_default();
                    updated
                        .insert(PlayerRecord::new(key.jersey_no, key.reg_no.clone(), name))
                        .map_err(LedgerError::DuplicatePlayer)?;
                    debug!("Match {}: registered new player {}", row.match_id, key);
                    registered.push(key.clone());
                }
            }
        }

        if let Some(player) = updated.get_mut(&key) {
            player.total_points += points;
        }
        credited.push(Credit { player: key, points });
    }

    Ok(MergeOutcome {
        ledger: updated,
        credited,
        skipped,
        registered,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(jersey: u32, reg: &str, stats: [u32; 7]) -> MatchStatRow {
        let [score, runner_rounds, runout_fielding, catch, assist, errors, runout_running] = stats;
        MatchStatRow {
            score,
            runner_rounds,
            runout_fielding,
            catch,
            assist,
            errors,
            runout_running,
            ..MatchStatRow::blank("M1", jersey, reg)
        }
    }

    fn alice_ledger() -> Ledger {
        Ledger::from_records(vec![PlayerRecord::new(1, "R1", "Alice")]).unwrap()
    }

    #[test]
    fn test_compute_example_row() {
        // 2*1 + 1*2 + 0*7 + 1*5 + 0*3 + 1*(-2) + 0*(-3)
        assert_eq!(compute_match_points(&row(1, "R1", [2, 1, 0, 1, 0, 1, 0])), 7);
    }

    #[test]
    fn test_compute_each_weight() {
        let unit = |i: usize| {
            let mut stats = [0; 7];
            stats[i] = 1;
            compute_match_points(&row(1, "R1", stats))
        };
        assert_eq!(
            (0..7).map(unit).collect::<Vec<_>>(),
            vec![1i64, 2, 7, 5, 3, -2, -3]
        );
    }

    #[test]
    fn test_compute_can_be_negative() {
        assert_eq!(compute_match_points(&row(1, "R1", [0, 0, 0, 0, 0, 3, 2])), -12);
    }

    #[test]
    fn test_compute_zero_row() {
        assert_eq!(compute_match_points(&MatchStatRow::blank("M1", 1, "R1")), 0);
    }

    #[test]
    fn test_weighted_fields_columns() {
        let cols: Vec<&str> = weighted_fields(&MatchStatRow::blank("M1", 1, "R1"))
            .iter()
            .map(|(c, _, _)| *c)
            .collect();
        assert_eq!(cols, ingest::MATCH_COLUMNS[3..].to_vec());
    }

    #[test]
    fn test_merge_adds_points() {
        let ledger = alice_ledger();
        let outcome = merge_match(
            &[row(1, "R1", [2, 1, 0, 1, 0, 1, 0])],
            &ledger,
            UnknownPlayerPolicy::Skip,
        )
        .unwrap();

        assert_eq!(outcome.ledger.records()[0].total_points, 7);
        assert_eq!(outcome.points_awarded(), 7);
        // Input untouched
        assert_eq!(ledger.records()[0].total_points, 0);
    }

    #[test]
    fn test_merge_twice_doubles_delta() {
        let rows = [row(1, "R1", [2, 1, 0, 1, 0, 1, 0])];
        let once = merge_match(&rows, &alice_ledger(), UnknownPlayerPolicy::Skip).unwrap();
        let twice = merge_match(&rows, &once.ledger, UnknownPlayerPolicy::Skip).unwrap();
        assert_eq!(twice.ledger.records()[0].total_points, 14);
    }

    #[test]
    fn test_merge_accumulates_repeated_rows() {
        let rows = [
            row(1, "R1", [1, 0, 0, 0, 0, 0, 0]),
            row(1, "R1", [0, 0, 0, 1, 0, 0, 0]),
        ];
        let outcome = merge_match(&rows, &alice_ledger(), UnknownPlayerPolicy::Skip).unwrap();
        assert_eq!(outcome.ledger.records()[0].total_points, 6);
        assert_eq!(outcome.credited.len(), 2);
    }

    #[test]
    fn test_merge_skip_unknown_player() {
        let rows = [
            row(1, "R1", [1, 0, 0, 0, 0, 0, 0]),
            row(9, "R9", [5, 0, 0, 0, 0, 0, 0]),
        ];
        let outcome = merge_match(&rows, &alice_ledger(), UnknownPlayerPolicy::Skip).unwrap();
        assert_eq!(outcome.ledger.len(), 1);
        assert_eq!(outcome.skipped, vec![PlayerKey::new(9, "R9")]);
        assert_eq!(outcome.points_awarded(), 1);
    }

    #[test]
    fn test_merge_jersey_match_requires_reg_match() {
        let rows = [row(1, "OTHER", [4, 0, 0, 0, 0, 0, 0])];
        let outcome = merge_match(&rows, &alice_ledger(), UnknownPlayerPolicy::Skip).unwrap();
        assert_eq!(outcome.ledger.records()[0].total_points, 0);
        assert_eq!(outcome.skipped.len(), 1);
    }

    #[test]
    fn test_merge_reject_unknown_player_is_all_or_nothing() {
        let ledger = alice_ledger();
        let rows = [
            row(1, "R1", [3, 0, 0, 0, 0, 0, 0]),
            row(9, "R9", [5, 0, 0, 0, 0, 0, 0]),
        ];
        let err = merge_match(&rows, &ledger, UnknownPlayerPolicy::Reject).unwrap_err();
        match err {
            LedgerError::PlayerNotFound(key) => assert_eq!(key, PlayerKey::new(9, "R9")),
            other => panic!("expected PlayerNotFound, got {:?}", other),
        }
        assert_eq!(ledger.records()[0].total_points, 0);
    }

    #[test]
    fn test_merge_register_unknown_player() {
        let mut new_row = row(9, "R9", [5, 0, 0, 0, 0, 0, 0]);
        new_row.player_name = Some("Nina".to_string());
        let outcome =
            merge_match(&[new_row], &alice_ledger(), UnknownPlayerPolicy::Register).unwrap();

        assert_eq!(outcome.registered, vec![PlayerKey::new(9, "R9")]);
        let nina = outcome.ledger.get(&PlayerKey::new(9, "R9")).unwrap();
        assert_eq!(nina.player_name, "Nina");
        assert_eq!(nina.total_points, 5);
        // Appended after existing players
        assert_eq!(outcome.ledger.records()[1].reg_no, "R9");
    }

    #[test]
    fn test_merge_empty_rows_is_noop() {
        let ledger = alice_ledger();
        let outcome = merge_match(&[], &ledger, UnknownPlayerPolicy::Reject).unwrap();
        assert_eq!(outcome.ledger, ledger);
        assert_eq!(outcome.points_awarded(), 0);
    }

    #[test]
    fn test_unknown_player_policy_serde() {
        #[derive(Deserialize)]
        struct Wrapper {
            policy: UnknownPlayerPolicy,
        }
        let w: Wrapper = toml::from_str("policy = \"register\"").unwrap();
        assert_eq!(w.policy, UnknownPlayerPolicy::Register);
        assert_eq!(UnknownPlayerPolicy::default(), UnknownPlayerPolicy::Skip);
    }
}
