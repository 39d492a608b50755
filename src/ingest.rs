//! Parsing of uploaded match files and player rosters.
//!
//! Both inputs are CSV with a header row. Columns are located by name
//! (trimmed, case-insensitive), so column order and extra columns don't
//! matter. Every row is validated before anything is returned: a file that
//! fails here never reaches the ledger.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim};
use thiserror::Error;
use tracing::debug;

use crate::models::{MatchId, MatchStatRow, MatchUpload, PlayerRecord};

pub const COL_MATCH_ID: &str = "Match ID";
pub const COL_JERSEY_NO: &str = "Jersey No";
pub const COL_REG_NO: &str = "Reg No";
pub const COL_PLAYER_NAME: &str = "Player Name";
pub const COL_TOTAL_POINTS: &str = "Total Points";
pub const COL_SCORE: &str = "Score";
pub const COL_RUNNER_ROUNDS: &str = "Runner Rounds";
pub const COL_RUNOUT_FIELDING: &str = "Runout (F)";
pub const COL_CATCH: &str = "Catch";
pub const COL_ASSIST: &str = "Assist";
pub const COL_ERRORS: &str = "Errors";
pub const COL_RUNOUT_RUNNING: &str = "Runout (R)";

/// Columns every match file must carry, in canonical order.
pub const MATCH_COLUMNS: [&str; 10] = [
    COL_MATCH_ID,
    COL_JERSEY_NO,
    COL_REG_NO,
    COL_SCORE,
    COL_RUNNER_ROUNDS,
    COL_RUNOUT_FIELDING,
    COL_CATCH,
    COL_ASSIST,
    COL_ERRORS,
    COL_RUNOUT_RUNNING,
];

/// Columns every roster file must carry.
pub const ROSTER_COLUMNS: [&str; 3] = [COL_JERSEY_NO, COL_REG_NO, COL_PLAYER_NAME];

/// Missing or malformed input columns.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Line {line}: column '{column}' has invalid value '{value}' (expected {expected})")]
    InvalidValue {
        line: u64,
        column: String,
        value: String,
        expected: &'static str,
    },

    #[error("Line {line}: match ID '{found}' differs from '{expected}' in the same file")]
    MixedMatchIds {
        line: u64,
        expected: MatchId,
        found: MatchId,
    },

    #[error("File contains no data rows")]
    Empty,

    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Header positions, resolved once per file.
struct Columns {
    headers: Vec<String>,
}

impl Columns {
    fn new(headers: &StringRecord) -> Self {
        Self {
            headers: headers.iter().map(|h| h.trim().to_lowercase()).collect(),
        }
    }

    fn find(&self, name: &str) -> Option<usize> {
        let wanted = name.to_lowercase();
        self.headers.iter().position(|h| *h == wanted)
    }

    /// Resolve all `names`, reporting every missing one at once.
    fn require<const N: usize>(&self, names: [&str; N]) -> Result<[usize; N], SchemaError> {
        let found = names.map(|n| self.find(n));
        let missing: Vec<String> = names
            .iter()
            .zip(found.iter())
            .filter(|(_, idx)| idx.is_none())
            .map(|(n, _)| n.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(SchemaError::MissingColumns(missing));
        }
        Ok(found.map(|idx| idx.unwrap_or_default()))
    }
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}

fn text<'r>(record: &'r StringRecord, idx: usize) -> &'r str {
    record.get(idx).unwrap_or("")
}

fn parse_count(record: &StringRecord, idx: usize, column: &str) -> Result<u32, SchemaError> {
    let raw = text(record, idx);
    raw.parse::<u32>().map_err(|_| SchemaError::InvalidValue {
        line: line_of(record),
        column: column.to_string(),
        value: raw.to_string(),
        expected: "a non-negative integer",
    })
}

fn parse_required_text(record: &StringRecord, idx: usize, column: &str) -> Result<String, SchemaError> {
    let raw = text(record, idx);
    if raw.is_empty() {
        return Err(SchemaError::InvalidValue {
            line: line_of(record),
            column: column.to_string(),
            value: String::new(),
            expected: "a non-empty value",
        });
    }
    Ok(raw.to_string())
}

fn open_input(path: &Path) -> Result<File, SchemaError> {
    File::open(path).map_err(|source| SchemaError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn reader_for<R: Read>(input: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(false)
        .from_reader(input)
}

/// Parse a match file from any reader.
pub fn parse_match_csv<R: Read>(input: R) -> Result<MatchUpload, SchemaError> {
    let mut reader = reader_for(input);
    let columns = Columns::new(reader.headers()?);
    let [id_i, jersey_i, reg_i, score_i, rounds_i, rof_i, catch_i, assist_i, errors_i, ror_i] =
        columns.require(MATCH_COLUMNS)?;
    let name_i = columns.find(COL_PLAYER_NAME);

    let mut match_id: Option<MatchId> = None;
    let mut rows = Vec::new();

    for record in reader.records() {
        let record = record?;
        let row_id = MatchId::new(parse_required_text(&record, id_i, COL_MATCH_ID)?);

        match &match_id {
            None => match_id = Some(row_id.clone()),
            Some(expected) if *expected != row_id => {
                return Err(SchemaError::MixedMatchIds {
                    line: line_of(&record),
                    expected: expected.clone(),
                    found: row_id,
                });
            }
            Some(_) => {}
        }

        rows.push(MatchStatRow {
            match_id: row_id,
            jersey_no: parse_count(&record, jersey_i, COL_JERSEY_NO)?,
            reg_no: parse_required_text(&record, reg_i, COL_REG_NO)?,
            player_name: name_i
                .map(|i| text(&record, i).to_string())
                .filter(|n| !n.is_empty()),
            score: parse_count(&record, score_i, COL_SCORE)?,
            runner_rounds: parse_count(&record, rounds_i, COL_RUNNER_ROUNDS)?,
            runout_fielding: parse_count(&record, rof_i, COL_RUNOUT_FIELDING)?,
            catch: parse_count(&record, catch_i, COL_CATCH)?,
            assist: parse_count(&record, assist_i, COL_ASSIST)?,
            errors: parse_count(&record, errors_i, COL_ERRORS)?,
            runout_running: parse_count(&record, ror_i, COL_RUNOUT_RUNNING)?,
        });
    }

    let match_id = match_id.ok_or(SchemaError::Empty)?;
    debug!("Parsed match {} with {} rows", match_id, rows.len());
    Ok(MatchUpload { match_id, rows })
}

/// Parse a match file from disk.
pub fn parse_match_file(path: &Path) -> Result<MatchUpload, SchemaError> {
    parse_match_csv(open_input(path)?)
}

/// Parse a player roster. `Total Points` is optional and defaults to zero.
pub fn parse_roster_csv<R: Read>(input: R) -> Result<Vec<PlayerRecord>, SchemaError> {
    let mut reader = reader_for(input);
    let columns = Columns::new(reader.headers()?);
    let [jersey_i, reg_i, name_i] = columns.require(ROSTER_COLUMNS)?;
    let points_i = columns.find(COL_TOTAL_POINTS);

    let mut players = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut player = PlayerRecord::new(
            parse_count(&record, jersey_i, COL_JERSEY_NO)?,
            parse_required_text(&record, reg_i, COL_REG_NO)?,
            text(&record, name_i),
        );

        if let Some(idx) = points_i {
            let raw = text(&record, idx);
            if !raw.is_empty() {
                player.total_points = raw.parse::<i64>().map_err(|_| SchemaError::InvalidValue {
                    line: line_of(&record),
                    column: COL_TOTAL_POINTS.to_string(),
                    value: raw.to_string(),
                    expected: "an integer",
                })?;
            }
        }

        players.push(player);
    }

    debug!("Parsed roster with {} players", players.len());
    Ok(players)
}

/// Parse a roster file from disk.
pub fn parse_roster_file(path: &Path) -> Result<Vec<PlayerRecord>, SchemaError> {
    parse_roster_csv(open_input(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "Match ID,Jersey No,Reg No,Score,Runner Rounds,Runout (F),Catch,Assist,Errors,Runout (R)";

    #[test]
    fn test_parse_match_csv() {
        let input = format!("{HEADER}\nM1,1,R1,2,1,0,1,0,1,0\nM1,2,R2,0,0,1,0,2,0,1\n");
        let upload = parse_match_csv(input.as_bytes()).unwrap();

        assert_eq!(upload.match_id, MatchId::from("M1"));
        assert_eq!(upload.len(), 2);
        let first = &upload.rows[0];
        assert_eq!(first.jersey_no, 1);
        assert_eq!(first.reg_no, "R1");
        assert_eq!(first.score, 2);
        assert_eq!(first.errors, 1);
        assert_eq!(upload.rows[1].runout_running, 1);
        assert!(first.player_name.is_none());
    }

    #[test]
    fn test_column_order_and_extras_ignored() {
        let input = "Reg No,Notes,Errors,Runout (R),Match ID,Jersey No,Score,Runner Rounds,Runout (F),Catch,Assist\n\
                     R5,great game,0,0,M9,5,3,0,0,0,0\n";
        let upload = parse_match_csv(input.as_bytes()).unwrap();
        assert_eq!(upload.rows[0].reg_no, "R5");
        assert_eq!(upload.rows[0].jersey_no, 5);
        assert_eq!(upload.rows[0].score, 3);
    }

    #[test]
    fn test_headers_case_and_whitespace_insensitive() {
        let input = " match id ,JERSEY NO,reg no,score,runner rounds,runout (f),catch,assist,errors,runout (r)\n\
                     M1,1,R1,1,0,0,0,0,0,0\n";
        assert!(parse_match_csv(input.as_bytes()).is_ok());
    }

    #[test]
    fn test_missing_columns_all_reported() {
        let input = "Match ID,Jersey No,Reg No,Score\nM1,1,R1,2\n";
        match parse_match_csv(input.as_bytes()) {
            Err(SchemaError::MissingColumns(cols)) => {
                assert_eq!(cols.len(), 6);
                assert!(cols.contains(&"Catch".to_string()));
                assert!(cols.contains(&"Runout (R)".to_string()));
            }
            other => panic!("expected MissingColumns, got {:?}", other),
        }
    }

    #[test]
    fn test_non_numeric_stat_rejected() {
        let input = format!("{HEADER}\nM1,1,R1,two,1,0,1,0,1,0\n");
        match parse_match_csv(input.as_bytes()) {
            Err(SchemaError::InvalidValue { line, column, value, .. }) => {
                assert_eq!(line, 2);
                assert_eq!(column, "Score");
                assert_eq!(value, "two");
            }
            other => panic!("expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_stat_rejected() {
        let input = format!("{HEADER}\nM1,1,R1,0,0,0,0,0,-1,0\n");
        assert!(matches!(
            parse_match_csv(input.as_bytes()),
            Err(SchemaError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_empty_stat_rejected() {
        let input = format!("{HEADER}\nM1,1,R1,,0,0,0,0,0,0\n");
        assert!(matches!(
            parse_match_csv(input.as_bytes()),
            Err(SchemaError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_mixed_match_ids_rejected() {
        let input = format!("{HEADER}\nM1,1,R1,0,0,0,0,0,0,0\nM2,2,R2,0,0,0,0,0,0,0\n");
        match parse_match_csv(input.as_bytes()) {
            Err(SchemaError::MixedMatchIds { line, expected, found }) => {
                assert_eq!(line, 3);
                assert_eq!(expected.as_str(), "M1");
                assert_eq!(found.as_str(), "M2");
            }
            other => panic!("expected MixedMatchIds, got {:?}", other),
        }
    }

    #[test]
    fn test_header_only_is_empty() {
        let input = format!("{HEADER}\n");
        assert!(matches!(
            parse_match_csv(input.as_bytes()),
            Err(SchemaError::Empty)
        ));
    }

    #[test]
    fn test_ragged_row_is_csv_error() {
        let input = format!("{HEADER}\nM1,1,R1,0\n");
        assert!(matches!(
            parse_match_csv(input.as_bytes()),
            Err(SchemaError::Csv(_))
        ));
    }

    #[test]
    fn test_optional_player_name_column() {
        let input = format!("{HEADER},Player Name\nM1,4,R4,0,0,0,0,0,0,0,Dana\nM1,5,R5,0,0,0,0,0,0,0,\n");
        let upload = parse_match_csv(input.as_bytes()).unwrap();
        assert_eq!(upload.rows[0].player_name.as_deref(), Some("Dana"));
        assert_eq!(upload.rows[1].player_name, None);
    }

    #[test]
    fn test_parse_roster() {
        let input = "Jersey No,Reg No,Player Name,Total Points\n1,R1,Alice,0\n2,R2,Bob,15\n3,R3,Cara,\n";
        let players = parse_roster_csv(input.as_bytes()).unwrap();
        assert_eq!(players.len(), 3);
        assert_eq!(players[0].player_name, "Alice");
        assert_eq!(players[1].total_points, 15);
        assert_eq!(players[2].total_points, 0);
    }

    #[test]
    fn test_parse_roster_without_points_column() {
        let input = "Player Name,Reg No,Jersey No\nAlice,R1,1\n";
        let players = parse_roster_csv(input.as_bytes()).unwrap();
        assert_eq!(players[0].jersey_no, 1);
        assert_eq!(players[0].total_points, 0);
    }

    #[test]
    fn test_parse_roster_missing_name_column() {
        let input = "Jersey No,Reg No\n1,R1\n";
        assert!(matches!(
            parse_roster_csv(input.as_bytes()),
            Err(SchemaError::MissingColumns(_))
        ));
    }

    #[test]
    fn test_parse_match_file_missing_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = parse_match_file(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(
            &err,
            SchemaError::Read { source, .. } if source.kind() == std::io::ErrorKind::NotFound
        ));
        assert!(err.to_string().starts_with("Failed to read"));
    }
}
