//! Archive of applied match files, one CSV per match.

use std::path::{Path, PathBuf};

use csv::WriterBuilder;

use super::{write_atomic, StorageError};
use crate::ingest::MATCH_COLUMNS;
use crate::models::{MatchId, MatchUpload};

pub struct MatchArchive {
    dir: PathBuf,
}

impl MatchArchive {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, match_id: &MatchId) -> PathBuf {
        self.dir.join(format!("{}.csv", match_id.file_stem()))
    }

    /// Write the match's rows in canonical column order.
    pub fn store(&self, upload: &MatchUpload) -> Result<PathBuf, StorageError> {
        let mut writer = WriterBuilder::new().from_writer(Vec::new());
        writer.write_record(MATCH_COLUMNS)?;
        for row in &upload.rows {
            writer.write_record([
                row.match_id.to_string(),
                row.jersey_no.to_string(),
                row.reg_no.clone(),
                row.score.to_string(),
                row.runner_rounds.to_string(),
                row.runout_fielding.to_string(),
                row.catch.to_string(),
                row.assist.to_string(),
                row.errors.to_string(),
                row.runout_running.to_string(),
            ])?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| StorageError::Io(e.into_error()))?;

        let path = self.path_for(&upload.match_id);
        write_atomic(&path, &bytes)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::parse_match_file;
    use crate::models::MatchStatRow;
    use tempfile::TempDir;

    #[test]
    fn test_archived_file_parses_back() {
        let temp_dir = TempDir::new().unwrap();
        let archive = MatchArchive::new(temp_dir.path().join("match_logs"));

        let mut row = MatchStatRow::blank("Final 1", 3, "R3");
        row.catch = 2;
        row.errors = 1;
        let upload = MatchUpload {
            match_id: MatchId::from("Final 1"),
            rows: vec![row],
        };

        let path = archive.store(&upload).unwrap();
        assert_eq!(path, archive.path_for(&upload.match_id));
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("Final_1-") && name.ends_with(".csv"));

        let parsed = parse_match_file(&path).unwrap();
        assert_eq!(parsed, upload);
    }

    #[test]
    fn test_similar_ids_do_not_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let archive = MatchArchive::new(temp_dir.path().to_path_buf());

        let spaced = MatchUpload {
            match_id: MatchId::from("M 1"),
            rows: vec![MatchStatRow::blank("M 1", 1, "R1")],
        };
        let underscored = MatchUpload {
            match_id: MatchId::from("M_1"),
            rows: vec![MatchStatRow::blank("M_1", 2, "R2")],
        };

        let a = archive.store(&spaced).unwrap();
        let b = archive.store(&underscored).unwrap();
        assert_ne!(a, b);
        assert_eq!(parse_match_file(&a).unwrap(), spaced);
        assert_eq!(parse_match_file(&b).unwrap(), underscored);
    }
}
