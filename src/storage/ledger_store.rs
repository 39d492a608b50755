//! CSV-backed ledger store.
//!
//! The ledger file has one row per player with the columns
//! `Jersey No, Reg No, Player Name, Total Points`, in ledger order.

use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{write_atomic, StorageError};
use crate::error::LedgerError;
use crate::ingest::{COL_JERSEY_NO, COL_PLAYER_NAME, COL_REG_NO, COL_TOTAL_POINTS};
use crate::models::{Ledger, PlayerRecord};

pub const LEDGER_COLUMNS: [&str; 4] =
    [COL_JERSEY_NO, COL_REG_NO, COL_PLAYER_NAME, COL_TOTAL_POINTS];

/// On-disk shape of a ledger row.
#[derive(Debug, Serialize, Deserialize)]
struct LedgerRow {
    #[serde(rename = "Jersey No")]
    jersey_no: u32,
    #[serde(rename = "Reg No")]
    reg_no: String,
    #[serde(rename = "Player Name", default)]
    player_name: String,
    #[serde(rename = "Total Points", default)]
    total_points: Option<i64>,
}

impl From<&PlayerRecord> for LedgerRow {
    fn from(p: &PlayerRecord) -> Self {
        Self {
            jersey_no: p.jersey_no,
            reg_no: p.reg_no.clone(),
            player_name: p.player_name.clone(),
            total_points: Some(p.total_points),
        }
    }
}

impl From<LedgerRow> for PlayerRecord {
    fn from(row: LedgerRow) -> Self {
        PlayerRecord::new(row.jersey_no, row.reg_no, row.player_name)
            .with_points(row.total_points.unwrap_or(0))
    }
}

/// Render records as ledger CSV. The header is written even with no records.
pub fn records_to_csv<'a>(
    records: impl IntoIterator<Item = &'a PlayerRecord>,
) -> Result<Vec<u8>, StorageError> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(Vec::new());
    writer.write_record(LEDGER_COLUMNS)?;
    for record in records {
        writer.serialize(LedgerRow::from(record))?;
    }
    writer
        .into_inner()
        .map_err(|e| StorageError::Io(e.into_error()))
}

/// Atomically write records as ledger CSV to `path`.
pub fn write_records_csv<'a>(
    path: &Path,
    records: impl IntoIterator<Item = &'a PlayerRecord>,
) -> Result<(), StorageError> {
    let bytes = records_to_csv(records)?;
    write_atomic(path, &bytes)
}

/// Map headers onto the ledger column names, matched the same way as roster
/// files (trimmed, case-insensitive). Unknown headers pass through.
fn canonical_headers(headers: &StringRecord) -> StringRecord {
    headers
        .iter()
        .map(|h| {
            let h = h.trim();
            LEDGER_COLUMNS
                .iter()
                .find(|col| col.eq_ignore_ascii_case(h))
                .copied()
                .unwrap_or(h)
        })
        .collect()
}

/// Durable ledger location.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A ledger is initialized once its file exists, even if it holds no players.
    pub fn is_initialized(&self) -> bool {
        self.path.exists()
    }

    /// Read the stored ledger.
    ///
    /// Fails with `StoreUnavailable` if nothing has ever been saved and with
    /// `DuplicatePlayer` if the file repeats a player key.
    pub fn load(&self) -> Result<Ledger, LedgerError> {
        if !self.is_initialized() {
            return Err(LedgerError::StoreUnavailable(self.path.clone()));
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_path(&self.path)
            .map_err(StorageError::from)?;
        let headers = canonical_headers(reader.headers().map_err(StorageError::from)?);
        reader.set_headers(headers);

        let mut records = Vec::new();
        for row in reader.deserialize::<LedgerRow>() {
            let row = row.map_err(StorageError::from)?;
            records.push(PlayerRecord::from(row));
        }

        let ledger = Ledger::from_records(records).map_err(LedgerError::DuplicatePlayer)?;
        debug!("Loaded {} players from {:?}", ledger.len(), self.path);
        Ok(ledger)
    }

    /// Atomically replace the stored ledger.
    pub fn save(&self, ledger: &Ledger) -> Result<(), StorageError> {
        write_records_csv(&self.path, ledger)?;
        info!(
            "Saved ledger: {} players, {} total points",
            ledger.len(),
            ledger.total_points()
        );
        Ok(())
    }
}
