//! JSONL (JSON Lines) storage.
//!
//! Used for append-only logs. Each line is a valid JSON object representing
//! one entry. Reading is strict: a line that doesn't parse is an error.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use super::{ensure_parent, StorageError};

/// JSONL file writer.
pub struct JsonlWriter<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: Serialize> JsonlWriter<T> {
    /// Create a new JSONL writer for the given path.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a single entry to the file.
    ///
    /// The line is serialized before the file is opened, so a serialization
    /// failure leaves the file untouched. If an earlier append was cut short
    /// the torn line is terminated first, so the new entry stays on its own line.
    pub fn append(&self, entry: &T) -> Result<(), StorageError> {
        let json = serde_json::to_string(entry)?;
        ensure_parent(&self.path)?;

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)?;
        let torn = ends_without_newline(&mut file)?;

        let mut writer = BufWriter::new(file);
        if torn {
            warn!("Terminating unfinished last line in {:?}", self.path);
            writeln!(writer)?;
        }
        writeln!(writer, "{}", json)?;
        writer.flush()?;
        writer.get_ref().sync_data()?;

        debug!("Appended entry to {:?}", self.path);
        Ok(())
    }
}

fn ends_without_newline(file: &mut File) -> Result<bool, StorageError> {
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

/// JSONL file reader.
pub struct JsonlReader<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: DeserializeOwned> JsonlReader<T> {
    /// Create a new JSONL reader for the given path.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Check if the file exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read all entries from the file. A missing file reads as empty; blank
    /// lines are ignored and any other unparseable line fails the read.
    pub fn read_all(&self) -> Result<Vec<T>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;

            if line.trim().is_empty() {
                continue;
            }

            let entry = serde_json::from_str(&line).map_err(|source| {
                StorageError::MalformedEntry {
                    path: self.path.clone(),
                    line: idx + 1,
                    source,
                }
            })?;
            entries.push(entry);
        }

        debug!("Read {} entries from {:?}", entries.len(), self.path);
        Ok(entries)
    }
}
