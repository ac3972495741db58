//! Auxiliary JSON data file
//!
//! A single JSON object on disk holding arbitrary cached values. Every read
//! and every write takes an exclusive advisory lock on its own file handle.
//!
//! `save` reads and writes through two separate open/lock cycles, so the
//! read-modify-write as a whole is not atomic across processes: a writer in
//! another process can land between the two and its update is lost.

pub mod lock;

pub use lock::FileLock;

use crate::error::{NipypeConfigError, Result};
use crate::utils::helpers::mkdir_p;
use serde_json::{Map, Value};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFile {
    path: PathBuf,
}

impl DataFile {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Value stored under `key`, or `None` when the key or the file is absent
    ///
    /// Never creates the file.
    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        if !self.exists() {
            return Ok(None);
        }

        let mut data = self.read_locked()?;
        Ok(data.remove(key))
    }

    /// Store `value` under `key`, rewriting the whole document
    pub fn save(&self, key: &str, value: Value) -> Result<()> {
        let mut data = if self.exists() {
            self.read_locked()?
        } else {
            if let Some(parent) = self.path.parent() {
                mkdir_p(parent)?;
            }
            Map::new()
        };

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)?;
        let lock = FileLock::exclusive(&file)?;

        data.insert(key.to_string(), value);

        lock.file().set_len(0)?;
        let mut writer = BufWriter::new(lock.file());
        serde_json::to_writer(&mut writer, &data)?;
        writer.flush()?;

        debug!("Saved '{}' to data file: {}", key, self.path.display());
        Ok(())
    }

    fn read_locked(&self) -> Result<Map<String, Value>> {
        let file = File::open(&self.path)?;
        let lock = FileLock::exclusive(&file)?;
        let document: Value = serde_json::from_reader(BufReader::new(lock.file()))?;

        debug!("Read data file: {}", self.path.display());
        match document {
            Value::Object(data) => Ok(data),
            _ => Err(NipypeConfigError::data_file(format!(
                "{} does not contain a JSON object",
                self.path.display()
            ))),
        }
    }
}
