//! Index store persisted as a single JSON document.
//!
//! The file holds an object keyed by stringified record id. Every write reads
//! the current document, merges the incoming records over it and replaces the
//! file through a temporary sibling. There is no locking: concurrent writers
//! to the same file may lose updates.
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use testdb_core::config::Config;
use testdb_core::error::{Error, Result};
use testdb_core::traits::IndexStore;
use testdb_core::types::{Record, RecordTable};

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    config: Config,
}

impl JsonFileStore {
    /// The storage path is resolved from `testing.storage` on every access,
    /// so a missing key only fails once the store is used.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Store at an explicit path.
    pub fn at(path: impl AsRef<Path>) -> Self {
        Self::new(Config::default().with_storage(path))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn path(&self) -> Result<PathBuf> {
        self.config.storage_path()
    }

    /// Create the backing file holding an empty table. Returns `false` when
    /// the file already exists.
    pub fn init(&self) -> Result<bool> {
        let path = self.path()?;
        if path.exists() {
            return Ok(false);
        }
        write_table(&path, &RecordTable::new())?;
        debug!(path = %path.display(), "initialized empty storage file");
        Ok(true)
    }

    /// Upsert records given as raw JSON: an array of records, a single record,
    /// or an object keyed by id. Malformed input fails before the storage file
    /// is touched.
    pub fn upsert_json(&mut self, data: &str) -> Result<usize> {
        let value: serde_json::Value = serde_json::from_str(data)?;
        let incoming = RecordTable::from_document(value)?;
        let count = incoming.len();
        self.merge_and_write(incoming)?;
        Ok(count)
    }

    fn merge_and_write(&self, incoming: RecordTable) -> Result<()> {
        let path = self.path()?;
        ensure_writable(&path)?;

        let mut table = if path.exists() { read_table(&path)? } else { RecordTable::new() };
        let added = incoming.len();
        table.merge(incoming);
        write_table(&path, &table)?;
        debug!(path = %path.display(), added, total = table.len(), "storage file updated");
        Ok(())
    }
}

impl IndexStore for JsonFileStore {
    fn upsert(&mut self, records: &[Record]) -> Result<()> {
        let mut incoming = RecordTable::new();
        for record in records {
            if incoming.upsert(record.clone()).is_none() {
                warn!("skipping record without an id");
            }
        }
        self.merge_and_write(incoming)
    }

    fn delete(&mut self, records: &[Record]) -> Result<()> {
        let path = self.path()?;
        let mut table = read_table(&path)?;

        let mut removed = 0usize;
        for id in records.iter().filter_map(Record::id) {
            if table.remove(&id).is_some() {
                removed += 1;
            }
        }
        if removed == 0 {
            return Ok(());
        }

        ensure_writable(&path)?;
        write_table(&path, &table)?;
        debug!(path = %path.display(), removed, total = table.len(), "removed records from storage file");
        Ok(())
    }

    fn get_all(&self) -> Result<RecordTable> {
        read_table(&self.path()?)
    }
}

fn read_table(path: &Path) -> Result<RecordTable> {
    if !path.exists() {
        return Err(Error::StorageUnavailable { path: path.to_path_buf() });
    }
    let data = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::InvalidData => {
            Error::InvalidData(format!("{} is not valid UTF-8", path.display()))
        }
        _ => Error::StorageUnavailable { path: path.to_path_buf() },
    })?;
    RecordTable::from_json(&data)
}

/// An existing file flagged read-only cannot be written. A missing file is
/// fine; it is created on write.
fn ensure_writable(path: &Path) -> Result<()> {
    match fs::metadata(path) {
        Ok(meta) if meta.permissions().readonly() => {
            Err(Error::StorageNotWritable { path: path.to_path_buf(), source: None })
        }
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(not_writable(path, e)),
    }
}

fn write_table(path: &Path, table: &RecordTable) -> Result<()> {
    let data = table.to_json()?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| not_writable(path, e))?;
    tmp.write_all(data.as_bytes())?;
    tmp.flush()?;
    if let Ok(meta) = fs::metadata(path) {
        fs::set_permissions(tmp.path(), meta.permissions())?;
    }
    tmp.persist(path).map_err(|e| not_writable(path, e.error))?;
    Ok(())
}

fn not_writable(path: &Path, source: io::Error) -> Error {
    Error::StorageNotWritable { path: path.to_path_buf(), source: Some(source) }
}
