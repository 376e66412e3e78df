use tracing::{debug, warn};

use testdb_core::error::Result;
use testdb_core::traits::IndexStore;
use testdb_core::types::{Record, RecordTable};

/// Index store backed by a table owned by this instance.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    table: RecordTable,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self) -> &RecordTable {
        &self.table
    }
}

impl IndexStore for MemoryStore {
    fn upsert(&mut self, records: &[Record]) -> Result<()> {
        for record in records {
            if self.table.upsert(record.clone()).is_none() {
                warn!("skipping record without an id");
            }
        }
        debug!(total = self.table.len(), "memory store upserted {} records", records.len());
        Ok(())
    }

    fn delete(&mut self, records: &[Record]) -> Result<()> {
        for id in records.iter().filter_map(Record::id) {
            if self.table.remove(&id).is_some() {
                debug!(%id, "memory store removed record");
            }
        }
        Ok(())
    }

    fn get_all(&self) -> Result<RecordTable> {
        Ok(self.table.clone())
    }
}
