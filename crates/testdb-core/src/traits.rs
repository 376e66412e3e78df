use std::collections::HashMap;
use std::hash::BuildHasher;

use crate::error::Result;
use crate::types::{Record, RecordId, RecordTable, SearchResults};

/// Holds the current indexed record set, addressable by identifier.
pub trait IndexStore {
    /// Insert or replace each record under its identifier. Records without
    /// one are skipped.
    fn upsert(&mut self, records: &[Record]) -> Result<()>;

    /// Remove the stored entry for each identifier-carrying record. Absent
    /// identifiers are a no-op.
    fn delete(&mut self, records: &[Record]) -> Result<()>;

    /// Every currently stored record.
    fn get_all(&self) -> Result<RecordTable>;
}

/// Resolves hit identifiers back to the caller's domain models.
pub trait RecordStore {
    type Model;

    fn find_many(&self, ids: &[RecordId]) -> Result<HashMap<RecordId, Self::Model>>;
}

impl<T: Clone, H: BuildHasher> RecordStore for HashMap<RecordId, T, H> {
    type Model = T;

    fn find_many(&self, ids: &[RecordId]) -> Result<HashMap<RecordId, T>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.get(id).map(|model| (id.clone(), model.clone())))
            .collect())
    }
}

/// The search-engine surface a host framework drives.
pub trait Engine {
    fn update(&mut self, records: &[Record]) -> Result<()>;

    fn delete(&mut self, records: &[Record]) -> Result<()>;

    fn search(&self, query: &str) -> Result<SearchResults>;

    fn paginate(&self, query: &str, per_page: usize, page: usize) -> Result<SearchResults>;

    fn map_ids(&self, results: &SearchResults) -> Vec<RecordId>;

    fn map<R: RecordStore>(&self, results: &SearchResults, store: &R) -> Result<Vec<R::Model>>;

    fn get_total_count(&self, results: &SearchResults) -> usize;
}
