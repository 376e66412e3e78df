use tracing::debug;

use testdb_core::config::{Config, MatchOptions};
use testdb_core::error::Result;
use testdb_core::traits::{Engine, IndexStore, RecordStore};
use testdb_core::types::{Record, RecordId, SearchResults};
use testdb_store::{JsonFileStore, MemoryStore};

use crate::matcher::Matcher;

/// Search engine for tests: stores records in an `IndexStore` and answers
/// queries by edit distance.
#[derive(Debug, Clone)]
pub struct TestingEngine<S = MemoryStore> {
    store: S,
    matcher: Matcher,
}

impl TestingEngine<MemoryStore> {
    pub fn in_memory() -> Self {
        Self::with_store(MemoryStore::new(), MatchOptions::default())
    }
}

impl TestingEngine<JsonFileStore> {
    /// File-backed engine with the default match policy. The storage path is
    /// looked up when the engine first touches storage.
    pub fn json_file(config: Config) -> Self {
        Self::with_store(JsonFileStore::new(config), MatchOptions::default())
    }

    /// File-backed engine taking match policy overrides from `config` too.
    pub fn from_config(config: Config) -> Result<Self> {
        let options = config.match_options()?;
        Ok(Self::with_store(JsonFileStore::new(config), options))
    }
}

impl<S: IndexStore> TestingEngine<S> {
    pub fn with_store(store: S, options: MatchOptions) -> Self {
        Self { store, matcher: Matcher::new(options) }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }
}

impl<S: IndexStore> Engine for TestingEngine<S> {
    fn update(&mut self, records: &[Record]) -> Result<()> {
        self.store.upsert(records)
    }

    fn delete(&mut self, records: &[Record]) -> Result<()> {
        self.store.delete(records)
    }

    fn search(&self, query: &str) -> Result<SearchResults> {
        let table = self.store.get_all()?;
        Ok(self.matcher.rank(query, &table))
    }

    /// Paging is not supported: always empty.
    fn paginate(&self, query: &str, per_page: usize, page: usize) -> Result<SearchResults> {
        debug!(query, per_page, page, "paginate returns no hits");
        Ok(SearchResults::empty())
    }

    /// Always empty; resolve hits through `map` instead.
    fn map_ids(&self, _results: &SearchResults) -> Vec<RecordId> {
        Vec::new()
    }

    /// Resolve hits to models in hit order. Hits the record store cannot
    /// resolve are dropped.
    fn map<R: RecordStore>(&self, results: &SearchResults, store: &R) -> Result<Vec<R::Model>> {
        if results.is_empty() {
            return Ok(Vec::new());
        }
        let ids = results.ids();
        let mut models = store.find_many(&ids)?;
        Ok(ids.iter().filter_map(|id| models.remove(id)).collect())
    }

    fn get_total_count(&self, results: &SearchResults) -> usize {
        results.len()
    }
}
