//! Fuzzy ranking of indexed records against a free-text query.
//!
//! For each record the candidate fields are its scalar fields (strings,
//! numbers, booleans), narrowed to the names in `searchable` when the record
//! declares a non-empty list. The record's distance is the smallest
//! Levenshtein distance between the raw query and a candidate field's text.
//! A record is a hit when it has at least one candidate field and that
//! distance is within `MatchOptions::max_distance`. Hits are returned in
//! ascending distance; ties keep the store's order.

use std::borrow::Cow;

use tracing::debug;

use testdb_core::config::MatchOptions;
use testdb_core::types::{Hit, Record, RecordTable, SearchResults};

use crate::levenshtein::{levenshtein, levenshtein_within};

#[derive(Debug, Clone, Copy, Default)]
pub struct Matcher {
    options: MatchOptions,
}

impl Matcher {
    pub fn new(options: MatchOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> MatchOptions {
        self.options
    }

    /// Rank every record in `table` against `query`.
    pub fn rank(&self, query: &str, table: &RecordTable) -> SearchResults {
        let mut hits: Vec<Hit> = table
            .records()
            .filter_map(|record| {
                self.closest(query, record).map(|lev| Hit { record: record.clone(), lev })
            })
            .collect();
        // Stable: equal distances keep table order.
        hits.sort_by_key(|hit| hit.lev);

        debug!(query, scanned = table.len(), hits = hits.len(), "ranked records");
        SearchResults { hits }
    }

    /// Minimum distance from `query` to any candidate field of `record`,
    /// unbounded. `None` when the record has no candidate field.
    pub fn distance(&self, query: &str, record: &Record) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (_, text) in candidate_fields(record) {
            let lev = levenshtein(query, &text);
            best = Some(best.map_or(lev, |b| b.min(lev)));
            if lev == 0 && self.options.stop_on_exact {
                break;
            }
        }
        best
    }

    /// Like `distance`, but only distances within the threshold count, and
    /// the bound tightens as closer fields are found.
    fn closest(&self, query: &str, record: &Record) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (_, text) in candidate_fields(record) {
            let bound = best.unwrap_or(self.options.max_distance);
            let Some(lev) = levenshtein_within(query, &text, bound) else {
                continue;
            };
            best = Some(lev);
            if lev == 0 && self.options.stop_on_exact {
                break;
            }
        }
        best
    }
}

/// Fields of `record` compared against the query, in record order, with the
/// text each is compared under.
///
/// Names listed in `searchable` that are absent or not scalar are simply not
/// compared; a list selecting nothing leaves no candidates.
pub fn candidate_fields(record: &Record) -> Vec<(&str, Cow<'_, str>)> {
    let scalars = record.scalar_fields();
    match record.searchable() {
        Some(names) => scalars.filter(|(name, _)| names.contains(name)).collect(),
        None => scalars.collect(),
    }
}
