//! Property tests for distance and ranking invariants.

use proptest::prelude::*;
use serde_json::json;

use testdb_core::traits::{Engine, IndexStore};
use testdb_core::types::{Record, RecordTable};
use testdb_match::levenshtein::{levenshtein, levenshtein_within};
use testdb_match::{Matcher, TestingEngine};
use testdb_store::MemoryStore;

fn word() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{0,16}"
}

fn corpus() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(word(), 0..12)
}

fn table_of(titles: &[String]) -> RecordTable {
    titles
        .iter()
        .enumerate()
        .map(|(i, t)| {
            Record::from_value(json!({"id": i, "title": t, "searchable": ["title"]}))
                .expect("record object")
        })
        .collect()
}

proptest! {
    /// Property: distance is symmetric and zero only for equal strings.
    #[test]
    fn prop_distance_symmetric_identity(a in word(), b in word()) {
        let d = levenshtein(&a, &b);
        prop_assert_eq!(d, levenshtein(&b, &a));
        prop_assert_eq!(d == 0, a == b);
        prop_assert!(d <= a.chars().count().max(b.chars().count()));
    }

    /// Property: the bounded variant agrees with the exact distance whenever
    /// the distance is within the bound.
    #[test]
    fn prop_bounded_agrees(a in word(), b in word(), max in 0usize..20) {
        let exact = levenshtein(&a, &b);
        let bounded = levenshtein_within(&a, &b, max);
        if exact <= max {
            prop_assert_eq!(bounded, Some(exact));
        } else {
            prop_assert_eq!(bounded, None);
        }
    }

    /// Property: every hit is within [0, 10], hits are sorted ascending, and
    /// the rank agrees with the exact per-record distance.
    #[test]
    fn prop_hits_within_threshold_and_sorted(titles in corpus(), query in word()) {
        let table = table_of(&titles);
        let matcher = Matcher::default();
        let results = matcher.rank(&query, &table);

        for pair in results.hits.windows(2) {
            prop_assert!(pair[0].lev <= pair[1].lev);
        }
        for hit in &results.hits {
            prop_assert!(hit.lev <= 10);
            prop_assert_eq!(matcher.distance(&query, &hit.record), Some(hit.lev));
        }
        let expected = table
            .records()
            .filter(|r| matcher.distance(&query, r).is_some_and(|d| d <= 10))
            .count();
        prop_assert_eq!(results.len(), expected);
    }

    /// Property: a record whose field equals the query is a hit at distance 0
    /// and sorts no later than any other hit.
    #[test]
    fn prop_exact_match_ranks_first(titles in corpus(), query in word()) {
        let mut titles = titles;
        titles.push(query.clone());
        let results = Matcher::default().rank(&query, &table_of(&titles));

        prop_assert!(!results.is_empty());
        prop_assert_eq!(results.hits[0].lev, 0);
        let exact_id = json!(titles.len() - 1);
        prop_assert!(results.hits.iter().any(|h| h.lev == 0 && h.record.get("id") == Some(&exact_id)));
    }

    /// Property: upserting the same ids repeatedly keeps one entry per id.
    #[test]
    fn prop_upsert_keeps_one_entry_per_id(ids in prop::collection::vec(0u8..8, 0..32)) {
        let mut engine = TestingEngine::with_store(MemoryStore::new(), Default::default());
        for (n, id) in ids.iter().enumerate() {
            let record = Record::from_value(json!({"id": id, "n": n})).expect("record object");
            engine.update(&[record]).expect("update");
        }
        let mut distinct = ids.clone();
        distinct.sort_unstable();
        distinct.dedup();
        prop_assert_eq!(engine.store().get_all().expect("get_all").len(), distinct.len());
    }
}
