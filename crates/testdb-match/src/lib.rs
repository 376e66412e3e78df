//! testdb-match
//!
//! Edit-distance ranking of indexed records and the `TestingEngine` that
//! drives it over an `IndexStore`. See `matcher` for the acceptance policy.

pub mod engine;
pub mod levenshtein;
pub mod matcher;

pub use engine::TestingEngine;
pub use matcher::Matcher;
pub use testdb_core::config::MatchOptions;
