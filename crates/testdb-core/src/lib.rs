//! testdb-core
//!
//! Record model, error taxonomy, configuration and the capability traits
//! shared by the store and match crates.
#![deny(unused_imports)]

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use types::{Hit, Record, RecordId, RecordTable, SearchResults};
