//! testdb-store
//!
//! The two `IndexStore` implementations: an in-memory table owned by the
//! store instance, and a JSON file merged on every write.
pub mod json_file;
pub mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
