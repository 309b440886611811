//! Repository Layer
//!
//! Data access abstractions and implementations.

mod db;
mod item_repo;
mod json_store;
mod memory_store;
mod sqlite_store;
mod traits;

#[cfg(test)]
mod tests;

pub use db::{open_db, IN_MEMORY};
pub use item_repo::ItemRepository;
pub use json_store::JsonFileStore;
pub use memory_store::InMemoryQuoteStore;
pub use sqlite_store::SqliteQuoteStore;
pub use traits::QuoteStore;
