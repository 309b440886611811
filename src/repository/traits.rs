//! Repository Layer - Core Traits
//!
//! Defines the abstract interface for quote persistence.
//! Implementations can use a JSON file, SQLite, in-memory, etc.

use async_trait::async_trait;
use crate::domain::{DomainResult, Quote};

/// Durable list of quotes
///
/// All operations are async to support various backends. Stores are plain
/// record stores: no locking across writers, no transactions spanning calls.
#[async_trait]
pub trait QuoteStore: Send + Sync {
    /// List all quotes in insertion order.
    ///
    /// Fails soft: missing storage is initialized to an empty collection,
    /// and unreadable data is moved aside (never dropped) before the rest is
    /// returned. Failures that leave the data in place are returned as errors.
    async fn list(&self) -> DomainResult<Vec<Quote>>;

    /// Find quote by ID
    async fn get_by_id(&self, quote_id: &str) -> DomainResult<Option<Quote>>;

    /// Replace the whole collection, keeping the given order
    async fn save_all(&self, quotes: &[Quote]) -> DomainResult<()>;

    /// Insert at the end if the id is unseen, else replace in place
    async fn upsert(&self, quote: &Quote) -> DomainResult<()>;

    /// Delete quote by ID (`NotFound` if absent)
    async fn delete(&self, quote_id: &str) -> DomainResult<()>;

    /// Counter bumped by every successful `save_all`/`upsert`/`delete`
    /// through this store instance
    fn revision(&self) -> u64;

    /// Short backend label used in log lines
    fn backend(&self) -> &'static str;
}
