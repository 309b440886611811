//! In-Memory Quote Store
//!
//! Keeps the collection in process. Used for ephemeral sessions and tests;
//! writes can be switched to fail to exercise storage-error paths.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

use crate::domain::{remove_by_id, upsert_by_id, DomainError, DomainResult, Quote};
use super::traits::QuoteStore;

#[derive(Debug, Default)]
pub struct InMemoryQuoteStore {
    quotes: RwLock<Vec<Quote>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl InMemoryQuoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quotes(quotes: Vec<Quote>) -> Self {
        Self {
            quotes: RwLock::new(quotes),
            ..Self::default()
        }
    }

    /// Make every subsequent write fail with a storage error
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check_writable(&self) -> DomainResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::Storage("in-memory store is failing writes".to_string()));
        }
        Ok(())
    }

    fn count_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl QuoteStore for InMemoryQuoteStore {
    async fn list(&self) -> DomainResult<Vec<Quote>> {
        Ok(self.quotes.read().await.clone())
    }

    async fn get_by_id(&self, quote_id: &str) -> DomainResult<Option<Quote>> {
        let quotes = self.quotes.read().await;
        Ok(quotes.iter().find(|quote| quote.quote_id == quote_id).cloned())
    }

    async fn save_all(&self, quotes: &[Quote]) -> DomainResult<()> {
        self.check_writable()?;
        *self.quotes.write().await = quotes.to_vec();
        self.count_write();
        Ok(())
    }

    async fn upsert(&self, quote: &Quote) -> DomainResult<()> {
        self.check_writable()?;
        upsert_by_id(&mut *self.quotes.write().await, quote.clone());
        self.count_write();
        Ok(())
    }

    async fn delete(&self, quote_id: &str) -> DomainResult<()> {
        self.check_writable()?;
        remove_by_id(&mut *self.quotes.write().await, quote_id)
            .ok_or_else(|| DomainError::quote_not_found(quote_id))?;
        self.count_write();
        Ok(())
    }

    fn revision(&self) -> u64 {
        self.write_count() as u64
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
