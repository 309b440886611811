//! Persisted undo/redo over the quote collection
//!
//! Every transition writes the resulting collection to the store first and
//! only then moves the timeline, so a failed write leaves both the store and
//! the in-memory history exactly as they were.
//!
//! A write through another handle on the same store (the row-level item
//! repository, for one) makes the history stale. Transitions then fail with
//! `Conflict` instead of overwriting that write; `reload` clears the state.

use serde::Serialize;
use std::sync::Arc;

use crate::domain::{DomainError, DomainResult, Quote};
use crate::repository::QuoteStore;
use super::timeline::Timeline;

/// The full quote collection at one point in time
pub type Snapshot = Vec<Quote>;

/// Undo/redo availability, for enabling UI affordances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistoryStatus {
    pub can_undo: bool,
    pub can_redo: bool,
    pub undo_depth: usize,
    pub redo_depth: usize,
}

pub struct QuoteHistory {
    timeline: Timeline<Snapshot>,
    store: Arc<dyn QuoteStore>,
    /// Store revision the present was read from or written as
    seen_revision: u64,
}

impl QuoteHistory {
    /// Start a history whose present is the store's current collection
    pub async fn load(store: Arc<dyn QuoteStore>, limit: Option<usize>) -> DomainResult<Self> {
        let present = store.list().await?;
        let seen_revision = store.revision();
        log::debug!("History loaded {} quotes from {} store", present.len(), store.backend());
        Ok(Self {
            timeline: Timeline::with_limit(present, limit),
            store,
            seen_revision,
        })
    }

    pub fn present(&self) -> &Snapshot {
        self.timeline.present()
    }

    pub fn find(&self, quote_id: &str) -> Option<&Quote> {
        self.present().iter().find(|quote| quote.quote_id == quote_id)
    }

    pub fn status(&self) -> HistoryStatus {
        HistoryStatus {
            can_undo: self.timeline.can_undo(),
            can_redo: self.timeline.can_redo(),
            undo_depth: self.timeline.past().len(),
            redo_depth: self.timeline.future().len(),
        }
    }

    /// Persist `next` and make it the present; redo history is discarded.
    pub async fn record(&mut self, next: Snapshot) -> DomainResult<()> {
        self.persist(&next).await?;
        self.timeline.record(next);
        Ok(())
    }

    /// Restore the previous collection. Returns false when there is
    /// nothing to undo.
    pub async fn undo(&mut self) -> DomainResult<bool> {
        let Some(target) = self.timeline.peek_undo().cloned() else {
            log::debug!("Undo requested with empty history");
            return Ok(false);
        };

        self.persist(&target).await?;
        self.timeline.undo();
        log::info!("Undo applied ({} quotes)", target.len());
        Ok(true)
    }

    /// Re-apply the most recently undone collection. Returns false when
    /// there is nothing to redo.
    pub async fn redo(&mut self) -> DomainResult<bool> {
        let Some(target) = self.timeline.peek_redo().cloned() else {
            log::debug!("Redo requested with empty future");
            return Ok(false);
        };

        self.persist(&target).await?;
        self.timeline.redo();
        log::info!("Redo applied ({} quotes)", target.len());
        Ok(true)
    }

    /// Re-read the store and drop all history
    pub async fn reload(&mut self) -> DomainResult<()> {
        let present = self.store.list().await?;
        self.seen_revision = self.store.revision();
        self.timeline.reset(present);
        Ok(())
    }

    /// True when the store was written through another handle since this
    /// history last read or wrote it
    pub fn is_stale(&self) -> bool {
        self.store.revision() != self.seen_revision
    }

    async fn persist(&mut self, snapshot: &[Quote]) -> DomainResult<()> {
        if self.is_stale() {
            log::warn!("Quote store changed outside this history, refusing to overwrite it");
            return Err(DomainError::Conflict(
                "quote store changed outside this session; reload before editing".to_string(),
            ));
        }

        self.store.save_all(snapshot).await.map_err(|e| {
            log::error!("Error saving quotes to {} store: {}", self.store.backend(), e);
            e
        })?;
        self.seen_revision = self.store.revision();
        Ok(())
    }
}
