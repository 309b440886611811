//! Single-slot undo buffer for deleted quotes
//!
//! A deleted quote is held for a bounded window. Undo within the window
//! hands it back; once the window elapses the slot is cleared and undo is
//! a no-op. Holding a new deletion replaces the slot and cancels the
//! previous timer, so only the newest deletion can be undone.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::domain::Quote;

/// Default undo window for deletions
pub const DEFAULT_UNDO_WINDOW: Duration = Duration::from_millis(5000);

struct Pending {
    quote: Quote,
    generation: u64,
    expires_at: Instant,
    timer: JoinHandle<()>,
}

#[derive(Default)]
struct Slot {
    pending: Option<Pending>,
    /// Bumped on every hold so a stale timer never clears a newer deletion
    generation: u64,
}

impl Slot {
    /// Remove the pending deletion, cancelling its timer
    fn clear(&mut self) -> Option<Quote> {
        self.pending.take().map(|pending| {
            pending.timer.abort();
            pending.quote
        })
    }

    fn live(&self) -> Option<&Pending> {
        self.pending.as_ref().filter(|pending| Instant::now() < pending.expires_at)
    }
}

pub struct DeleteUndoBuffer {
    window: Duration,
    slot: Arc<Mutex<Slot>>,
}

impl DeleteUndoBuffer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            slot: Arc::new(Mutex::new(Slot::default())),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Hold a deleted quote and start its undo window.
    ///
    /// Returns the previously pending quote, whose undo is forfeited.
    pub async fn hold(&self, quote: Quote) -> Option<Quote> {
        let mut slot = self.slot.lock().await;
        let forfeited = slot.clear();
        if let Some(previous) = &forfeited {
            log::info!("Undo for quote {} forfeited by a newer deletion", previous.quote_id);
        }

        slot.generation += 1;
        let generation = slot.generation;
        let timer = tokio::spawn(expire_after(Arc::clone(&self.slot), generation, self.window));

        log::debug!("Holding deleted quote {} for {:?}", quote.quote_id, self.window);
        slot.pending = Some(Pending {
            quote,
            generation,
            expires_at: Instant::now() + self.window,
            timer,
        });
        forfeited
    }

    /// The quote that can still be restored, if any
    pub async fn pending(&self) -> Option<Quote> {
        self.slot.lock().await.live().map(|pending| pending.quote.clone())
    }

    pub async fn is_pending(&self) -> bool {
        self.slot.lock().await.live().is_some()
    }

    /// Take the pending quote for restoration, cancelling its timer.
    /// Returns `None` once the window has elapsed.
    pub async fn take(&self) -> Option<Quote> {
        let mut slot = self.slot.lock().await;
        if slot.live().is_none() {
            slot.clear();
            return None;
        }
        slot.clear()
    }

    /// Drop any pending deletion without restoring it
    pub async fn clear(&self) {
        self.slot.lock().await.clear();
    }
}

impl Drop for DeleteUndoBuffer {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.slot.try_lock() {
            slot.clear();
        }
    }
}

async fn expire_after(slot: Arc<Mutex<Slot>>, generation: u64, window: Duration) {
    tokio::time::sleep(window).await;

    let mut slot = slot.lock().await;
    if slot.pending.as_ref().is_some_and(|pending| pending.generation == generation) {
        if let Some(expired) = slot.pending.take() {
            log::info!("Undo window for quote {} elapsed", expired.quote.quote_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn quote(id: &str) -> Quote {
        Quote::new(id.to_string(), NaiveDate::from_ymd_opt(2024, 4, 4).unwrap())
    }

    #[tokio::test(start_paused = true)]
    async fn test_undo_within_window() {
        let buffer = DeleteUndoBuffer::new(DEFAULT_UNDO_WINDOW);
        assert_eq!(buffer.hold(quote("Q1")).await, None);

        tokio::time::sleep(Duration::from_millis(4999)).await;
        assert!(buffer.is_pending().await);
        assert_eq!(buffer.take().await, Some(quote("Q1")));

        // Taken once; nothing left
        assert_eq!(buffer.take().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_elapses() {
        let buffer = DeleteUndoBuffer::new(DEFAULT_UNDO_WINDOW);
        buffer.hold(quote("Q1")).await;

        tokio::time::sleep(Duration::from_millis(5001)).await;
        assert_eq!(buffer.pending().await, None);
        assert_eq!(buffer.take().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_delete_forfeits_first() {
        let buffer = DeleteUndoBuffer::new(Duration::from_secs(5));
        buffer.hold(quote("Q1")).await;

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(buffer.hold(quote("Q2")).await, Some(quote("Q1")));

        // Past the first deletion's deadline; its timer must not clear Q2
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(buffer.pending().await, Some(quote("Q2")));

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(buffer.take().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_cancels() {
        let buffer = DeleteUndoBuffer::new(DEFAULT_UNDO_WINDOW);
        buffer.hold(quote("Q1")).await;
        buffer.clear().await;
        assert!(!buffer.is_pending().await);
    }
}
