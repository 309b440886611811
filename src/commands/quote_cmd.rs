//! Commands for Quote CRUD, undo/redo and undoable deletes

use chrono::NaiveDate;

use crate::domain::{remove_by_id, upsert_by_id, DomainError, DomainResult, Quote};
use crate::history::{HistoryStatus, QuoteHistory, Snapshot};
use crate::session::QuoteSession;

/// List all quotes in display order
pub async fn list_quotes(session: &QuoteSession) -> DomainResult<Vec<Quote>> {
    Ok(session.history().lock().await.present().clone())
}

/// Get quote by ID
pub async fn get_quote(session: &QuoteSession, quote_id: &str) -> DomainResult<Quote> {
    session
        .history()
        .lock()
        .await
        .find(quote_id)
        .cloned()
        .ok_or_else(|| DomainError::quote_not_found(quote_id))
}

/// Create an empty quote dated today
pub async fn create_quote(session: &QuoteSession) -> DomainResult<Quote> {
    let mut history = session.history().lock().await;

    let quote_id = session.ids().quote_id();
    if history.find(&quote_id).is_some() {
        log::warn!("Generated quote id {} is already in use", quote_id);
        return Err(DomainError::Conflict(format!("quote {} already exists", quote_id)));
    }

    let quote = Quote::new(quote_id, chrono::Local::now().date_naive());
    let mut next = history.present().clone();
    next.push(quote.clone());
    history.record(next).await?;

    log::info!("Created quote {}", quote.quote_id);
    Ok(quote)
}

pub async fn set_created_date(session: &QuoteSession, quote_id: &str, date: NaiveDate) -> DomainResult<Quote> {
    let mut history = session.history().lock().await;
    let mut quote = find_quote(&history, quote_id)?;
    quote.created_date = date;
    commit_quote(&mut history, quote).await
}

/// Delete a quote, keeping it restorable through `undo_delete` for the
/// session's undo window. Any earlier pending deletion is forfeited.
pub async fn delete_quote(session: &QuoteSession, quote_id: &str) -> DomainResult<Quote> {
    let mut history = session.history().lock().await;

    let mut next = history.present().clone();
    let removed = remove_by_id(&mut next, quote_id).ok_or_else(|| DomainError::quote_not_found(quote_id))?;
    history.record(next).await?;

    session.undo_buffer().hold(removed.clone()).await;
    log::info!("Deleted quote {}", quote_id);
    Ok(removed)
}

/// Restore the most recently deleted quote at the end of the list.
///
/// Returns `None` when nothing is pending or the window has elapsed. A
/// quote whose id is back in the collection already is not restored
/// twice: the pending deletion is dropped and `Conflict` is returned.
pub async fn undo_delete(session: &QuoteSession) -> DomainResult<Option<Quote>> {
    let mut history = session.history().lock().await;

    let Some(pending) = session.undo_buffer().pending().await else {
        log::debug!("Undo delete with nothing pending");
        return Ok(None);
    };

    if history.find(&pending.quote_id).is_some() {
        session.undo_buffer().clear().await;
        return Err(DomainError::Conflict(format!("quote {} already exists", pending.quote_id)));
    }

    let mut next = history.present().clone();
    next.push(pending.clone());
    history.record(next).await?;
    session.undo_buffer().clear().await;

    log::info!("Restored deleted quote {}", pending.quote_id);
    Ok(Some(pending))
}

/// The deleted quote `undo_delete` would restore right now
pub async fn pending_delete(session: &QuoteSession) -> Option<Quote> {
    session.undo_buffer().pending().await
}

/// Step back one change. Returns the restored collection, or `None`
/// when there is nothing to undo.
pub async fn undo(session: &QuoteSession) -> DomainResult<Option<Snapshot>> {
    let mut history = session.history().lock().await;
    let applied = history.undo().await?;
    Ok(applied.then(|| history.present().clone()))
}

/// Re-apply the last undone change. Returns the restored collection, or
/// `None` when there is nothing to redo.
pub async fn redo(session: &QuoteSession) -> DomainResult<Option<Snapshot>> {
    let mut history = session.history().lock().await;
    let applied = history.redo().await?;
    Ok(applied.then(|| history.present().clone()))
}

pub async fn history_status(session: &QuoteSession) -> HistoryStatus {
    session.history().lock().await.status()
}

/// Re-read the store, discarding undo/redo history
pub async fn reload(session: &QuoteSession) -> DomainResult<Vec<Quote>> {
    let mut history = session.history().lock().await;
    history.reload().await?;
    log::info!("Reloaded {} quotes from {} store", history.present().len(), session.store().backend());
    Ok(history.present().clone())
}

pub(super) fn find_quote(history: &QuoteHistory, quote_id: &str) -> DomainResult<Quote> {
    history
        .find(quote_id)
        .cloned()
        .ok_or_else(|| DomainError::quote_not_found(quote_id))
}

/// Record the collection with `quote` replaced in place
pub(super) async fn commit_quote(history: &mut QuoteHistory, quote: Quote) -> DomainResult<Quote> {
    let mut next = history.present().clone();
    upsert_by_id(&mut next, quote.clone());
    history.record(next).await?;
    Ok(quote)
}
