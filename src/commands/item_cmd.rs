//! Commands for the line items of a quote
//!
//! Every write returns the updated quote with its total reconciled.

use crate::domain::{validate_item_input, DomainError, DomainResult, ItemDraft, ItemInput, Quote, QuoteItem};
use crate::session::QuoteSession;
use super::quote_cmd::{commit_quote, find_quote};

/// List items of a quote in display order
pub async fn list_items(session: &QuoteSession, quote_id: &str) -> DomainResult<Vec<QuoteItem>> {
    let history = session.history().lock().await;
    Ok(find_quote(&history, quote_id)?.items)
}

/// Validate and append a new item
pub async fn add_item(session: &QuoteSession, quote_id: &str, input: &ItemInput) -> DomainResult<Quote> {
    let draft = validate(session, quote_id, input)?;
    let mut history = session.history().lock().await;
    let quote = find_quote(&history, quote_id)?;

    let item = draft.into_item(session.ids().item_id());
    let updated = quote.with_item_added(item, session.rules().name_match).map_err(|e| {
        log::warn!("Rejected item for quote {}: {}", quote_id, e);
        e
    })?;

    commit_quote(&mut history, updated).await
}

/// Replace an item's fields, keeping its id and position
pub async fn update_item(
    session: &QuoteSession,
    quote_id: &str,
    item_id: &str,
    input: &ItemInput,
) -> DomainResult<Quote> {
    let draft = validate(session, quote_id, input)?;
    let mut history = session.history().lock().await;
    let quote = find_quote(&history, quote_id)?;

    let updated = quote.with_item_updated(item_id, draft, session.rules().name_match)?;
    commit_quote(&mut history, updated).await
}

pub async fn delete_item(session: &QuoteSession, quote_id: &str, item_id: &str) -> DomainResult<Quote> {
    let mut history = session.history().lock().await;
    let quote = find_quote(&history, quote_id)?;

    let updated = quote.with_item_removed(item_id)?;
    log::debug!("Removed item {} from quote {}", item_id, quote_id);
    commit_quote(&mut history, updated).await
}

fn validate(session: &QuoteSession, quote_id: &str, input: &ItemInput) -> DomainResult<ItemDraft> {
    validate_item_input(input, session.rules()).map_err(|e| {
        log::warn!("Invalid item input for quote {}: {}", quote_id, e);
        DomainError::from(e)
    })
}
