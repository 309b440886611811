//! Item Repository
//!
//! Item sub-resource of a quote: items are stored nested inside their quote
//! and every write upserts the whole quote with a reconciled total.
//! This is the row-level path; it does not touch session history.

use std::sync::Arc;

use crate::domain::{
    validate_item_input, DomainError, DomainResult, IdGenerator, ItemInput, Quote, QuoteItem, ValidationRules,
};
use super::traits::QuoteStore;

pub struct ItemRepository {
    store: Arc<dyn QuoteStore>,
    ids: Arc<dyn IdGenerator>,
    rules: ValidationRules,
}

impl ItemRepository {
    pub fn new(store: Arc<dyn QuoteStore>, ids: Arc<dyn IdGenerator>, rules: ValidationRules) -> Self {
        Self { store, ids, rules }
    }

    async fn load_quote(&self, quote_id: &str) -> DomainResult<Quote> {
        self.store
            .get_by_id(quote_id)
            .await?
            .ok_or_else(|| DomainError::quote_not_found(quote_id))
    }

    /// List items of a quote in display order
    pub async fn list(&self, quote_id: &str) -> DomainResult<Vec<QuoteItem>> {
        Ok(self.load_quote(quote_id).await?.items)
    }

    /// Validate and append a new item
    pub async fn create(&self, quote_id: &str, input: &ItemInput) -> DomainResult<QuoteItem> {
        let draft = validate_item_input(input, &self.rules)?;
        let quote = self.load_quote(quote_id).await?;

        let item = draft.into_item(self.ids.item_id());
        let updated = quote.with_item_added(item.clone(), self.rules.name_match).map_err(|e| {
            log::warn!("Rejected item for quote {}: {}", quote_id, e);
            e
        })?;

        self.store.upsert(&updated).await?;
        Ok(item)
    }

    /// Replace an item's fields, keeping its id
    pub async fn update(&self, quote_id: &str, item_id: &str, input: &ItemInput) -> DomainResult<QuoteItem> {
        let draft = validate_item_input(input, &self.rules)?;
        let quote = self.load_quote(quote_id).await?;

        let updated = quote.with_item_updated(item_id, draft, self.rules.name_match)?;
        self.store.upsert(&updated).await?;

        updated
            .item(item_id)
            .cloned()
            .ok_or_else(|| DomainError::item_not_found(quote_id, item_id))
    }

    pub async fn delete(&self, quote_id: &str, item_id: &str) -> DomainResult<()> {
        let quote = self.load_quote(quote_id).await?;
        let updated = quote.with_item_removed(item_id)?;
        self.store.upsert(&updated).await
    }
}
