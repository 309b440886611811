//! Quote Entity
//!
//! A quote is a dated, priced proposal made of ordered line items.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::entity::{position_by_id, DomainError, DomainResult, Entity};
use super::pricing::{items_total, recompute_total};
use super::validation::{check_duplicate_name, ItemDraft, NameMatch, ValidationError};

/// A single priced line of a quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteItem {
    /// Unique within the parent quote
    pub id: String,
    /// Unique within the parent quote (see `NameMatch`)
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
}

/// A priced proposal composed of line items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Globally unique, never changes after creation
    pub quote_id: String,
    /// Serialized as `YYYY-MM-DD`
    pub created_date: NaiveDate,
    /// Always the sum of `items[].price`
    pub total_price: f64,
    /// Insertion order is display order
    #[serde(default)]
    pub items: Vec<QuoteItem>,
}

impl Quote {
    /// Create an empty quote
    pub fn new(quote_id: String, created_date: NaiveDate) -> Self {
        Self {
            quote_id,
            created_date,
            total_price: 0.0,
            items: Vec::new(),
        }
    }

    pub fn item(&self, item_id: &str) -> Option<&QuoteItem> {
        position_by_id(&self.items, item_id).map(|index| &self.items[index])
    }

    /// True when the stored total matches the items
    pub fn is_consistent(&self) -> bool {
        self.total_price == items_total(&self.items)
    }

    /// Append an item, rejecting an id or a name already used in this quote.
    pub fn with_item_added(&self, item: QuoteItem, policy: NameMatch) -> DomainResult<Quote> {
        if position_by_id(&self.items, &item.id).is_some() {
            return Err(DomainError::Conflict(format!(
                "item {} already exists in quote {}",
                item.id, self.quote_id
            )));
        }
        if check_duplicate_name(&self.items, &item.name, None, policy) {
            return Err(ValidationError::DuplicateName(item.name).into());
        }

        let mut updated = self.clone();
        updated.items.push(item);
        Ok(recompute_total(updated))
    }

    /// Replace an item's fields in place, keeping its id and position.
    pub fn with_item_updated(&self, item_id: &str, draft: ItemDraft, policy: NameMatch) -> DomainResult<Quote> {
        let index = self.position_of(item_id)?;

        if check_duplicate_name(&self.items, &draft.name, Some(item_id), policy) {
            return Err(ValidationError::DuplicateName(draft.name).into());
        }

        let mut updated = self.clone();
        updated.items[index] = draft.into_item(item_id.to_string());
        Ok(recompute_total(updated))
    }

    pub fn with_item_removed(&self, item_id: &str) -> DomainResult<Quote> {
        let index = self.position_of(item_id)?;

        let mut updated = self.clone();
        updated.items.remove(index);
        Ok(recompute_total(updated))
    }

    fn position_of(&self, item_id: &str) -> DomainResult<usize> {
        position_by_id(&self.items, item_id).ok_or_else(|| DomainError::item_not_found(&self.quote_id, item_id))
    }
}

impl Entity for Quote {
    fn id(&self) -> &str {
        &self.quote_id
    }
}

impl Entity for QuoteItem {
    fn id(&self) -> &str {
        &self.id
    }
}
