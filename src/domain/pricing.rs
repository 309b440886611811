//! Total-price reconciliation

use super::quote::{Quote, QuoteItem};

/// Plain floating-point sum of item prices, in item order.
pub fn items_total(items: &[QuoteItem]) -> f64 {
    items.iter().map(|item| item.price).sum()
}

/// Returns the quote with its total recomputed from its items.
///
/// Must run after every item mutation, before the quote is persisted.
pub fn recompute_total(mut quote: Quote) -> Quote {
    quote.total_price = items_total(&quote.items);
    quote
}

/// Two-decimal rendering for display. Stored totals are never rounded.
pub fn format_price(value: f64) -> String {
    format!("{:.2}", value)
}
