//! Item Validation
//!
//! Pure checks run before any item mutation: field presence, price parsing
//! and name uniqueness within a quote.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::quote::QuoteItem;

/// Item form fields that can be reported as missing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Description,
    Price,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Name => "name",
            Field::Description => "description",
            Field::Price => "price",
        };
        f.write_str(name)
    }
}

/// Rejections raised before any state is touched
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "reason", content = "value", rename_all = "snake_case")]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(Field),
    #[error("Price must be a non-negative number, got {0:?}")]
    InvalidPrice(String),
    #[error("An item named {0:?} already exists")]
    DuplicateName(String),
}

/// How item names are compared for uniqueness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameMatch {
    #[default]
    CaseSensitive,
    CaseInsensitive,
}

impl NameMatch {
    pub fn matches(self, a: &str, b: &str) -> bool {
        match self {
            NameMatch::CaseSensitive => a == b,
            NameMatch::CaseInsensitive => a.to_lowercase() == b.to_lowercase(),
        }
    }
}

/// Validation policy for item input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationRules {
    pub name_match: NameMatch,
    /// When false a blank description is stored as an empty string
    pub require_description: bool,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            name_match: NameMatch::CaseSensitive,
            require_description: true,
        }
    }
}

/// Raw item form input, exactly as submitted
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
}

impl ItemInput {
    pub fn new(name: impl Into<String>, description: impl Into<String>, price: f64) -> Self {
        Self {
            name: Some(name.into()),
            description: Some(description.into()),
            price: Some(price.to_string()),
        }
    }
}

/// A validated item waiting for an id
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDraft {
    pub name: String,
    pub description: String,
    pub price: f64,
}

impl ItemDraft {
    pub fn into_item(self, id: String) -> QuoteItem {
        QuoteItem {
            id,
            name: self.name,
            description: self.description,
            price: self.price,
        }
    }
}

/// Check presence of every required field and parse the price.
pub fn validate_item_input(input: &ItemInput, rules: &ValidationRules) -> Result<ItemDraft, ValidationError> {
    let name = required(input.name.as_deref(), Field::Name)?;

    let description = match non_blank(input.description.as_deref()) {
        Some(text) => text.to_string(),
        None if rules.require_description => return Err(ValidationError::MissingField(Field::Description)),
        None => String::new(),
    };

    let price = parse_price(required(input.price.as_deref(), Field::Price)?)?;

    Ok(ItemDraft {
        name: name.to_string(),
        description,
        price,
    })
}

/// Parse a price, accepting only finite values >= 0.
pub fn parse_price(text: &str) -> Result<f64, ValidationError> {
    let text = text.trim();
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(value),
        _ => Err(ValidationError::InvalidPrice(text.to_string())),
    }
}

/// True when another item (other than `exclude_id`) already uses `name`.
pub fn check_duplicate_name(items: &[QuoteItem], name: &str, exclude_id: Option<&str>, policy: NameMatch) -> bool {
    items
        .iter()
        .filter(|item| Some(item.id.as_str()) != exclude_id)
        .any(|item| policy.matches(&item.name, name))
}

fn required(value: Option<&str>, field: Field) -> Result<&str, ValidationError> {
    non_blank(value).ok_or(ValidationError::MissingField(field))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|text| !text.is_empty())
}
