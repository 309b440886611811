//! Domain Layer
//!
//! Contains all domain entities and core abstractions.
//! This layer has NO storage dependencies (except serde for serialization).

mod entity;
mod id_gen;
mod pricing;
mod quote;
mod validation;

pub use entity::{position_by_id, remove_by_id, upsert_by_id, DomainError, DomainResult, Entity};
pub use id_gen::{IdGenerator, SequentialIdGenerator, UuidIdGenerator};
pub use pricing::{format_price, items_total, recompute_total};
pub use quote::{Quote, QuoteItem};
pub use validation::{
    check_duplicate_name, parse_price, validate_item_input, Field, ItemDraft, ItemInput, NameMatch,
    ValidationError, ValidationRules,
};
