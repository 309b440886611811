//! Domain Layer - Core Entity Trait
//!
//! This trait defines the basic contract for all domain entities.
//! All entities must have a unique ID and be thread-safe.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::validation::ValidationError;

/// Core trait for all domain entities
///
/// Ids are opaque strings, unique within their collection.
pub trait Entity: Sized + Send + Sync + Clone {
    /// Returns the entity's unique identifier
    fn id(&self) -> &str;
}

/// Index of the entity with `id`, if present
pub fn position_by_id<T: Entity>(entities: &[T], id: &str) -> Option<usize> {
    entities.iter().position(|entity| entity.id() == id)
}

/// Insert at the end if `entity`'s id is unseen, else replace in place.
///
/// Returns true when an existing entry was replaced.
pub fn upsert_by_id<T: Entity>(entities: &mut Vec<T>, entity: T) -> bool {
    match position_by_id(entities, entity.id()) {
        Some(index) => {
            entities[index] = entity;
            true
        }
        None => {
            entities.push(entity);
            false
        }
    }
}

/// Remove the entity with `id`, returning it
pub fn remove_by_id<T: Entity>(entities: &mut Vec<T>, id: &str) -> Option<T> {
    position_by_id(entities, id).map(|index| entities.remove(index))
}

/// Common result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level errors
///
/// Serializable so a UI shell can forward them unchanged.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum DomainError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DomainError {
    pub fn quote_not_found(quote_id: &str) -> Self {
        DomainError::NotFound(format!("quote {}", quote_id))
    }

    pub fn item_not_found(quote_id: &str, item_id: &str) -> Self {
        DomainError::NotFound(format!("item {} in quote {}", item_id, quote_id))
    }
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::Storage(err.to_string())
    }
}
