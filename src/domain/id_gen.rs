//! Id Generation
//!
//! Quote and item ids come from an injected generator so that rapid
//! successive creations can never collide.

use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

pub trait IdGenerator: Send + Sync {
    fn quote_id(&self) -> String;
    fn item_id(&self) -> String;
}

/// Random v4 UUIDs (default)
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn quote_id(&self) -> String {
        format!("Q-{}", Uuid::new_v4().simple())
    }

    fn item_id(&self) -> String {
        format!("item-{}", Uuid::new_v4().simple())
    }
}

/// Monotonic counter, shared between quote and item ids.
///
/// Deterministic, so useful for tests and for stores that want short ids.
/// Not unique across processes.
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    next: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    fn bump(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed) + 1
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn quote_id(&self) -> String {
        format!("Q{:05}", self.bump())
    }

    fn item_id(&self) -> String {
        format!("item{}", self.bump())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_sequential_ids() {
        let ids = SequentialIdGenerator::new();
        assert_eq!(ids.quote_id(), "Q00001");
        assert_eq!(ids.item_id(), "item2");
        assert_eq!(ids.quote_id(), "Q00003");
    }

    #[test]
    fn test_uuid_ids_do_not_collide() {
        let ids = UuidIdGenerator;
        let generated: HashSet<String> = (0..1000).map(|_| ids.item_id()).collect();
        assert_eq!(generated.len(), 1000);
        assert!(ids.quote_id().starts_with("Q-"));
    }
}
