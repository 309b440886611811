//! Linear undo/redo timeline
//!
//! Holds past/present/future values. A new forward action clears the
//! future; there is no branching. Values are owned copies, so changing a
//! later state never affects an earlier one.

use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq)]
pub struct Timeline<T> {
    past: VecDeque<T>,
    present: T,
    future: VecDeque<T>,
    /// Maximum past entries kept; oldest are evicted first
    limit: Option<usize>,
}

impl<T: Clone> Timeline<T> {
    pub fn new(present: T) -> Self {
        Self::with_limit(present, None)
    }

    pub fn with_limit(present: T, limit: Option<usize>) -> Self {
        Self {
            past: VecDeque::new(),
            present,
            future: VecDeque::new(),
            limit,
        }
    }

    pub fn present(&self) -> &T {
        &self.present
    }

    /// Oldest first
    pub fn past(&self) -> &VecDeque<T> {
        &self.past
    }

    /// Next redo first
    pub fn future(&self) -> &VecDeque<T> {
        &self.future
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// The value `undo` would restore
    pub fn peek_undo(&self) -> Option<&T> {
        self.past.back()
    }

    /// The value `redo` would restore
    pub fn peek_redo(&self) -> Option<&T> {
        self.future.front()
    }

    /// Push the present onto the past and make `next` current.
    /// Any redo history is discarded.
    pub fn record(&mut self, next: T) {
        let previous = std::mem::replace(&mut self.present, next);
        self.push_past(previous);
        self.future.clear();
    }

    /// Step back one state. Returns the new present, or `None` when
    /// there is nothing to undo.
    pub fn undo(&mut self) -> Option<&T> {
        let restored = self.past.pop_back()?;
        let previous = std::mem::replace(&mut self.present, restored);
        self.future.push_front(previous);
        Some(&self.present)
    }

    /// Step forward one state. Returns the new present, or `None` when
    /// there is nothing to redo.
    pub fn redo(&mut self) -> Option<&T> {
        let restored = self.future.pop_front()?;
        let previous = std::mem::replace(&mut self.present, restored);
        self.push_past(previous);
        Some(&self.present)
    }

    /// Replace the present and forget all history
    pub fn reset(&mut self, present: T) {
        self.present = present;
        self.past.clear();
        self.future.clear();
    }

    fn push_past(&mut self, value: T) {
        self.past.push_back(value);
        if let Some(limit) = self.limit {
            while self.past.len() > limit {
                self.past.pop_front();
            }
        }
    }
}
