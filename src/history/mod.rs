//! History Layer
//!
//! Reversible operations over the quote collection:
//! - timeline: generic past/present/future stacks
//! - quote_history: timeline persisted through a quote store
//! - undo_buffer: timed single-slot buffer for deleted quotes

mod quote_history;
mod timeline;
mod undo_buffer;

pub use quote_history::{HistoryStatus, QuoteHistory, Snapshot};
pub use timeline::Timeline;
pub use undo_buffer::{DeleteUndoBuffer, DEFAULT_UNDO_WINDOW};
