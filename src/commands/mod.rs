//! Commands Layer
//!
//! Actions the presentation layer dispatches against a session. Each one
//! validates, reconciles totals and records the resulting collection in
//! history; the store is written before in-memory state changes.

mod item_cmd;
mod quote_cmd;


pub use item_cmd::*;
pub use quote_cmd::*;
