//! Quote Builder Backend
//!
//! Layered architecture:
//! - domain: Quotes, items, validation and pricing rules
//! - repository: Quote stores (JSON file, SQLite, in-memory)
//! - history: Undo/redo over the collection and the deleted-quote buffer
//! - commands: Actions dispatched by a presentation layer
//! - session, config: Per-user state and how it is set up

use std::path::Path;

pub mod commands;
pub mod config;
pub mod domain;
pub mod history;
pub mod repository;
pub mod session;

pub use config::{AppConfig, StoreBackend};
pub use domain::{DomainError, DomainResult, ItemInput, Quote, QuoteItem};
pub use session::QuoteSession;

/// Name used for log files
pub const APP_NAME: &str = "QuoteBuilder";

/// Install the rolling file logger in the configured log directory.
/// Repeated calls keep the logger that is already installed.
pub fn init_logging(config: &AppConfig) -> DomainResult<()> {
    match rolling_logger::init_logger(config.log_dir(), APP_NAME) {
        Ok(()) => Ok(()),
        Err(rolling_logger::LoggerError::AlreadyInitialized) => {
            log::debug!("Logger already initialized");
            Ok(())
        }
        Err(e) => Err(DomainError::Config(e.to_string())),
    }
}

/// Load configuration (file, then environment), start logging and open a
/// session over the configured store.
pub async fn start(config_path: &Path) -> DomainResult<QuoteSession> {
    let config = AppConfig::load(config_path)?.apply_env()?;
    init_logging(&config)?;

    let session = QuoteSession::open(&config).await.map_err(|e| {
        let _ = rolling_logger::error(&format!("Failed to open quote store: {}", e));
        e
    })?;
    let _ = rolling_logger::info(&format!("Quote store ready ({})", config.backend.as_str()));
    Ok(session)
}
