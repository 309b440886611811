//! Quote Session
//!
//! Everything one logical user works with: the store, the undo/redo
//! history over the quote collection, the deleted-quote buffer, the id
//! generator and the validation rules. Sessions share nothing with each
//! other.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::config::{AppConfig, StoreBackend};
use crate::domain::{DomainResult, IdGenerator, UuidIdGenerator, ValidationRules};
use crate::history::{DeleteUndoBuffer, QuoteHistory};
use crate::repository::{InMemoryQuoteStore, JsonFileStore, QuoteStore, SqliteQuoteStore};

pub struct QuoteSession {
    store: Arc<dyn QuoteStore>,
    history: Mutex<QuoteHistory>,
    undo_buffer: DeleteUndoBuffer,
    ids: Arc<dyn IdGenerator>,
    rules: ValidationRules,
}

impl QuoteSession {
    /// Open the store named by `config` and load its quotes
    pub async fn open(config: &AppConfig) -> DomainResult<Self> {
        let store: Arc<dyn QuoteStore> = match config.backend {
            StoreBackend::Json => Arc::new(JsonFileStore::new(config.store_path())),
            StoreBackend::Sqlite => Arc::new(SqliteQuoteStore::open(&config.store_path())?),
            StoreBackend::Memory => Arc::new(InMemoryQuoteStore::new()),
        };
        log::info!("Opening {} quote store at {}", store.backend(), config.store_path().display());

        Self::with_store(
            store,
            Arc::new(UuidIdGenerator),
            config.validation_rules(),
            config.undo_window(),
            config.history_limit,
        )
        .await
    }

    pub async fn with_store(
        store: Arc<dyn QuoteStore>,
        ids: Arc<dyn IdGenerator>,
        rules: ValidationRules,
        undo_window: Duration,
        history_limit: Option<usize>,
    ) -> DomainResult<Self> {
        let history = QuoteHistory::load(Arc::clone(&store), history_limit).await?;

        Ok(Self {
            store,
            history: Mutex::new(history),
            undo_buffer: DeleteUndoBuffer::new(undo_window),
            ids,
            rules,
        })
    }

    pub fn store(&self) -> &Arc<dyn QuoteStore> {
        &self.store
    }

    pub fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    pub(crate) fn ids(&self) -> &dyn IdGenerator {
        self.ids.as_ref()
    }

    pub(crate) fn history(&self) -> &Mutex<QuoteHistory> {
        &self.history
    }

    pub(crate) fn undo_buffer(&self) -> &DeleteUndoBuffer {
        &self.undo_buffer
    }
}
