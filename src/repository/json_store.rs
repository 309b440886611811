//! JSON File Quote Store
//!
//! The whole collection lives in one pretty-printed JSON array that is
//! rewritten on every save (temp file + rename, so readers never see a
//! partial write).

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::domain::{remove_by_id, upsert_by_id, DomainError, DomainResult, Quote};
use super::traits::QuoteStore;

/// File-backed implementation of the quote store
pub struct JsonFileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
    revision: AtomicU64,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
            revision: AtomicU64::new(0),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn bump_revision(&self) {
        self.revision.fetch_add(1, Ordering::SeqCst);
    }

    /// Read the collection, initializing a missing file to `[]`.
    ///
    /// A file that cannot be read or parsed is moved aside to
    /// `<name>.corrupt` (or `<name>.corrupt.N` when taken) before the reset,
    /// so its content survives the next write.
    async fn read_all(&self) -> DomainResult<Vec<Quote>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("Quote file {} missing, initializing empty collection", self.path.display());
                self.write_all(&[]).await?;
                return Ok(Vec::new());
            }
            Err(e) => {
                self.set_aside(&format!("unreadable: {}", e)).await?;
                return Ok(Vec::new());
            }
        };

        match serde_json::from_str::<Vec<Quote>>(&content) {
            Ok(quotes) => Ok(quotes),
            Err(e) => {
                self.set_aside(&format!("not a valid quote list: {}", e)).await?;
                Ok(Vec::new())
            }
        }
    }

    /// Move the current file to a free `.corrupt` name and start over empty.
    /// Fails without resetting when the file cannot be moved.
    async fn set_aside(&self, reason: &str) -> DomainResult<()> {
        let aside = self.aside_path().await;
        log::warn!(
            "Quote file {} is {}, moving it to {} and resetting",
            self.path.display(),
            reason,
            aside.display()
        );

        tokio::fs::rename(&self.path, &aside).await.map_err(|e| {
            log::error!("Could not move {} aside: {}", self.path.display(), e);
            DomainError::from(e)
        })?;
        self.write_all(&[]).await
    }

    async fn aside_path(&self) -> PathBuf {
        let first = self.path.with_extension("json.corrupt");
        let mut candidate = first.clone();
        let mut index = 1;
        while tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
            candidate = self.path.with_extension(format!("json.corrupt.{}", index));
            index += 1;
        }
        candidate
    }

    async fn write_all(&self, quotes: &[Quote]) -> DomainResult<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                tokio::fs::create_dir_all(dir).await?;
            }
        }

        let json = serde_json::to_string_pretty(quotes)?;
        let temp_path = self.path.with_extension(format!("json.tmp.{}", std::process::id()));

        let mut file = tokio::fs::File::create(&temp_path).await?;
        file.write_all(json.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&temp_path, &self.path).await?;
        log::debug!("Wrote {} quotes to {}", quotes.len(), self.path.display());
        Ok(())
    }
}

#[async_trait]
impl QuoteStore for JsonFileStore {
    async fn list(&self) -> DomainResult<Vec<Quote>> {
        let _guard = self.write_lock.lock().await;
        self.read_all().await.map_err(|e| {
            log::error!("Error reading quotes from {}: {}", self.path.display(), e);
            e
        })
    }

    async fn get_by_id(&self, quote_id: &str) -> DomainResult<Option<Quote>> {
        let _guard = self.write_lock.lock().await;
        let quotes = self.read_all().await?;
        Ok(quotes.into_iter().find(|quote| quote.quote_id == quote_id))
    }

    async fn save_all(&self, quotes: &[Quote]) -> DomainResult<()> {
        let _guard = self.write_lock.lock().await;
        self.write_all(quotes).await?;
        self.bump_revision();
        Ok(())
    }

    async fn upsert(&self, quote: &Quote) -> DomainResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut quotes = self.read_all().await?;
        upsert_by_id(&mut quotes, quote.clone());
        self.write_all(&quotes).await?;
        self.bump_revision();
        Ok(())
    }

    async fn delete(&self, quote_id: &str) -> DomainResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut quotes = self.read_all().await?;
        if remove_by_id(&mut quotes, quote_id).is_none() {
            return Err(DomainError::quote_not_found(quote_id));
        }
        self.write_all(&quotes).await?;
        self.bump_revision();
        Ok(())
    }

    fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }

    fn backend(&self) -> &'static str {
        "json"
    }
}
