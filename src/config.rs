//! Application Configuration
//!
//! Read from an optional JSON file; every field has a default. A couple of
//! environment variables override the file for deployment.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::domain::{DomainError, DomainResult, NameMatch, ValidationRules};
use crate::repository::IN_MEMORY;

/// Overrides `data_dir`
pub const DATA_DIR_ENV: &str = "QUOTE_BUILDER_DATA_DIR";
/// Overrides `backend` (`json`, `sqlite` or `memory`)
pub const BACKEND_ENV: &str = "QUOTE_BUILDER_BACKEND";

/// Which quote store a session persists to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Whole-collection JSON document
    #[default]
    Json,
    /// One row per quote
    Sqlite,
    /// Nothing persisted beyond the process
    Memory,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Json => "json",
            StoreBackend::Sqlite => "sqlite",
            StoreBackend::Memory => "memory",
        }
    }
}

impl FromStr for StoreBackend {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(StoreBackend::Json),
            "sqlite" => Ok(StoreBackend::Sqlite),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(DomainError::Config(format!("unknown store backend {:?}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding `quotes.json` / `quotes.db`
    pub data_dir: PathBuf,
    pub backend: StoreBackend,
    /// How long a deleted quote can be restored
    pub undo_window_ms: u64,
    pub name_match: NameMatch,
    pub require_description: bool,
    /// Max undo steps kept; unbounded when absent
    pub history_limit: Option<usize>,
    /// Defaults to `<data_dir>/logs`
    pub log_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            backend: StoreBackend::Json,
            undo_window_ms: 5000,
            name_match: NameMatch::CaseSensitive,
            require_description: true,
            history_limit: None,
            log_dir: None,
        }
    }
}

impl AppConfig {
    /// Load from a JSON file; a missing file yields the defaults.
    pub fn load(path: &Path) -> DomainResult<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(DomainError::Config(format!("{}: {}", path.display(), e))),
        };

        serde_json::from_str(&content).map_err(|e| DomainError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Apply overrides from the process environment
    pub fn apply_env(self) -> DomainResult<Self> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup (the environment in production)
    pub fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> DomainResult<Self> {
        if let Some(dir) = lookup(DATA_DIR_ENV).filter(|value| !value.is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(backend) = lookup(BACKEND_ENV).filter(|value| !value.is_empty()) {
            self.backend = backend.parse()?;
        }
        Ok(self)
    }

    /// Location of the backing store for the configured backend
    pub fn store_path(&self) -> PathBuf {
        match self.backend {
            StoreBackend::Json => self.data_dir.join("quotes.json"),
            StoreBackend::Sqlite => self.data_dir.join("quotes.db"),
            StoreBackend::Memory => PathBuf::from(IN_MEMORY),
        }
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(|| self.data_dir.join("logs"))
    }

    pub fn undo_window(&self) -> Duration {
        Duration::from_millis(self.undo_window_ms)
    }

    pub fn validation_rules(&self) -> ValidationRules {
        ValidationRules {
            name_match: self.name_match,
            require_description: self.require_description,
        }
    }
}
