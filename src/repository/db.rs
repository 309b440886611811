//! Database Connection and Setup
//!
//! Opens the SQLite database and creates the quote table.

use rusqlite::Connection;
use std::path::Path;

use crate::domain::{DomainError, DomainResult};

/// Path value that selects a private in-memory database
pub const IN_MEMORY: &str = ":memory:";

impl From<rusqlite::Error> for DomainError {
    fn from(err: rusqlite::Error) -> Self {
        DomainError::Storage(err.to_string())
    }
}

/// Open (or create) the database at `db_path` and run migrations
pub fn open_db(db_path: &Path) -> DomainResult<Connection> {
    let conn = if db_path == Path::new(IN_MEMORY) {
        Connection::open_in_memory()?
    } else {
        if let Some(dir) = db_path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }
        Connection::open(db_path)?
    };

    run_migrations(&conn)?;
    log::info!("Opened quote database at {}", db_path.display());
    Ok(conn)
}

/// Run database migrations
fn run_migrations(conn: &Connection) -> DomainResult<()> {
    // Items are kept as a JSON array column so their order survives as-is
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS quotes (
            quote_id TEXT PRIMARY KEY,
            created_date TEXT NOT NULL,
            total_price REAL NOT NULL DEFAULT 0,
            items TEXT NOT NULL DEFAULT '[]',
            updated_at INTEGER
        );
        CREATE TABLE IF NOT EXISTS quotes_quarantine (
            quote_id,
            created_date,
            total_price,
            items,
            reason TEXT NOT NULL,
            quarantined_at INTEGER
        );",
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = open_db(Path::new(IN_MEMORY)).unwrap();
        run_migrations(&conn).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM quotes", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_open_creates_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("quotes.db");
        open_db(&path).unwrap();
        assert!(path.exists());
    }
}
