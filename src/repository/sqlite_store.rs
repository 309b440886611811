//! SQLite Quote Store
//!
//! Row-level implementation: one row per quote, upserted and deleted
//! individually. Row order follows insertion (`rowid`).
//!
//! Rows that no longer decode are moved to `quotes_quarantine` when the
//! table is read, so a later `save_all` cannot erase them.

use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::{DomainError, DomainResult, Quote, QuoteItem};
use super::db::open_db;
use super::traits::QuoteStore;

const SELECT_QUOTES: &str = "SELECT rowid, quote_id, created_date, total_price, items FROM quotes";

/// SQLite implementation of the quote store
pub struct SqliteQuoteStore {
    conn: Arc<Mutex<Connection>>,
    revision: AtomicU64,
}

/// Rowid plus the untyped column values of one `quotes` row
type QuoteRow = (i64, Value, Value, Value, Value);

impl SqliteQuoteStore {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            conn,
            revision: AtomicU64::new(0),
        }
    }

    /// Open the database file (or `:memory:`) and wrap it
    pub fn open(db_path: &Path) -> DomainResult<Self> {
        let conn = open_db(db_path)?;
        Ok(Self::new(Arc::new(Mutex::new(conn))))
    }

    async fn query_all(&self) -> DomainResult<Vec<Quote>> {
        let mut conn = self.conn.lock().await;
        let rows = {
            let mut stmt = conn.prepare(&format!("{} ORDER BY rowid ASC", SELECT_QUOTES))?;
            let rows = stmt
                .query_map([], read_row)?
                .collect::<Result<Vec<QuoteRow>, _>>()?;
            rows
        };

        let mut quotes = Vec::with_capacity(rows.len());
        let mut unreadable = Vec::new();
        for row in rows {
            let rowid = row.0;
            match row_to_quote(row) {
                Ok(quote) => quotes.push(quote),
                Err(e) => unreadable.push((rowid, e.to_string())),
            }
        }

        if !unreadable.is_empty() {
            quarantine(&mut conn, &unreadable)?;
        }
        Ok(quotes)
    }

    fn bump_revision(&self) {
        self.revision.fetch_add(1, Ordering::SeqCst);
    }
}

/// Move rows out of `quotes` into `quotes_quarantine`, keeping their raw values
fn quarantine(conn: &mut Connection, rows: &[(i64, String)]) -> DomainResult<()> {
    let tx = conn.transaction()?;
    for (rowid, reason) in rows {
        log::warn!("Quarantining unreadable quote row {}: {}", rowid, reason);
        tx.execute(
            "INSERT INTO quotes_quarantine (quote_id, created_date, total_price, items, reason, quarantined_at)
             SELECT quote_id, created_date, total_price, items, ?2, strftime('%s', 'now')
             FROM quotes WHERE rowid = ?1",
            params![rowid, reason],
        )?;
        tx.execute("DELETE FROM quotes WHERE rowid = ?1", params![rowid])?;
    }
    tx.commit()?;
    Ok(())
}

#[async_trait]
impl QuoteStore for SqliteQuoteStore {
    async fn list(&self) -> DomainResult<Vec<Quote>> {
        self.query_all().await.map_err(|e| {
            log::error!("Error reading quotes table: {}", e);
            e
        })
    }

    async fn get_by_id(&self, quote_id: &str) -> DomainResult<Option<Quote>> {
        let conn = self.conn.lock().await;
        let row = conn
            .query_row(
                &format!("{} WHERE quote_id = ?1", SELECT_QUOTES),
                params![quote_id],
                read_row,
            )
            .optional()?;

        row.map(row_to_quote).transpose()
    }

    async fn save_all(&self, quotes: &[Quote]) -> DomainResult<()> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM quotes", [])?;
        for quote in quotes {
            insert_or_replace(&tx, quote)?;
        }

        tx.commit()?;
        self.bump_revision();
        log::debug!("Saved {} quotes to table", quotes.len());
        Ok(())
    }

    async fn upsert(&self, quote: &Quote) -> DomainResult<()> {
        let conn = self.conn.lock().await;
        insert_or_replace(&conn, quote)?;
        self.bump_revision();
        Ok(())
    }

    async fn delete(&self, quote_id: &str) -> DomainResult<()> {
        let conn = self.conn.lock().await;
        let affected = conn.execute("DELETE FROM quotes WHERE quote_id = ?1", params![quote_id])?;
        if affected == 0 {
            return Err(DomainError::quote_not_found(quote_id));
        }
        self.bump_revision();
        Ok(())
    }

    fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }

    fn backend(&self) -> &'static str {
        "sqlite"
    }
}

/// Upsert keeps the row's rowid, so an updated quote keeps its position
fn insert_or_replace(conn: &Connection, quote: &Quote) -> DomainResult<()> {
    let items = serde_json::to_string(&quote.items)?;
    conn.execute(
        "INSERT INTO quotes (quote_id, created_date, total_price, items, updated_at)
         VALUES (?1, ?2, ?3, ?4, strftime('%s', 'now'))
         ON CONFLICT(quote_id) DO UPDATE SET
            created_date = excluded.created_date,
            total_price = excluded.total_price,
            items = excluded.items,
            updated_at = excluded.updated_at",
        params![quote.quote_id, quote.created_date.to_string(), quote.total_price, items],
    )?;
    Ok(())
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<QuoteRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
}

/// Convert a database row to Quote
fn row_to_quote((rowid, quote_id, created_date, total_price, items): QuoteRow) -> DomainResult<Quote> {
    let bad = |column: &str, detail: String| DomainError::Storage(format!("row {}: bad {}: {}", rowid, column, detail));

    let quote_id = match quote_id {
        Value::Text(text) => text,
        other => return Err(bad("quote_id", format!("{:?}", other))),
    };
    let created_date = match created_date {
        Value::Text(text) => NaiveDate::parse_from_str(&text, "%Y-%m-%d")
            .map_err(|e| bad("created_date", format!("{:?}: {}", text, e)))?,
        other => return Err(bad("created_date", format!("{:?}", other))),
    };
    let total_price = match total_price {
        Value::Real(value) => value,
        Value::Integer(value) => value as f64,
        other => return Err(bad("total_price", format!("{:?}", other))),
    };
    let items: Vec<QuoteItem> = match items {
        Value::Text(text) => serde_json::from_str(&text).map_err(|e| bad("items", e.to_string()))?,
        other => return Err(bad("items", format!("{:?}", other))),
    };

    Ok(Quote {
        quote_id,
        created_date,
        total_price,
        items,
    })
}
