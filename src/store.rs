// src/store.rs
//! Append-only record store backed by SQLite.
//!
//! Two logical tables share one contract: `news` and `social_posts`. Dedup is
//! the `url` uniqueness constraint (`INSERT OR IGNORE`); the per-ticker
//! watermark is `MAX(published_at)`, recomputed per run rather than stored.

use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use crate::collect::types::Record;

/// A row read back out of the store.
#[derive(Debug, Clone, Serialize)]
pub struct StoredRecord {
    pub ticker: String,
    pub title: String,
    pub content: Option<String>,
    pub url: String,
    pub source: String,
    pub published_at: String,
}

pub struct Store {
    conn: Mutex<Connection>,
    table: &'static str,
}

impl Store {
    pub fn open_news<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open(path, "news")
    }

    pub fn open_social<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open(path, "social_posts")
    }

    pub fn open_news_in_memory() -> Result<Self> {
        Self::from_conn(Connection::open_in_memory()?, "news")
    }

    pub fn open_social_in_memory() -> Result<Self> {
        Self::from_conn(Connection::open_in_memory()?, "social_posts")
    }

    fn open<P: AsRef<Path>>(path: P, table: &'static str) -> Result<Self> {
        if let Some(dir) = path.as_ref().parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("creating {}", dir.display()))?;
            }
        }
        let conn = Connection::open(&path)
            .with_context(|| format!("opening {}", path.as_ref().display()))?;
        Self::from_conn(conn, table)
    }

    fn from_conn(conn: Connection, table: &'static str) -> Result<Self> {
        // Idempotent schema init: create-if-absent, never drop or migrate.
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                ticker TEXT NOT NULL,
                title TEXT NOT NULL,
                content TEXT,
                url TEXT UNIQUE,
                source TEXT,
                published_at TEXT,
                created_at TEXT DEFAULT (datetime('now'))
            );
            CREATE INDEX IF NOT EXISTS idx_{table}_ticker_published
                ON {table}(ticker, published_at);"
        ))
        .with_context(|| format!("initializing schema for {table}"))?;
        Ok(Self {
            conn: Mutex::new(conn),
            table,
        })
    }

    /// Insert-or-ignore on the url constraint. `Ok(true)` is a newly written
    /// row, `Ok(false)` a duplicate url; a real storage failure surfaces as
    /// an error so callers can tell it apart from dedup.
    pub fn insert(&self, record: &Record) -> Result<bool> {
        let conn = self.conn.lock().expect("store mutex poisoned");
        let n = conn.execute(
            &format!(
                "INSERT OR IGNORE INTO {} (ticker, title, content, url, source, published_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                self.table
            ),
            params![
                record.ticker,
                record.title,
                record.content,
                record.url,
                record.source,
                record.published_at,
            ],
        )?;
        Ok(n > 0)
    }

    /// Per-ticker watermark: the latest stored `published_at`, or `None` for
    /// an unseen ticker.
    pub fn latest_published_at(&self, ticker: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().expect("store mutex poisoned");
        let out = conn
            .query_row(
                &format!(
                    "SELECT MAX(published_at) FROM {} WHERE ticker = ?1",
                    self.table
                ),
                params![ticker],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()?;
        Ok(out.flatten())
    }

    /// All records for a ticker with `published_at >= since`, insertion order.
    pub fn query_since(&self, ticker: &str, since: &str) -> Result<Vec<StoredRecord>> {
        let conn = self.conn.lock().expect("store mutex poisoned");
        let mut stmt = conn.prepare(&format!(
            "SELECT ticker, title, content, url, source, published_at
             FROM {} WHERE ticker = ?1 AND published_at >= ?2",
            self.table
        ))?;
        let rows = stmt.query_map(params![ticker, since], |row| {
            Ok(StoredRecord {
                ticker: row.get(0)?,
                title: row.get(1)?,
                content: row.get(2)?,
                url: row.get(3)?,
                source: row.get(4)?,
                published_at: row.get(5)?,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn count(&self, ticker: &str) -> Result<u64> {
        let conn = self.conn.lock().expect("store mutex poisoned");
        let n: u64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {} WHERE ticker = ?1", self.table),
            params![ticker],
            |row| row.get(0),
        )?;
        Ok(n)
    }
}
