//! Storage layer for clocker.
//!
//! Provides an ordered key-value namespace on top of `rusqlite`, plus the
//! entry-level operations built on it (type index upkeep, sessions, queries).
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization. The CLI owns a single
//! instance for the lifetime of one invocation.
//!
//! # Schema
//!
//! A single table holds every key family:
//!
//! ```text
//! kv(key TEXT PRIMARY KEY, value TEXT NOT NULL) WITHOUT ROWID
//! ```
//!
//! Keys compare with SQLite's BINARY collation, i.e. byte-lexicographically,
//! so range scans behave like those of an embedded ordered store. Values are
//! JSON text (see [`clocker_core::Entry::to_json`]); type index rows store
//! the sentinel `0`.

mod edit;
mod entries;
mod query;
mod session;

use std::path::Path;

use clocker_core::key::{PRIMARY_END, PRIMARY_PREFIX};
use clocker_core::{KeyError, ValidationError};
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

pub use entries::Target;
pub use query::Query;
pub use session::{AddRequest, StartRequest, Status, StopRequest};

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("storage error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// No entry is stored under the key.
    #[error("entry not found: {key}")]
    NotFound { key: String },
    /// The store holds no entries at all.
    #[error("no entries recorded")]
    NoEntries,
    /// The entry already has an end time.
    #[error("entry {key} is already stopped")]
    AlreadyStopped { key: String },
    /// Rejected user input; nothing was written.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// A key or date argument could not be resolved.
    #[error(transparent)]
    Key(#[from] KeyError),
    /// A stored or edited value is not a valid entry.
    #[error("invalid entry JSON for {key}: {source}")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// One write inside an atomic [`Database::batch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
    Put { key: String, value: String },
    Delete { key: String },
}

impl BatchOp {
    pub fn put(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn delete(key: impl Into<String>) -> Self {
        Self::Delete { key: key.into() }
    }

    pub fn key(&self) -> &str {
        match self {
            Self::Put { key, .. } | Self::Delete { key } => key,
        }
    }
}

/// Half-open key interval `[lower, upper)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRange {
    pub lower: String,
    pub upper: String,
}

impl KeyRange {
    pub fn new(lower: impl Into<String>, upper: impl Into<String>) -> Self {
        Self {
            lower: lower.into(),
            upper: upper.into(),
        }
    }

    /// Every primary entry.
    pub fn primary() -> Self {
        Self::new(PRIMARY_PREFIX, PRIMARY_END)
    }

    /// Every key starting with `prefix`.
    pub fn prefix(prefix: &str) -> Self {
        Self::new(prefix, format!("{prefix}~"))
    }
}

/// Options for range scans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOptions {
    pub limit: Option<usize>,
    pub reverse: bool,
}

impl ScanOptions {
    /// The single greatest key of a range.
    pub const fn last() -> Self {
        Self {
            limit: Some(1),
            reverse: true,
        }
    }
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            ) WITHOUT ROWID;
            ",
        )?;
        Ok(())
    }

    /// Reads the raw value stored under a key.
    pub fn get_raw(&self, key: &str) -> Result<Option<String>, DbError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?", [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    /// Writes a single key.
    pub fn put(&mut self, key: &str, value: &str) -> Result<(), DbError> {
        self.batch(&[BatchOp::put(key, value)])
    }

    /// Deletes a single key; deleting a missing key is not an error.
    pub fn delete(&mut self, key: &str) -> Result<(), DbError> {
        self.batch(&[BatchOp::delete(key)])
    }

    /// Applies every operation in one transaction: all of them or none.
    pub fn batch(&mut self, ops: &[BatchOp]) -> Result<(), DbError> {
        if ops.is_empty() {
            return Ok(());
        }
        let tx = self.conn.transaction()?;
        {
            let mut put = tx.prepare(
                "
                INSERT INTO kv (key, value) VALUES (?, ?)
                ON CONFLICT(key) DO UPDATE SET value = excluded.value
                ",
            )?;
            let mut delete = tx.prepare("DELETE FROM kv WHERE key = ?")?;
            for op in ops {
                match op {
                    BatchOp::Put { key, value } => {
                        put.execute(params![key, value])?;
                    }
                    BatchOp::Delete { key } => {
                        delete.execute([key])?;
                    }
                }
            }
        }
        tx.commit()?;
        tracing::debug!(ops = ops.len(), "applied batch");
        Ok(())
    }

    /// Streams the rows of a key range to `visit` in key order.
    ///
    /// Rows are handed over as they are read, so a visitor error stops the
    /// scan without reading the rest of the range.
    pub fn visit_range<F>(
        &self,
        range: &KeyRange,
        options: ScanOptions,
        mut visit: F,
    ) -> Result<(), DbError>
    where
        F: FnMut(String, String) -> Result<(), DbError>,
    {
        let sql = if options.reverse {
            "SELECT key, value FROM kv WHERE key >= ? AND key < ? ORDER BY key DESC LIMIT ?"
        } else {
            "SELECT key, value FROM kv WHERE key >= ? AND key < ? ORDER BY key ASC LIMIT ?"
        };
        // A negative LIMIT means no limit in SQLite.
        let limit = options
            .limit
            .map_or(-1, |n| i64::try_from(n).unwrap_or(i64::MAX));

        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params![range.lower, range.upper, limit])?;
        while let Some(row) = rows.next()? {
            visit(row.get(0)?, row.get(1)?)?;
        }
        Ok(())
    }

    /// Collects the rows of a key range.
    pub fn scan_range(
        &self,
        range: &KeyRange,
        options: ScanOptions,
    ) -> Result<Vec<(String, String)>, DbError> {
        let mut rows = Vec::new();
        self.visit_range(range, options, |key, value| {
            rows.push((key, value));
            Ok(())
        })?;
        Ok(rows)
    }
}
