//! Opening the store under an exclusive process lock.

use std::fs::{self, File, OpenOptions};
use std::path::Path;

use anyhow::{Context, Result};
use clocker_db::Database;
use fs2::FileExt;

use crate::config::DATABASE_FILE;

/// Name of the lock file in the data directory.
pub const LOCK_FILE: &str = "LOCK";

/// An open database owned by this process until dropped.
pub struct Store {
    pub db: Database,
    // Held for the lock; released when the file closes.
    _lock: File,
}

impl Store {
    /// Creates the data directory if needed, locks it and opens the database.
    ///
    /// Fails immediately when another process holds the lock.
    pub fn open(data_dir: &Path) -> Result<Self> {
        fs::create_dir_all(data_dir)
            .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

        let lock_path = data_dir.join(LOCK_FILE);
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .with_context(|| format!("failed to open {}", lock_path.display()))?;
        lock.try_lock_exclusive()
            .with_context(|| format!("store is locked: {}", lock_path.display()))?;
        tracing::debug!(path = %lock_path.display(), "acquired store lock");

        let db_path = data_dir.join(DATABASE_FILE);
        let db = Database::open(&db_path)
            .with_context(|| format!("failed to open {}", db_path.display()))?;

        Ok(Self { db, _lock: lock })
    }
}
