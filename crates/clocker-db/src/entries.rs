//! Typed entry access and secondary type index upkeep.
//!
//! Every write that changes an entry's type or key goes through
//! [`entry_write_ops`] so the primary row and its `time-type!` row are
//! updated in the same batch.

use clocker_core::key::{self, PRIMARY_PREFIX, TYPE_INDEX_SENTINEL};
use clocker_core::{Entry, Row};

use crate::{BatchOp, Database, DbError, KeyRange, ScanOptions};

/// Which entry an operation applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// The most recent entry by key order.
    Latest,
    /// An explicit primary key.
    Key(String),
}

impl Target {
    pub fn from_key(key: Option<String>) -> Self {
        key.map_or(Self::Latest, Self::Key)
    }
}

pub(crate) fn decode_entry(key: &str, value: &str) -> Result<Entry, DbError> {
    Entry::from_json(value).map_err(|source| DbError::Json {
        key: key.to_string(),
        source,
    })
}

pub(crate) fn encode_entry(key: &str, entry: &Entry) -> Result<String, DbError> {
    entry.to_json().map_err(|source| DbError::Json {
        key: key.to_string(),
        source,
    })
}

fn index_key(kind: &str, primary_key: &str) -> String {
    key::type_index_key(kind, key::stamp_of(primary_key).unwrap_or(primary_key))
}

/// Operations writing `entry` under `key`, replacing `previous`.
///
/// The index row moves only when the type actually changes, so rewriting an
/// entry with the same type touches nothing but the primary row.
pub(crate) fn entry_write_ops(
    key: &str,
    previous: Option<&Entry>,
    entry: &Entry,
) -> Result<Vec<BatchOp>, DbError> {
    let mut ops = Vec::with_capacity(3);
    let old_kind = previous.and_then(Entry::kind);
    let new_kind = entry.kind();
    if old_kind != new_kind {
        if let Some(old) = old_kind {
            ops.push(BatchOp::delete(index_key(old, key)));
        }
        if let Some(new) = new_kind {
            ops.push(BatchOp::put(index_key(new, key), TYPE_INDEX_SENTINEL));
        }
    }
    ops.push(BatchOp::put(key, encode_entry(key, entry)?));
    Ok(ops)
}

/// Operations removing the entry under `key` and its index row.
pub(crate) fn entry_delete_ops(key: &str, entry: &Entry) -> Vec<BatchOp> {
    let mut ops = vec![BatchOp::delete(key)];
    if let Some(kind) = entry.kind() {
        ops.push(BatchOp::delete(index_key(kind, key)));
    }
    ops
}

impl Database {
    /// Reads the entry under a primary key, if any.
    pub fn find_entry(&self, key: &str) -> Result<Option<Entry>, DbError> {
        self.get_raw(key)?
            .map(|value| decode_entry(key, &value))
            .transpose()
    }

    /// Reads the entry under a primary key.
    pub fn get_entry(&self, key: &str) -> Result<Entry, DbError> {
        self.find_entry(key)?.ok_or_else(|| DbError::NotFound {
            key: key.to_string(),
        })
    }

    /// The most recent dated entry.
    ///
    /// Dated stamps begin with a digit, so the `Invalid Date` sentinel sorts
    /// after all of them and is left out of the range.
    pub fn last_row(&self) -> Result<Option<Row>, DbError> {
        let mut last = None;
        let dated = KeyRange::new(PRIMARY_PREFIX, format!("{PRIMARY_PREFIX}:"));
        self.visit_range(&dated, ScanOptions::last(), |key, value| {
            let entry = decode_entry(&key, &value)?;
            last = Some(Row::new(key, entry));
            Ok(())
        })?;
        Ok(last)
    }

    /// Loads the row an operation applies to.
    pub fn resolve_target(&self, target: &Target) -> Result<Row, DbError> {
        match target {
            Target::Latest => self.last_row()?.ok_or(DbError::NoEntries),
            Target::Key(key) => {
                let entry = self.get_entry(key)?;
                Ok(Row::new(key.clone(), entry))
            }
        }
    }

    /// Writes an entry, replacing whatever is stored under the key and keeping
    /// the type index in sync.
    pub fn write_entry(&mut self, key: &str, entry: &Entry) -> Result<(), DbError> {
        entry.validate()?;
        let previous = self.find_entry(key)?;
        let ops = entry_write_ops(key, previous.as_ref(), entry)?;
        self.batch(&ops)?;
        tracing::debug!(key, kind = ?entry.kind(), "wrote entry");
        Ok(())
    }

    /// Moves an entry to a new key, carrying its index row along.
    ///
    /// An entry already stored under `new_key` is replaced.
    pub fn rename_entry(&mut self, old_key: &str, new_key: &str) -> Result<(), DbError> {
        let entry = self.get_entry(old_key)?;
        if old_key == new_key {
            return Ok(());
        }
        let displaced = self.find_entry(new_key)?;

        let mut ops = entry_delete_ops(old_key, &entry);
        ops.extend(entry_write_ops(new_key, displaced.as_ref(), &entry)?);
        self.batch(&ops)?;
        tracing::debug!(old_key, new_key, "renamed entry");
        Ok(())
    }

    /// Deletes entries and their index rows in one batch.
    ///
    /// Every key is checked first; a missing key aborts with nothing deleted.
    pub fn remove_entries(&mut self, keys: &[String]) -> Result<usize, DbError> {
        let mut ops = Vec::new();
        for key in keys {
            let entry = self.get_entry(key)?;
            ops.extend(entry_delete_ops(key, &entry));
        }
        self.batch(&ops)?;
        tracing::debug!(count = keys.len(), "removed entries");
        Ok(keys.len())
    }

    /// Lists the keys of every type index row, in key order.
    pub fn type_index_keys(&self) -> Result<Vec<String>, DbError> {
        let rows = self.scan_range(
            &KeyRange::prefix(key::TYPE_INDEX_PREFIX),
            ScanOptions::default(),
        )?;
        Ok(rows.into_iter().map(|(key, _)| key).collect())
    }
}
