//! Range queries over the primary index.
//!
//! An exact type filter walks the `time-type!` index and reads back each
//! primary row; every other query scans the primary range directly.

use clocker_core::key::{self, PRIMARY_PREFIX};
use clocker_core::{Entry, Row, TypeFilter};

use crate::entries::decode_entry;
use crate::{Database, DbError, KeyRange, ScanOptions};

/// Filters applied to a range of entries.
///
/// `after` and `before` are stamp fragments (`2024-01`, `2024-01-15 12`)
/// bounding the half-open key interval `[time!after, time!before)`.
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub after: Option<String>,
    pub before: Option<String>,
    pub filter: Option<TypeFilter>,
    pub include_archived: bool,
}

impl Query {
    /// The whole primary namespace.
    pub fn all() -> Self {
        Self::default()
    }

    /// Primary key range covered by the query.
    pub fn range(&self) -> KeyRange {
        KeyRange::new(
            format!("{PRIMARY_PREFIX}{}", self.after.as_deref().unwrap_or_default()),
            format!("{PRIMARY_PREFIX}{}", self.before.as_deref().unwrap_or("~")),
        )
    }

    /// The type filter in effect; an empty exact type filters nothing.
    pub fn type_filter(&self) -> Option<&TypeFilter> {
        self.filter
            .as_ref()
            .filter(|filter| filter.exact() != Some(""))
    }

    /// Checks the type and archive filters against an entry.
    pub fn matches(&self, entry: &Entry) -> bool {
        if entry.archive && !self.include_archived {
            return false;
        }
        self.type_filter()
            .is_none_or(|filter| filter.matches(entry.kind.as_deref()))
    }

    fn index_range(&self, kind: &str) -> KeyRange {
        let prefix = key::type_index_prefix(kind);
        KeyRange::new(
            format!("{prefix}{}", self.after.as_deref().unwrap_or_default()),
            format!("{prefix}{}", self.before.as_deref().unwrap_or("~")),
        )
    }
}

impl Database {
    /// Streams matching rows to `visit` in key order.
    pub fn visit_query<F>(&self, query: &Query, mut visit: F) -> Result<(), DbError>
    where
        F: FnMut(Row) -> Result<(), DbError>,
    {
        if let Some(kind) = query.type_filter().and_then(TypeFilter::exact) {
            return self.visit_type_index(query, kind, visit);
        }
        self.visit_range(&query.range(), ScanOptions::default(), |key, value| {
            let entry = decode_entry(&key, &value)?;
            if query.matches(&entry) {
                visit(Row::new(key, entry))?;
            }
            Ok(())
        })
    }

    /// Collects matching rows in key order.
    pub fn query(&self, query: &Query) -> Result<Vec<Row>, DbError> {
        let mut rows = Vec::new();
        self.visit_query(query, |row| {
            rows.push(row);
            Ok(())
        })?;
        Ok(rows)
    }

    fn visit_type_index<F>(&self, query: &Query, kind: &str, mut visit: F) -> Result<(), DbError>
    where
        F: FnMut(Row) -> Result<(), DbError>,
    {
        let prefix = key::type_index_prefix(kind);
        let index_rows = self.scan_range(&query.index_range(kind), ScanOptions::default())?;
        for (index_key, _) in index_rows {
            // A type containing `!` shares this prefix; its rows do not
            // continue with a stamp and are skipped here.
            let Some(stamp) = index_key.strip_prefix(&prefix) else {
                continue;
            };
            if key::parse_stamp(stamp).is_none() && stamp != key::INVALID_STAMP {
                continue;
            }
            let primary = format!("{PRIMARY_PREFIX}{stamp}");
            let Some(entry) = self.find_entry(&primary)? else {
                tracing::warn!(%index_key, "type index row without entry");
                continue;
            };
            if query.matches(&entry) {
                visit(Row::new(primary, entry))?;
            }
        }
        Ok(())
    }
}
