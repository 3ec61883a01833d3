//! Field updates, manual edits, archiving and blank inserts.

use clocker_core::key::{self, DateContext};
use clocker_core::{Entry, Field, ValidationError};
use serde_json::Value;

use crate::entries::{Target, encode_entry, entry_write_ops};
use crate::session::check_order;
use crate::{BatchOp, Database, DbError, Query};

fn parse_flag(field: &Field, value: &str) -> Result<bool, ValidationError> {
    match value.trim() {
        "" | "false" => Ok(false),
        "true" => Ok(true),
        other => Err(ValidationError::InvalidFieldValue {
            field: field.to_string(),
            value: other.to_string(),
            expected: "true or false",
        }),
    }
}

impl Database {
    /// Updates one field from a command-line value and returns the entry's
    /// key afterwards (which differs from the input when `start` changes).
    ///
    /// `start` and `end` take a date expression, or a bare time of day that
    /// keeps the current date. An empty value removes the field.
    pub fn set_field(
        &mut self,
        target: &Target,
        field: &Field,
        value: &str,
        dates: &DateContext,
    ) -> Result<String, DbError> {
        let mut row = self.resolve_target(target)?;
        let start = row.start();

        match field {
            Field::Start => {
                let base = start.unwrap_or(dates.now);
                let new_start = dates.update(base, value)?;
                if let Some(end) = row.entry.end {
                    check_order(new_start, end)?;
                }
                let new_key = key::encode_key(new_start);
                self.rename_entry(&row.key, &new_key)?;
                return Ok(new_key);
            }
            Field::End if value.is_empty() => row.entry.end = None,
            Field::End => {
                let base = row.entry.end.or(start).unwrap_or(dates.now);
                let end = dates.update(base, value)?;
                if let Some(start) = start {
                    check_order(start, end)?;
                }
                row.entry.end = Some(end);
            }
            Field::Archive => row.entry.archive = parse_flag(field, value)?,
            Field::Type | Field::Message | Field::Data(_) => {
                let value = if value.is_empty() {
                    Value::Null
                } else {
                    Value::String(value.to_string())
                };
                row.entry.set_field_value(field, value)?;
            }
        }

        self.write_entry(&row.key, &row.entry)?;
        Ok(row.key)
    }

    /// Replaces a whole entry, e.g. after a manual edit.
    ///
    /// Returns `false` without writing anything when the entry is unchanged.
    pub fn replace_entry(&mut self, key: &str, entry: &Entry) -> Result<bool, DbError> {
        entry.validate()?;
        let previous = self.get_entry(key)?;
        if previous == *entry {
            return Ok(false);
        }
        let ops = entry_write_ops(key, Some(&previous), entry)?;
        self.batch(&ops)?;
        tracing::debug!(key, "replaced entry");
        Ok(true)
    }

    /// Parses edited JSON text and stores it under `key`.
    pub fn replace_entry_text(&mut self, key: &str, text: &str) -> Result<bool, DbError> {
        let entry = Entry::from_json(text).map_err(|source| DbError::Json {
            key: key.to_string(),
            source,
        })?;
        self.replace_entry(key, &entry)
    }

    /// Stores an empty entry under `key`, replacing any previous one.
    pub fn insert_blank(&mut self, key: &str) -> Result<(), DbError> {
        key::decode_key(key)?;
        self.write_entry(key, &Entry::default())
    }

    /// Sets the archive flag on the given entries in one batch.
    pub fn set_archived(&mut self, keys: &[String], archive: bool) -> Result<usize, DbError> {
        let mut ops = Vec::with_capacity(keys.len());
        for key in keys {
            let mut entry = self.get_entry(key)?;
            if entry.archive != archive {
                entry.archive = archive;
                ops.push(BatchOp::put(key, encode_entry(key, &entry)?));
            }
        }
        let changed = ops.len();
        self.batch(&ops)?;
        Ok(changed)
    }

    /// Sets the archive flag on every entry matching `query`.
    ///
    /// All changed rows are written in one batch, so the command either
    /// archives the whole range or nothing.
    pub fn archive_matching(&mut self, query: &Query, archive: bool) -> Result<usize, DbError> {
        let query = Query {
            include_archived: true,
            ..query.clone()
        };
        let mut keys = Vec::new();
        self.visit_query(&query, |row| {
            if row.entry.archive != archive {
                keys.push(row.key);
            }
            Ok(())
        })?;
        self.set_archived(&keys, archive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDateTime;
    use clocker_core::DateDialect;

    use crate::StartRequest;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, key::STAMP_FORMAT).unwrap()
    }

    fn dates() -> DateContext {
        DateContext::new(ts("2024-02-01 12:00:00"), DateDialect::Us)
    }

    fn seeded() -> (Database, String) {
        let mut db = Database::open_in_memory().unwrap();
        let key = db
            .start(StartRequest {
                kind: Some("client".to_string()),
                at: ts("2024-01-10 09:00:00"),
                ..StartRequest::default()
            })
            .unwrap();
        (db, key)
    }

    fn set(db: &mut Database, key: &str, field: &str, value: &str) -> Result<String, DbError> {
        db.set_field(
            &Target::Key(key.to_string()),
            &field.parse().unwrap(),
            value,
            &dates(),
        )
    }

    #[test]
    fn set_end_accepts_time_of_day() {
        let (mut db, key) = seeded();
        set(&mut db, &key, "stop", "17:30").unwrap();
        assert_eq!(db.get_entry(&key).unwrap().end, Some(ts("2024-01-10 17:30:00")));
    }

    #[test]
    fn set_end_before_start_is_rejected() {
        let (mut db, key) = seeded();
        let err = set(&mut db, &key, "end", "08:00").unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
        assert!(db.get_entry(&key).unwrap().end.is_none());
    }

    #[test]
    fn set_start_renames_key_and_index() {
        let (mut db, key) = seeded();
        let new_key = set(&mut db, &key, "start", "08:15").unwrap();
        assert_eq!(new_key, "time!2024-01-10 08:15:00");
        assert!(db.find_entry(&key).unwrap().is_none());
        assert_eq!(
            db.type_index_keys().unwrap(),
            ["time-type!client!2024-01-10 08:15:00"]
        );
    }

    #[test]
    fn set_type_resyncs_index() {
        let (mut db, key) = seeded();
        set(&mut db, &key, "type", "other").unwrap();
        assert_eq!(
            db.type_index_keys().unwrap(),
            ["time-type!other!2024-01-10 09:00:00"]
        );
    }

    #[test]
    fn set_data_and_clear_with_empty_value() {
        let (mut db, key) = seeded();
        set(&mut db, &key, "ticket", "ABC-1").unwrap();
        assert_eq!(
            db.get_entry(&key).unwrap().data.get("ticket"),
            Some(&Value::String("ABC-1".to_string()))
        );
        set(&mut db, &key, "ticket", "").unwrap();
        assert!(db.get_entry(&key).unwrap().data.is_empty());
    }

    #[test]
    fn set_archive_requires_boolean() {
        let (mut db, key) = seeded();
        assert!(set(&mut db, &key, "archive", "maybe").is_err());
        set(&mut db, &key, "archive", "true").unwrap();
        assert!(db.get_entry(&key).unwrap().archive);
    }

    #[test]
    fn set_without_key_uses_latest() {
        let (mut db, key) = seeded();
        db.set_field(&Target::Latest, &Field::Message, "hello", &dates())
            .unwrap();
        assert_eq!(db.get_entry(&key).unwrap().message.as_deref(), Some("hello"));
    }

    #[test]
    fn unchanged_edit_writes_nothing() {
        let (mut db, key) = seeded();
        let text = db.get_entry(&key).unwrap().to_json_pretty().unwrap();
        db.delete("time-type!client!2024-01-10 09:00:00").unwrap();

        assert!(!db.replace_entry_text(&key, &text).unwrap());
        // The index row deleted above is not recreated: no write happened.
        assert!(db.type_index_keys().unwrap().is_empty());
    }

    #[test]
    fn edited_type_resyncs_index() {
        let (mut db, key) = seeded();
        assert!(db
            .replace_entry_text(&key, r#"{"type": "other", "note": 1}"#)
            .unwrap());
        assert_eq!(
            db.type_index_keys().unwrap(),
            ["time-type!other!2024-01-10 09:00:00"]
        );
    }

    #[test]
    fn invalid_edit_leaves_entry_untouched() {
        let (mut db, key) = seeded();
        let before = db.get_entry(&key).unwrap();

        let err = db.replace_entry_text(&key, "{ not json").unwrap_err();
        assert!(matches!(err, DbError::Json { .. }));
        let err = db
            .replace_entry_text(&key, r#"{"type": "x", "start": "2024-01-01 00:00:00"}"#)
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));

        assert_eq!(db.get_entry(&key).unwrap(), before);
    }

    #[test]
    fn insert_blank_entry() {
        let mut db = Database::open_in_memory().unwrap();
        db.insert_blank("time!2024-01-01 00:00:00").unwrap();
        assert_eq!(
            db.get_raw("time!2024-01-01 00:00:00").unwrap().as_deref(),
            Some("{}")
        );
        db.insert_blank(&key::sentinel_key()).unwrap();
        assert!(db.insert_blank("bogus").is_err());
    }

    #[test]
    fn archive_and_unarchive_range() {
        let (mut db, _) = seeded();
        db.start(StartRequest {
            kind: Some("other".to_string()),
            at: ts("2024-01-11 09:00:00"),
            ..StartRequest::default()
        })
        .unwrap();

        let only_client = Query {
            filter: Some("client".parse().unwrap()),
            ..Query::all()
        };
        assert_eq!(db.archive_matching(&only_client, true).unwrap(), 1);
        assert_eq!(db.query(&Query::all()).unwrap().len(), 1);

        assert_eq!(db.archive_matching(&Query::all(), false).unwrap(), 1);
        assert_eq!(db.query(&Query::all()).unwrap().len(), 2);
    }

    #[test]
    fn archive_by_key_fails_on_missing_entry() {
        let (mut db, key) = seeded();
        let err = db
            .set_archived(&[key.clone(), "time!2030-01-01 00:00:00".to_string()], true)
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
        assert!(!db.get_entry(&key).unwrap().archive);
    }
}
