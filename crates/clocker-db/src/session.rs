//! Session lifecycle: start, stop, restart, status, add.
//!
//! A session is running while the most recent entry has no `end`. Starting a
//! new session never closes the previous one; overlapping entries are allowed.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Duration, NaiveDateTime};
use clocker_core::key::{self, encode_key};
use clocker_core::{Entry, Row, ValidationError, check_reserved, format_elapsed};
use serde_json::Value;

use crate::entries::Target;
use crate::{Database, DbError};

/// Arguments of [`Database::start`].
#[derive(Debug, Clone, Default)]
pub struct StartRequest {
    pub kind: Option<String>,
    pub message: Option<String>,
    pub at: NaiveDateTime,
    pub data: BTreeMap<String, Value>,
}

/// Arguments of [`Database::stop`].
#[derive(Debug, Clone)]
pub struct StopRequest {
    pub target: Target,
    pub message: Option<String>,
    pub at: NaiveDateTime,
}

/// Arguments of [`Database::add`].
#[derive(Debug, Clone)]
pub struct AddRequest {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub kind: Option<String>,
    pub message: Option<String>,
}

/// State of the most recent entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Stopped,
    Running { key: String, elapsed: Duration },
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stopped => write!(f, "stopped"),
            Self::Running { elapsed, .. } => {
                write!(f, "elapsed time: {}", format_elapsed(*elapsed))
            }
        }
    }
}

fn require_type(kind: Option<String>) -> Result<String, ValidationError> {
    kind.filter(|k| !k.trim().is_empty())
        .ok_or(ValidationError::EmptyType)
}

pub(crate) fn check_order(start: NaiveDateTime, end: NaiveDateTime) -> Result<(), ValidationError> {
    if end < start {
        return Err(ValidationError::EndBeforeStart {
            start: key::format_stamp(start),
            end: key::format_stamp(end),
        });
    }
    Ok(())
}

fn non_empty(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.is_empty())
}

impl Database {
    /// Records a new running session and returns its key.
    ///
    /// Validation happens before any write: a missing type or a reserved
    /// data key leaves the store untouched.
    pub fn start(&mut self, request: StartRequest) -> Result<String, DbError> {
        let kind = require_type(request.kind)?;
        check_reserved(request.data.keys())?;

        let key = encode_key(key::truncate(request.at));
        let entry = Entry {
            kind: Some(kind),
            message: non_empty(request.message),
            data: request.data,
            ..Entry::default()
        };
        self.write_entry(&key, &entry)?;
        tracing::debug!(%key, "started session");
        Ok(key)
    }

    /// Closes a session and returns the updated row.
    ///
    /// A message is appended below any existing one. Stopping an entry that
    /// already has an end fails with [`DbError::AlreadyStopped`].
    pub fn stop(&mut self, request: StopRequest) -> Result<Row, DbError> {
        let mut row = self.resolve_target(&request.target)?;
        if row.entry.end.is_some() {
            return Err(DbError::AlreadyStopped { key: row.key });
        }

        let at = key::truncate(request.at);
        if let Some(start) = row.start() {
            check_order(start, at)?;
        }

        if let Some(message) = non_empty(request.message) {
            row.entry.append_message(&message);
        }
        row.entry.end = Some(at);
        self.write_entry(&row.key, &row.entry)?;
        tracing::debug!(key = %row.key, "stopped session");
        Ok(row)
    }

    /// Starts a fresh session with the type and message of an earlier one.
    pub fn restart(&mut self, target: &Target, at: NaiveDateTime) -> Result<String, DbError> {
        let row = self.resolve_target(target)?;
        self.start(StartRequest {
            kind: row.entry.kind,
            message: row.entry.message,
            at,
            data: BTreeMap::new(),
        })
    }

    /// Reports whether the most recent entry is still running.
    pub fn status(&self, now: NaiveDateTime) -> Result<Status, DbError> {
        let Some(row) = self.last_row()? else {
            return Ok(Status::Stopped);
        };
        if !row.is_running() {
            return Ok(Status::Stopped);
        }
        if row.start().is_none() {
            tracing::warn!(key = %row.key, "latest entry has no start time");
            return Ok(Status::Stopped);
        }
        let elapsed = row.elapsed(now);
        Ok(Status::Running {
            key: row.key,
            elapsed,
        })
    }

    /// Records a closed session after the fact.
    pub fn add(&mut self, request: AddRequest) -> Result<String, DbError> {
        let kind = require_type(request.kind)?;
        let start = key::truncate(request.start);
        let end = key::truncate(request.end);
        check_order(start, end)?;

        let key = encode_key(start);
        let entry = Entry {
            end: Some(end),
            kind: Some(kind),
            message: non_empty(request.message),
            ..Entry::default()
        };
        self.write_entry(&key, &entry)?;
        Ok(key)
    }
}
