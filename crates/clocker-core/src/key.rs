//! Composite key codec for the ordered store.
//!
//! Two key families share one namespace:
//!
//! - `time!<stamp>`: primary entries, one per session start
//! - `time-type!<type>!<stamp>`: secondary index rows used for scans by type
//!
//! A stamp is the local wall-clock start time formatted as
//! `YYYY-MM-DD HH:MM:SS`. The fixed-width, zero-padded form keeps
//! lexicographic key order equal to chronological order.

use chrono::{
    DateTime, Duration, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone,
    Timelike,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix of the primary key family.
pub const PRIMARY_PREFIX: &str = "time!";

/// Exclusive upper bound of the primary key family.
///
/// `~` sorts after every character a stamp can contain.
pub const PRIMARY_END: &str = "time!~";

/// Prefix of the secondary type index family.
pub const TYPE_INDEX_PREFIX: &str = "time-type!";

/// Payload stored under every type index key.
pub const TYPE_INDEX_SENTINEL: &str = "0";

/// Stamp format shared by keys and stored `end` values.
pub const STAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Stamp written for a key that was requested with `NaN`.
pub const INVALID_STAMP: &str = "Invalid Date";

/// Errors raised while building or reading keys and date expressions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// The key does not belong to the primary family or has a malformed stamp.
    #[error("malformed key: {key}")]
    Malformed { key: String },

    /// A date expression could not be understood.
    #[error("could not parse date {input:?}: {reason}")]
    Unparseable { input: String, reason: String },

    /// A unix timestamp outside of the representable range.
    #[error("timestamp out of range: {input}")]
    OutOfRange { input: String },

    /// An empty date expression or key argument.
    #[error("empty date expression")]
    Empty,
}

/// Dialect used to read ambiguous natural-language dates such as `03/04`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateDialect {
    #[default]
    Us,
    Uk,
}

impl From<DateDialect> for chrono_english::Dialect {
    fn from(value: DateDialect) -> Self {
        match value {
            DateDialect::Us => Self::Us,
            DateDialect::Uk => Self::Uk,
        }
    }
}

/// Reference point for resolving relative date expressions and key arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateContext {
    pub now: NaiveDateTime,
    pub dialect: DateDialect,
}

impl DateContext {
    pub fn new(now: NaiveDateTime, dialect: DateDialect) -> Self {
        Self {
            now: truncate(now),
            dialect,
        }
    }

    /// Context anchored at the current local time.
    pub fn current(dialect: DateDialect) -> Self {
        Self::new(Local::now().naive_local(), dialect)
    }

    /// See [`parse_date`].
    pub fn parse(&self, expr: &str) -> Result<NaiveDateTime, KeyError> {
        parse_date(expr, self.now, self.dialect)
    }

    /// See [`resolve_key_argument`].
    pub fn resolve_key(&self, token: &str) -> Result<String, KeyError> {
        resolve_key_argument(token, self.now, self.dialect)
    }

    /// Parses a value for an existing timestamp field.
    ///
    /// A bare time of day (`17:30`, `17:30:15`) keeps the date of `base`;
    /// anything else goes through [`parse_date`].
    pub fn update(&self, base: NaiveDateTime, value: &str) -> Result<NaiveDateTime, KeyError> {
        let value = value.trim();
        for format in ["%H:%M:%S", "%H:%M"] {
            if let Ok(time) = NaiveTime::parse_from_str(value, format) {
                return Ok(base.date().and_time(time));
            }
        }
        self.parse(value)
    }
}

/// Drops sub-second precision.
pub fn truncate(ts: NaiveDateTime) -> NaiveDateTime {
    ts.with_nanosecond(0).unwrap_or(ts)
}

/// Formats a timestamp as a stamp.
pub fn format_stamp(ts: NaiveDateTime) -> String {
    ts.format(STAMP_FORMAT).to_string()
}

/// Parses a stamp, accepting only the canonical zero-padded form.
pub fn parse_stamp(stamp: &str) -> Option<NaiveDateTime> {
    let ts = NaiveDateTime::parse_from_str(stamp, STAMP_FORMAT).ok()?;
    (format_stamp(ts) == stamp).then_some(ts)
}

/// Builds the primary key for a start time.
pub fn encode_key(ts: NaiveDateTime) -> String {
    format!("{PRIMARY_PREFIX}{}", format_stamp(ts))
}

/// Returns the stamp part of a primary key.
pub fn stamp_of(key: &str) -> Option<&str> {
    key.strip_prefix(PRIMARY_PREFIX)
}

/// Reads the start time back out of a primary key.
///
/// Returns `Ok(None)` for the invalid-date sentinel.
pub fn decode_key(key: &str) -> Result<Option<NaiveDateTime>, KeyError> {
    let malformed = || KeyError::Malformed {
        key: key.to_string(),
    };
    let stamp = stamp_of(key).ok_or_else(malformed)?;
    if stamp == INVALID_STAMP {
        return Ok(None);
    }
    parse_stamp(stamp).map(Some).ok_or_else(malformed)
}

/// Primary key of the invalid-date sentinel.
pub fn sentinel_key() -> String {
    format!("{PRIMARY_PREFIX}{INVALID_STAMP}")
}

/// Builds the type index key for an entry.
pub fn type_index_key(kind: &str, stamp: &str) -> String {
    format!("{TYPE_INDEX_PREFIX}{kind}!{stamp}")
}

/// Common prefix of every index row for one type.
pub fn type_index_prefix(kind: &str) -> String {
    format!("{TYPE_INDEX_PREFIX}{kind}!")
}

/// Resolves a user supplied key argument to a primary key.
///
/// Accepted forms, in order:
/// - `NaN`, resolving to the invalid-date sentinel
/// - an all-digit token, always read as unix epoch seconds
/// - a raw key (`time!2024-01-01 10:00:00`) or bare stamp
/// - a free-text date expression (`yesterday 5pm`)
pub fn resolve_key_argument(
    token: &str,
    now: NaiveDateTime,
    dialect: DateDialect,
) -> Result<String, KeyError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(KeyError::Empty);
    }
    if token == "NaN" {
        return Ok(sentinel_key());
    }
    if is_unix_seconds(token) {
        return unix_token(token).map(encode_key);
    }

    let stamp = stamp_of(token).unwrap_or(token);
    if stamp == INVALID_STAMP {
        return Ok(sentinel_key());
    }
    if let Some(ts) = parse_stamp(stamp) {
        return Ok(encode_key(ts));
    }

    parse_date(stamp, now, dialect).map(encode_key)
}

/// Parses a date expression into a second-precision local timestamp.
///
/// Tries unix seconds, the stamp format, RFC 3339, a bare `YYYY-MM-DD`
/// date and finally natural language relative to `now`.
pub fn parse_date(
    expr: &str,
    now: NaiveDateTime,
    dialect: DateDialect,
) -> Result<NaiveDateTime, KeyError> {
    let expr = expr.trim();
    if expr.is_empty() {
        return Err(KeyError::Empty);
    }
    if is_unix_seconds(expr) {
        return unix_token(expr);
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(expr, STAMP_FORMAT) {
        return Ok(ts);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(expr) {
        return Ok(truncate(dt.with_timezone(&Local).naive_local()));
    }
    if let Ok(date) = NaiveDate::parse_from_str(expr, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN));
    }

    chrono_english::parse_date_string(expr, to_local(now), dialect.into())
        .map(|dt| truncate(dt.naive_local()))
        .map_err(|e| KeyError::Unparseable {
            input: expr.to_string(),
            reason: e.to_string(),
        })
}

/// Converts a local wall-clock time to unix epoch seconds.
pub fn to_unix(ts: NaiveDateTime) -> i64 {
    to_local(ts).timestamp()
}

/// Converts unix epoch seconds to a local wall-clock time.
pub fn from_unix(secs: i64) -> Option<NaiveDateTime> {
    match Local.timestamp_opt(secs, 0) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Some(dt.naive_local()),
        LocalResult::None => None,
    }
}

/// Attaches the local offset to a wall-clock time.
///
/// Ambiguous times (DST fall-back) take the earlier instant; times inside a
/// spring-forward gap are shifted past the gap.
fn to_local(ts: NaiveDateTime) -> DateTime<Local> {
    match Local.from_local_datetime(&ts) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt,
        LocalResult::None => Local
            .from_local_datetime(&(ts + Duration::hours(1)))
            .earliest()
            .unwrap_or_else(|| Local.from_utc_datetime(&ts)),
    }
}

fn is_unix_seconds(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

fn unix_token(token: &str) -> Result<NaiveDateTime, KeyError> {
    let out_of_range = || KeyError::OutOfRange {
        input: token.to_string(),
    };
    let secs: i64 = token.parse().map_err(|_| out_of_range())?;
    from_unix(secs).ok_or_else(out_of_range)
}
