//! Time entry schema and its JSON codec.
//!
//! The start time lives in the key, so an [`Entry`] only holds the mutable
//! fields. Unknown fields are kept in [`Entry::data`] so that user metadata
//! survives every read/write cycle, including manual edits.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::key;
use crate::types::{ValidationError, check_reserved};

/// Stored value of one work session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// End of the session; `None` while it is still running.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "optional_stamp")]
    pub end: Option<NaiveDateTime>,

    /// Category label such as a client or project.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Free-text note, possibly spanning several lines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Archived entries are hidden from default listings and reports.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub archive: bool,

    /// Arbitrary extra metadata.
    #[serde(flatten)]
    pub data: BTreeMap<String, Value>,
}

impl Entry {
    /// The type, treating an empty string as no type.
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref().filter(|k| !k.is_empty())
    }

    /// Checks that no extra data key shadows a reserved field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_reserved(self.data.keys())
    }

    /// Compact JSON with sorted keys, as persisted in the store.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&serde_json::to_value(self)?)
    }

    /// Indented JSON with sorted keys, as shown to the user and the editor.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&serde_json::to_value(self)?)
    }

    /// Parses an entry from JSON text.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// JSON value of a field; `null` when unset.
    ///
    /// The start lives in the key, so [`Field::Start`] is always `null` here.
    pub fn field_value(&self, field: &Field) -> Value {
        match field {
            Field::Start => Value::Null,
            Field::End => self
                .end
                .map_or(Value::Null, |end| Value::String(key::format_stamp(end))),
            Field::Type => self.kind.clone().map_or(Value::Null, Value::String),
            Field::Message => self.message.clone().map_or(Value::Null, Value::String),
            Field::Archive => Value::Bool(self.archive),
            Field::Data(name) => self.data.get(name).cloned().unwrap_or(Value::Null),
        }
    }

    /// Replaces a field from a JSON value; `null` clears it.
    pub fn set_field_value(&mut self, field: &Field, value: Value) -> Result<(), ValidationError> {
        let invalid = |expected| ValidationError::InvalidFieldValue {
            field: field.to_string(),
            value: value.to_string(),
            expected,
        };
        match field {
            Field::Start => return Err(invalid("a key rename")),
            Field::End => {
                self.end = match &value {
                    Value::Null => None,
                    Value::String(s) => Some(key::parse_stamp(s).ok_or_else(|| invalid("YYYY-MM-DD HH:MM:SS"))?),
                    _ => return Err(invalid("a stamp string or null")),
                };
            }
            Field::Type | Field::Message => {
                let text = match &value {
                    Value::Null => None,
                    Value::String(s) => Some(s.clone()),
                    _ => return Err(invalid("a string or null")),
                };
                if *field == Field::Type {
                    self.kind = text;
                } else {
                    self.message = text;
                }
            }
            Field::Archive => {
                self.archive = match value {
                    Value::Null => false,
                    Value::Bool(flag) => flag,
                    _ => return Err(invalid("true or false")),
                };
            }
            Field::Data(name) => {
                check_reserved([name])?;
                if value.is_null() {
                    self.data.remove(name);
                } else {
                    self.data.insert(name.clone(), value);
                }
            }
        }
        Ok(())
    }

    /// Appends a line to the message, creating it if absent.
    pub fn append_message(&mut self, line: &str) {
        self.message = Some(match self.message.take() {
            Some(existing) if !existing.is_empty() => format!("{existing}\n{line}"),
            _ => line.to_string(),
        });
    }
}

/// A named field of an entry, as addressed by `set` and `edit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Start,
    End,
    Type,
    Message,
    Archive,
    /// Any other name refers to extra data.
    Data(String),
}

impl FromStr for Field {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "" => return Err(ValidationError::Usage("field name cannot be empty")),
            "start" => Self::Start,
            // `stop` is accepted as a synonym.
            "end" | "stop" => Self::End,
            "type" => Self::Type,
            "message" => Self::Message,
            "archive" => Self::Archive,
            other => Self::Data(other.to_string()),
        })
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::End => "end",
            Self::Type => "type",
            Self::Message => "message",
            Self::Archive => "archive",
            Self::Data(name) => name,
        };
        write!(f, "{name}")
    }
}

/// A primary key together with its decoded entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub key: String,
    pub entry: Entry,
}

impl Row {
    pub const fn new(key: String, entry: Entry) -> Self {
        Self { key, entry }
    }

    /// Start time decoded from the key; `None` for sentinel or malformed keys.
    pub fn start(&self) -> Option<NaiveDateTime> {
        key::decode_key(&self.key).ok().flatten()
    }

    /// Stamp part of the key.
    pub fn stamp(&self) -> &str {
        key::stamp_of(&self.key).unwrap_or(&self.key)
    }

    /// End time, or `now` for a running session.
    pub fn end_or(&self, now: NaiveDateTime) -> NaiveDateTime {
        self.entry.end.unwrap_or(now)
    }

    /// Elapsed time of the session, never negative.
    pub fn elapsed(&self, now: NaiveDateTime) -> Duration {
        self.start()
            .map_or_else(Duration::zero, |start| {
                (self.end_or(now) - start).max(Duration::zero())
            })
    }

    pub const fn is_running(&self) -> bool {
        self.entry.end.is_none()
    }
}

/// Serde adapter storing an optional timestamp as a stamp string.
mod optional_stamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer, de};

    use crate::key;

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_str(&key::format_stamp(*ts)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Some(raw) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };
        NaiveDateTime::parse_from_str(&raw, key::STAMP_FORMAT)
            .map(Some)
            .map_err(|e| de::Error::custom(format!("invalid end {raw:?}: {e}")))
    }
}
