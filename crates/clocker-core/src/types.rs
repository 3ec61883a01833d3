//! Validation errors and type filters.

use std::fmt;
use std::str::FromStr;

use regex::Regex;
use thiserror::Error;

/// Field names that may not be used as extra entry data.
pub const RESERVED_DATA_KEYS: [&str; 4] = ["start", "end", "type", "message"];

/// Validation errors for user supplied values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A session was started without a type.
    #[error("Empty type specified")]
    EmptyType,

    /// Extra data used one of the reserved field names.
    #[error("Reserved data key specified: {key}")]
    ReservedKey { key: String },

    /// A `/pattern/` type filter is not a valid regular expression.
    #[error("invalid type pattern {pattern}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A field value could not be interpreted.
    #[error("invalid value for {field}: {value:?} (expected {expected})")]
    InvalidFieldValue {
        field: String,
        value: String,
        expected: &'static str,
    },

    /// A closed session ends before it starts.
    #[error("end {end} is before start {start}")]
    EndBeforeStart { start: String, end: String },

    /// A command was called with the wrong shape of arguments.
    #[error("usage: {0}")]
    Usage(&'static str),
}

/// Rejects any reserved field name among extra data keys.
pub fn check_reserved<'a>(keys: impl IntoIterator<Item = &'a String>) -> Result<(), ValidationError> {
    for key in keys {
        if RESERVED_DATA_KEYS.contains(&key.as_str()) {
            return Err(ValidationError::ReservedKey { key: key.clone() });
        }
    }
    Ok(())
}

/// Filter on the entry type: either an exact string or a `/regex/`.
#[derive(Debug, Clone)]
pub enum TypeFilter {
    Exact(String),
    Pattern(Regex),
}

impl TypeFilter {
    /// Tests an entry type against the filter.
    ///
    /// A missing type is matched as the empty string.
    pub fn matches(&self, kind: Option<&str>) -> bool {
        let kind = kind.unwrap_or_default();
        match self {
            Self::Exact(expected) => kind == expected,
            Self::Pattern(re) => re.is_match(kind),
        }
    }

    /// The exact type, when the filter is not a pattern.
    pub fn exact(&self) -> Option<&str> {
        match self {
            Self::Exact(kind) => Some(kind),
            Self::Pattern(_) => None,
        }
    }
}

impl FromStr for TypeFilter {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = s
            .strip_prefix('/')
            .and_then(|rest| rest.strip_suffix('/'));
        match inner {
            Some(pattern) => Regex::new(pattern).map(Self::Pattern).map_err(|e| {
                ValidationError::InvalidPattern {
                    pattern: s.to_string(),
                    reason: e.to_string(),
                }
            }),
            None => Ok(Self::Exact(s.to_string())),
        }
    }
}

impl fmt::Display for TypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(kind) => write!(f, "{kind}"),
            Self::Pattern(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_filter_matches_prefix() {
        let filter: TypeFilter = "/^cli/".parse().unwrap();
        assert!(filter.matches(Some("client")));
        assert!(filter.matches(Some("clicker")));
        assert!(!filter.matches(Some("other")));
        assert!(!filter.matches(None));
        assert_eq!(filter.exact(), None);
    }

    #[test]
    fn exact_filter_requires_equality() {
        let filter: TypeFilter = "client".parse().unwrap();
        assert!(filter.matches(Some("client")));
        assert!(!filter.matches(Some("clients")));
        assert_eq!(filter.exact(), Some("client"));
    }

    #[test]
    fn single_slash_is_an_exact_type() {
        let filter: TypeFilter = "/".parse().unwrap();
        assert_eq!(filter.exact(), Some("/"));
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let err = "/([/".parse::<TypeFilter>().unwrap_err();
        assert!(matches!(err, ValidationError::InvalidPattern { .. }));
    }

    #[test]
    fn reserved_keys_are_rejected() {
        for reserved in RESERVED_DATA_KEYS {
            let keys = vec!["foo".to_string(), reserved.to_string()];
            assert_eq!(
                check_reserved(&keys),
                Err(ValidationError::ReservedKey {
                    key: reserved.to_string()
                })
            );
        }
        assert!(check_reserved(&vec!["archive".to_string()]).is_ok());
    }
}
