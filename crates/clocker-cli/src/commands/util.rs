//! Shared utilities for CLI commands.

use std::collections::BTreeMap;

use anyhow::{Context, Result, bail};
use chrono::NaiveDateTime;
use clap::Args;
use clocker_core::{DateContext, TypeFilter};
use clocker_db::{Query, Target};
use serde_json::{Number, Value};

/// Key range options shared by the listing commands.
#[derive(Debug, Clone, Default, Args)]
pub struct RangeArgs {
    /// Only entries at or after this stamp prefix (e.g. 2024-01).
    #[arg(long)]
    pub gt: Option<String>,

    /// Only entries before this stamp prefix.
    #[arg(long)]
    pub lt: Option<String>,
}

impl RangeArgs {
    /// Builds a query over the range with the given filters.
    pub fn query(&self, filter: Option<&TypeFilter>, include_archived: bool) -> Query {
        Query {
            after: self.gt.clone(),
            before: self.lt.clone(),
            filter: filter.cloned(),
            include_archived,
        }
    }
}

/// Resolves an optional key argument; no argument means the latest entry.
pub fn target(dates: &DateContext, token: Option<&str>) -> Result<Target> {
    token
        .map(|token| resolve_key(dates, token))
        .transpose()
        .map(Target::from_key)
}

/// Resolves a key argument to a primary key.
pub fn resolve_key(dates: &DateContext, token: &str) -> Result<String> {
    dates
        .resolve_key(token)
        .with_context(|| format!("invalid key: {token}"))
}

/// Parses an optional `--date` value, defaulting to now.
pub fn date_or_now(dates: &DateContext, date: Option<&str>) -> Result<NaiveDateTime> {
    match date {
        Some(expr) => dates
            .parse(expr)
            .with_context(|| format!("invalid date: {expr}")),
        None => Ok(dates.now),
    }
}

/// Parses extra entry data given after `--`.
///
/// Supports `--key value`, `--key=value`, `key=value` and bare `--flag`
/// (stored as `true`). A flag takes the next token as its value unless that
/// token starts with `-`, so `--flag key=value` stores `"key=value"` under
/// `flag`. Numeric values are stored as JSON numbers.
pub fn parse_extra_data(args: &[String]) -> Result<BTreeMap<String, Value>> {
    let mut data = BTreeMap::new();
    let mut args = args.iter().peekable();

    while let Some(arg) = args.next() {
        let (name, value) = if let Some(flag) = arg.strip_prefix("--").or_else(|| arg.strip_prefix('-')) {
            if let Some((name, value)) = flag.split_once('=') {
                (name, scalar(value))
            } else if let Some(value) = args.next_if(|next| !next.starts_with('-')) {
                (flag, scalar(value))
            } else {
                (flag, Value::Bool(true))
            }
        } else if let Some((name, value)) = arg.split_once('=') {
            (name, scalar(value))
        } else {
            bail!("unexpected data argument: {arg} (use --key value or key=value)");
        };

        if name.is_empty() {
            bail!("empty data key in argument: {arg}");
        }
        data.insert(name.to_string(), value);
    }

    Ok(data)
}

/// Reads a command-line value as a JSON number when it looks like one.
pub fn scalar(value: &str) -> Value {
    if let Ok(n) = value.parse::<i64>() {
        return Value::Number(n.into());
    }
    value
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map_or_else(|| Value::String(value.to_string()), Value::Number)
}
