//! Data command for exporting daily hours as JSON for invoicing.

use std::io::Write;

use anyhow::Result;
use clap::Args;
use clocker_core::report::round_hours;
use clocker_core::{DateContext, TypeFilter, aggregate_daily};
use clocker_db::Database;
use serde_json::{Map, Value, json};

use super::util::{RangeArgs, scalar};

#[derive(Debug, Clone, Args)]
pub struct DataArgs {
    /// Only entries of this type; `/regex/` matches a pattern.
    pub kind: Option<TypeFilter>,

    /// Hourly rate to include in the output.
    pub rate: Option<String>,

    /// Title of the line item.
    #[arg(long, default_value = "consulting")]
    pub title: String,

    /// Include archived entries.
    #[arg(short, long)]
    pub archive: bool,

    #[command(flatten)]
    pub range: RangeArgs,
}

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    args: &DataArgs,
    dates: &DateContext,
) -> Result<()> {
    let query = args.range.query(args.kind.as_ref(), args.archive);
    let rows = db.query(&query)?;

    let hours: Vec<Value> = aggregate_daily(&rows, dates.now)
        .into_iter()
        .map(|(date, hours)| {
            json!({
                "date": date.format("%Y-%m-%d").to_string(),
                "hours": round_hours(hours),
            })
        })
        .collect();

    let mut item = Map::new();
    item.insert("hours".to_string(), Value::Array(hours));
    if let Some(rate) = &args.rate {
        item.insert("rate".to_string(), scalar(rate));
    }
    item.insert("title".to_string(), Value::String(args.title.clone()));

    let document = Value::Array(vec![Value::Object(item)]);
    writeln!(writer, "{}", serde_json::to_string_pretty(&document)?)?;
    Ok(())
}
