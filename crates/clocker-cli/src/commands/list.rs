//! List command for printing entries in key order.

use std::io::Write;

use anyhow::Result;
use clap::Args;
use clocker_core::{DateContext, TypeFilter};
use clocker_db::Database;
use serde_json::json;

use super::util::RangeArgs;
use crate::render::{entry_line, message_block};

#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    /// Only entries of this type; `/regex/` matches a pattern.
    #[arg(short = 't', long = "type")]
    pub kind: Option<TypeFilter>,

    /// Include archived entries.
    #[arg(short, long)]
    pub archive: bool,

    /// Show messages below each entry.
    #[arg(short, long)]
    pub verbose: bool,

    /// Print stored key/value pairs as JSON lines.
    #[arg(long)]
    pub raw: bool,

    #[command(flatten)]
    pub range: RangeArgs,
}

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    args: &ListArgs,
    dates: &DateContext,
) -> Result<()> {
    let query = args.range.query(args.kind.as_ref(), args.archive);
    for row in db.query(&query)? {
        if args.raw {
            let value = serde_json::to_value(&row.entry)?;
            let line = json!({ "key": row.key, "value": value });
            writeln!(writer, "{line}")?;
            continue;
        }
        writeln!(writer, "{}", entry_line(&row, dates.now))?;
        if args.verbose {
            if let Some(message) = &row.entry.message {
                write!(writer, "{}", message_block(message))?;
            }
        }
    }
    Ok(())
}
