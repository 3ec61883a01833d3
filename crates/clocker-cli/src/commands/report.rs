//! Report command for one day's entries and totals.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::Days;
use clap::Args;
use clocker_core::{DateContext, aggregate_by_type, format_elapsed};
use clocker_db::{Database, Query};

use crate::render::{entry_line, long_date, message_block, type_label};

const DAY_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Args)]
pub struct ReportArgs {
    /// Day to report on (defaults to today).
    #[arg(long = "reportDay", visible_alias = "report-day")]
    pub report_day: Option<String>,

    /// Show messages below each entry.
    #[arg(short, long)]
    pub verbose: bool,

    /// Include archived entries.
    #[arg(short, long)]
    pub archive: bool,
}

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    args: &ReportArgs,
    dates: &DateContext,
) -> Result<()> {
    let day = match &args.report_day {
        Some(expr) => dates
            .parse(expr)
            .with_context(|| format!("invalid report day: {expr}"))?
            .date(),
        None => dates.now.date(),
    };
    let next = day
        .checked_add_days(Days::new(1))
        .context("report day out of range")?;

    let query = Query {
        after: Some(day.format(DAY_FORMAT).to_string()),
        before: Some(next.format(DAY_FORMAT).to_string()),
        filter: None,
        include_archived: args.archive,
    };
    let rows = db.query(&query)?;

    writeln!(writer, "Report for {}:", long_date(day))?;
    for row in &rows {
        writeln!(writer, "{}", entry_line(row, dates.now))?;
        if args.verbose {
            if let Some(message) = &row.entry.message {
                write!(writer, "{}", message_block(message))?;
            }
        }
    }

    let totals = aggregate_by_type(&rows, dates.now);
    writeln!(writer)?;
    for (kind, elapsed) in &totals.by_type {
        writeln!(writer, "{}: {}", type_label(kind), format_elapsed(*elapsed))?;
    }
    writeln!(writer)?;
    writeln!(writer, "total: {}", format_elapsed(totals.total))?;
    Ok(())
}
