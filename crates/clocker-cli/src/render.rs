//! Text rendering for listings, CSV rows and reports.

use chrono::{NaiveDate, NaiveDateTime};
use clocker_core::key::to_unix;
use clocker_core::{Row, format_elapsed};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";

/// Pieces of a row shared by the list and CSV formats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Columns {
    pub unix: String,
    pub date: String,
    pub start: String,
    pub end: String,
    pub elapsed: String,
}

impl Columns {
    /// Columns for a row; running sessions show `NOW` and count up to `now`.
    pub fn of(row: &Row, now: NaiveDateTime) -> Self {
        let (unix, date, start) = row.start().map_or_else(
            || ("NaN".to_string(), row.stamp().to_string(), "--:--:--".to_string()),
            |start| {
                (
                    to_unix(start).to_string(),
                    start.format(DATE_FORMAT).to_string(),
                    start.format(TIME_FORMAT).to_string(),
                )
            },
        );
        let end = row
            .entry
            .end
            .map_or_else(|| "NOW".to_string(), |end| end.format(TIME_FORMAT).to_string());

        Self {
            unix,
            date,
            start,
            end,
            elapsed: format_elapsed(row.elapsed(now)),
        }
    }
}

/// One listing line, without trailing newline.
pub fn entry_line(row: &Row, now: NaiveDateTime) -> String {
    let c = Columns::of(row, now);
    let mut line = format!(
        "{}  {}  [ {} - {} ]  ({})",
        c.unix, c.date, c.start, c.end, c.elapsed
    );
    if let Some(kind) = row.entry.kind() {
        line.push_str(&format!("  [{kind}]"));
    }
    if row.entry.archive {
        line.push_str(" A");
    }
    line
}

/// A message indented by four spaces and framed by blank lines.
///
/// Every `\n`-separated line is printed, including a trailing empty one.
pub fn message_block(message: &str) -> String {
    let mut block = String::from("\n");
    for line in message.split('\n') {
        block.push_str("    ");
        block.push_str(line);
        block.push('\n');
    }
    block.push('\n');
    block
}

/// Quotes a CSV field, doubling embedded quotes.
pub fn csv_quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Date as shown in report headings, e.g. `5 February 2024`.
pub fn long_date(date: NaiveDate) -> String {
    date.format("%-d %B %Y").to_string()
}

/// Label for a per-type total line.
pub fn type_label(kind: &str) -> &str {
    if kind.is_empty() { "(untyped)" } else { kind }
}
