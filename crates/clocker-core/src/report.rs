//! Aggregation of entries into daily hours and per-type totals.

use std::collections::BTreeMap;

use chrono::{Days, Duration, NaiveDate, NaiveDateTime};

use crate::entry::Row;

/// Seconds in an hour, for converting durations to decimal hours.
const SECONDS_PER_HOUR: f64 = 3600.0;

/// Formats a duration as zero-padded `HH:MM:SS`; hours are unbounded.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.num_seconds().max(0);
    let hours = total / 3600;
    let minutes = total / 60 % 60;
    let seconds = total % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Splits the interval `[start, end)` at every midnight it crosses.
///
/// Each calendar day touched by the interval gets one `(date, duration)`
/// pair, in chronological order. An empty or inverted interval yields a single
/// zero-length pair for the start date.
pub fn split_by_day(start: NaiveDateTime, end: NaiveDateTime) -> Vec<(NaiveDate, Duration)> {
    let mut parts = Vec::new();
    let mut cursor = start;
    while cursor.date() < end.date() {
        let Some(next_day) = cursor.date().checked_add_days(Days::new(1)) else {
            break;
        };
        let midnight = next_day.and_time(chrono::NaiveTime::MIN);
        parts.push((cursor.date(), midnight - cursor));
        cursor = midnight;
    }
    parts.push((cursor.date(), (end - cursor).max(Duration::zero())));
    parts
}

/// Converts a duration into decimal hours, keeping full precision.
#[expect(
    clippy::cast_precision_loss,
    reason = "session lengths are far below 2^52 seconds"
)]
pub fn hours(duration: Duration) -> f64 {
    duration.num_seconds() as f64 / SECONDS_PER_HOUR
}

/// Rounds decimal hours to two places for display.
pub fn round_hours(hours: f64) -> f64 {
    (hours * 100.0).round() / 100.0
}

/// Totals hours per calendar day, splitting sessions that cross midnight.
///
/// Running sessions count up to `now`. Rows whose key carries no usable start
/// time are skipped.
pub fn aggregate_daily<'a, I>(rows: I, now: NaiveDateTime) -> BTreeMap<NaiveDate, f64>
where
    I: IntoIterator<Item = &'a Row>,
{
    let mut daily: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for row in rows {
        let Some(start) = row.start() else {
            tracing::warn!(key = %row.key, "skipping entry without a start time");
            continue;
        };
        for (date, duration) in split_by_day(start, row.end_or(now)) {
            *daily.entry(date).or_default() += hours(duration);
        }
    }
    daily
}

/// Elapsed time summed per type, plus the grand total.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeTotals {
    /// Keyed by type; entries without a type use the empty string.
    pub by_type: BTreeMap<String, Duration>,
    pub total: Duration,
}

/// Sums elapsed time per type; running sessions count up to `now`.
pub fn aggregate_by_type<'a, I>(rows: I, now: NaiveDateTime) -> TypeTotals
where
    I: IntoIterator<Item = &'a Row>,
{
    let mut totals = TypeTotals::default();
    for row in rows {
        let elapsed = row.elapsed(now);
        let kind = row.entry.kind().unwrap_or_default().to_string();
        let slot = totals.by_type.entry(kind).or_insert_with(Duration::zero);
        *slot += elapsed;
        totals.total += elapsed;
    }
    totals
}
