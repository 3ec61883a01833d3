//! Core domain logic for clocker.
//!
//! This crate contains the storage-independent pieces:
//! - Key codec: composite `time!` and `time-type!` keys, date expressions
//! - Entry schema: the JSON value stored per session
//! - Report aggregation: hours per day and elapsed time per type

mod entry;
pub mod key;
pub mod report;
mod types;

pub use entry::{Entry, Field, Row};
pub use key::{DateContext, DateDialect, KeyError};
pub use report::{TypeTotals, aggregate_by_type, aggregate_daily, format_elapsed};
pub use types::{RESERVED_DATA_KEYS, TypeFilter, ValidationError, check_reserved};
