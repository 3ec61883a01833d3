//! Add command for recording a finished session after the fact.

use anyhow::{Context, Result};
use clap::Args;
use clocker_core::DateContext;
use clocker_db::{AddRequest, Database};

#[derive(Debug, Clone, Args)]
pub struct AddArgs {
    /// When the session started.
    pub start: String,

    /// When the session ended.
    pub end: String,

    /// Type of work.
    #[arg(short = 't', long = "type")]
    pub kind: Option<String>,

    /// Message describing the session.
    #[arg(short, long)]
    pub message: Option<String>,
}

pub fn run(db: &mut Database, args: &AddArgs, dates: &DateContext) -> Result<()> {
    let start = dates
        .parse(&args.start)
        .with_context(|| format!("invalid start: {}", args.start))?;
    let end = dates
        .parse(&args.end)
        .with_context(|| format!("invalid end: {}", args.end))?;
    let key = db.add(AddRequest {
        start,
        end,
        kind: args.kind.clone(),
        message: args.message.clone(),
    })?;
    tracing::info!(%key, "added");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::commands::testing::{dates, ts};

    fn args(start: &str, end: &str) -> AddArgs {
        AddArgs {
            start: start.to_string(),
            end: end.to_string(),
            kind: Some("client".to_string()),
            message: Some("call".to_string()),
        }
    }

    #[test]
    fn add_records_closed_entry() {
        let mut db = Database::open_in_memory().unwrap();
        run(
            &mut db,
            &args("2024-02-28 09:00:00", "2024-02-28 11:15:00"),
            &dates(),
        )
        .unwrap();

        let entry = db.get_entry("time!2024-02-28 09:00:00").unwrap();
        assert_eq!(entry.end, Some(ts("2024-02-28 11:15:00")));
        assert_eq!(entry.message.as_deref(), Some("call"));
        assert_eq!(
            db.type_index_keys().unwrap(),
            ["time-type!client!2024-02-28 09:00:00"]
        );
    }

    #[test]
    fn add_rejects_end_before_start() {
        let mut db = Database::open_in_memory().unwrap();
        let err = run(
            &mut db,
            &args("2024-02-28 11:00:00", "2024-02-28 09:00:00"),
            &dates(),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "end 2024-02-28 09:00:00 is before start 2024-02-28 11:00:00"
        );
        assert!(db.last_row().unwrap().is_none());
    }

    #[test]
    fn add_rejects_unparseable_dates() {
        let mut db = Database::open_in_memory().unwrap();
        let err = run(&mut db, &args("whenever", "2024-02-28 09:00:00"), &dates()).unwrap_err();
        assert_eq!(err.to_string(), "invalid start: whenever");
    }
}
