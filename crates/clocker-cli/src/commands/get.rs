//! Get command for printing one stored entry.

use std::io::Write;

use anyhow::Result;
use clap::Args;
use clocker_core::DateContext;
use clocker_db::Database;

use super::util::target;

#[derive(Debug, Clone, Args)]
pub struct GetArgs {
    /// Entry to print; defaults to the most recent one.
    pub key: Option<String>,
}

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    args: &GetArgs,
    dates: &DateContext,
) -> Result<()> {
    let row = db.resolve_target(&target(dates, args.key.as_deref())?)?;
    writeln!(writer, "{}", row.entry.to_json_pretty()?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;

    use crate::commands::testing::{dates, output, seed_closed, seed_running};

    #[test]
    fn get_prints_pretty_json() {
        let mut db = Database::open_in_memory().unwrap();
        seed_closed(&mut db, "2024-02-28 09:00:00", "2024-02-28 10:00:00", "client");
        seed_running(&mut db, "2024-03-01 09:00:00", "other");

        let mut out = Vec::new();
        let args = GetArgs {
            key: Some("2024-02-28 09:00:00".to_string()),
        };
        run(&mut out, &db, &args, &dates()).unwrap();
        assert_snapshot!(output(out), @r#"
        {
          "end": "2024-02-28 10:00:00",
          "type": "client"
        }
        "#);

        let mut out = Vec::new();
        run(&mut out, &db, &GetArgs { key: None }, &dates()).unwrap();
        assert_snapshot!(output(out), @r#"
        {
          "type": "other"
        }
        "#);
    }

    #[test]
    fn get_missing_entry_fails() {
        let db = Database::open_in_memory().unwrap();
        let args = GetArgs {
            key: Some("2024-02-28 09:00:00".to_string()),
        };
        let err = run(&mut Vec::new(), &db, &args, &dates()).unwrap_err();
        assert_eq!(err.to_string(), "entry not found: time!2024-02-28 09:00:00");
    }
}
