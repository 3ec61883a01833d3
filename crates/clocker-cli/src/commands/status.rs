//! Status command for showing whether a session is running.

use std::io::Write;

use anyhow::Result;
use clocker_core::DateContext;
use clocker_db::Database;

pub fn run<W: Write>(writer: &mut W, db: &Database, dates: &DateContext) -> Result<()> {
    let status = db.status(dates.now)?;
    writeln!(writer, "{status}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;

    use crate::commands::testing::{dates, output, seed_running};

    #[test]
    fn status_when_nothing_recorded() {
        let db = Database::open_in_memory().unwrap();
        let mut out = Vec::new();
        run(&mut out, &db, &dates()).unwrap();
        assert_snapshot!(output(out), @"stopped");
    }

    #[test]
    fn status_shows_elapsed_time_of_running_session() {
        let mut db = Database::open_in_memory().unwrap();
        seed_running(&mut db, "2024-02-29 10:58:57", "client");
        let mut out = Vec::new();
        run(&mut out, &db, &dates()).unwrap();
        assert_snapshot!(output(out), @"elapsed time: 25:01:03");
    }
}
