//! Archive and unarchive commands.
//!
//! Explicit keys are changed as given; without keys every entry matching the
//! type filter and range is changed in a single batch.

use anyhow::Result;
use clap::Args;
use clocker_core::{DateContext, TypeFilter};
use clocker_db::Database;

use super::util::{RangeArgs, resolve_key};

#[derive(Debug, Clone, Args)]
pub struct ArchiveArgs {
    /// Entries to change; when empty, the filters select them.
    pub keys: Vec<String>,

    /// Only entries of this type; `/regex/` matches a pattern.
    #[arg(short = 't', long = "type")]
    pub kind: Option<TypeFilter>,

    #[command(flatten)]
    pub range: RangeArgs,
}

pub fn run(db: &mut Database, args: &ArchiveArgs, archive: bool, dates: &DateContext) -> Result<()> {
    let changed = if args.keys.is_empty() {
        db.archive_matching(&args.range.query(args.kind.as_ref(), true), archive)?
    } else {
        let keys = args
            .keys
            .iter()
            .map(|token| resolve_key(dates, token))
            .collect::<Result<Vec<_>>>()?;
        db.set_archived(&keys, archive)?
    };
    tracing::info!(changed, archive, "updated archive flags");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use clocker_db::Query;

    use crate::commands::testing::{dates, seed_closed};

    fn seeded() -> Database {
        let mut db = Database::open_in_memory().unwrap();
        seed_closed(&mut db, "2024-01-30 09:00:00", "2024-01-30 10:00:00", "a");
        seed_closed(&mut db, "2024-02-01 09:00:00", "2024-02-01 10:00:00", "a");
        seed_closed(&mut db, "2024-02-02 09:00:00", "2024-02-02 10:00:00", "b");
        db
    }

    fn visible(db: &Database) -> Vec<String> {
        db.query(&Query::all())
            .unwrap()
            .into_iter()
            .map(|row| row.stamp().to_string())
            .collect()
    }

    fn args() -> ArchiveArgs {
        ArchiveArgs {
            keys: Vec::new(),
            kind: None,
            range: RangeArgs::default(),
        }
    }

    #[test]
    fn archive_range_then_unarchive() {
        let mut db = seeded();
        let range = ArchiveArgs {
            range: RangeArgs {
                gt: None,
                lt: Some("2024-02".to_string()),
            },
            ..args()
        };
        run(&mut db, &range, true, &dates()).unwrap();
        assert_eq!(visible(&db), ["2024-02-01 09:00:00", "2024-02-02 09:00:00"]);

        run(&mut db, &args(), false, &dates()).unwrap();
        assert_eq!(visible(&db).len(), 3);
    }

    #[test]
    fn archive_by_type() {
        let mut db = seeded();
        let by_type = ArchiveArgs {
            kind: Some("a".parse().unwrap()),
            ..args()
        };
        run(&mut db, &by_type, true, &dates()).unwrap();
        assert_eq!(visible(&db), ["2024-02-02 09:00:00"]);
    }

    #[test]
    fn archive_explicit_keys() {
        let mut db = seeded();
        let by_key = ArchiveArgs {
            keys: vec!["2024-02-02 09:00:00".to_string()],
            ..args()
        };
        run(&mut db, &by_key, true, &dates()).unwrap();
        assert!(db.get_entry("time!2024-02-02 09:00:00").unwrap().archive);
        assert_eq!(visible(&db).len(), 2);
    }
}
