//! CSV export of entries.

use std::io::Write;

use anyhow::Result;
use clap::Args;
use clocker_core::{DateContext, Field, Row, TypeFilter};
use clocker_db::Database;
use serde_json::Value;

use super::util::RangeArgs;
use crate::render::{Columns, csv_quote};

const HEADER: &str = "Key,Date,Start,End,Duration,Archived,Type,Message";

#[derive(Debug, Clone, Args)]
pub struct CsvArgs {
    /// Extra data fields to add as columns, comma separated.
    #[arg(long, value_delimiter = ',')]
    pub props: Vec<String>,

    /// Only entries of this type; `/regex/` matches a pattern.
    #[arg(short = 't', long = "type")]
    pub kind: Option<TypeFilter>,

    /// Include archived entries.
    #[arg(short, long)]
    pub archive: bool,

    #[command(flatten)]
    pub range: RangeArgs,
}

fn prop_value(row: &Row, field: &Field) -> String {
    if *field == Field::Start {
        return row.stamp().to_string();
    }
    match row.entry.field_value(field) {
        Value::Null => String::new(),
        Value::String(text) => text,
        other => other.to_string(),
    }
}

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    args: &CsvArgs,
    dates: &DateContext,
) -> Result<()> {
    let props = args
        .props
        .iter()
        .map(|name| name.parse::<Field>())
        .collect::<Result<Vec<_>, _>>()?;

    let mut header = HEADER.to_string();
    for name in &args.props {
        header.push(',');
        header.push_str(name);
    }
    writeln!(writer, "{header}")?;

    let query = args.range.query(args.kind.as_ref(), args.archive);
    for row in db.query(&query)? {
        let c = Columns::of(&row, dates.now);
        let mut line = format!(
            "{},{},{},{},{},{},{},{}",
            c.unix,
            c.date,
            c.start,
            c.end,
            c.elapsed,
            if row.entry.archive { "A" } else { "" },
            csv_quote(row.entry.kind.as_deref().unwrap_or_default()),
            csv_quote(row.entry.message.as_deref().unwrap_or_default()),
        );
        for prop in &props {
            line.push(',');
            line.push_str(&csv_quote(&prop_value(&row, prop)));
        }
        writeln!(writer, "{line}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use clocker_db::{StartRequest, StopRequest, Target};
    use insta::assert_snapshot;
    use serde_json::json;

    use crate::commands::testing::{dates, output, seed_closed, stamps_replaced, ts};

    fn args() -> CsvArgs {
        CsvArgs {
            props: Vec::new(),
            kind: None,
            archive: false,
            range: RangeArgs::default(),
        }
    }

    fn export(db: &Database, args: &CsvArgs) -> String {
        let mut out = Vec::new();
        run(&mut out, db, args, &dates()).unwrap();
        stamps_replaced(&output(out))
    }

    #[test]
    fn csv_quotes_type_and_message() {
        let mut db = Database::open_in_memory().unwrap();
        db.start(StartRequest {
            kind: Some("client".to_string()),
            message: Some(r#"said "hi", left"#.to_string()),
            at: ts("2024-02-28 09:00:00"),
            ..StartRequest::default()
        })
        .unwrap();
        db.stop(StopRequest {
            target: Target::Latest,
            message: None,
            at: ts("2024-02-28 09:20:00"),
        })
        .unwrap();

        assert_snapshot!(export(&db, &args()), @r#"
        Key,Date,Start,End,Duration,Archived,Type,Message
        [STAMP],2024-02-28,09:00:00,09:20:00,00:20:00,,"client","said ""hi"", left"
        "#);
    }

    #[test]
    fn csv_doubles_quotes_in_type_and_skips_archived_by_default() {
        let mut db = Database::open_in_memory().unwrap();
        db.add(clocker_db::AddRequest {
            start: ts("2024-02-27 09:00:00"),
            end: ts("2024-02-27 09:30:00"),
            kind: Some(r#"client"A""#.to_string()),
            message: Some(r#"the "big" one"#.to_string()),
        })
        .unwrap();
        let hidden = seed_closed(&mut db, "2024-02-28 09:00:00", "2024-02-28 10:00:00", "other");
        db.set_archived(&[hidden], true).unwrap();

        assert_snapshot!(export(&db, &args()), @r#"
        Key,Date,Start,End,Duration,Archived,Type,Message
        [STAMP],2024-02-27,09:00:00,09:30:00,00:30:00,,"client""A""","the ""big"" one"
        "#);
    }

    #[test]
    fn csv_extra_columns_and_archived_rows() {
        let mut db = Database::open_in_memory().unwrap();
        db.start(StartRequest {
            kind: Some("client".to_string()),
            at: ts("2024-03-01 11:00:00"),
            data: [("ticket".to_string(), json!(7))].into(),
            ..StartRequest::default()
        })
        .unwrap();
        let key = seed_closed(&mut db, "2024-02-28 09:00:00", "2024-02-28 10:00:00", "other");
        db.set_archived(&[key], true).unwrap();

        let args = CsvArgs {
            props: vec!["ticket".to_string(), "start".to_string()],
            archive: true,
            ..args()
        };
        assert_snapshot!(export(&db, &args), @r#"
        Key,Date,Start,End,Duration,Archived,Type,Message,ticket,start
        [STAMP],2024-02-28,09:00:00,10:00:00,01:00:00,A,"other","","","2024-02-28 09:00:00"
        [STAMP],2024-03-01,11:00:00,NOW,01:00:00,,"client","","7","2024-03-01 11:00:00"
        "#);
    }
}
