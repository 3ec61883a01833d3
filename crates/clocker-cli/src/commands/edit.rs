//! Edit command for changing an entry in an external editor.
//!
//! Without a field the whole entry is edited as pretty JSON; with a field
//! only that field's JSON value is. Unchanged text writes nothing.

use std::io::Write;
use std::process::Command;

use anyhow::{Context, Result, bail};
use clap::Args;
use clocker_core::key::stamp_of;
use clocker_core::{DateContext, Field};
use clocker_db::{Database, Target};
use serde_json::Value;

use super::util::resolve_key;

#[derive(Debug, Clone, Args)]
pub struct EditArgs {
    /// Entry to edit.
    pub stamp: String,

    /// Single field to edit instead of the whole entry.
    pub field: Option<String>,
}

/// Lets the user change a piece of text.
pub trait Editor {
    fn edit(&self, text: &str) -> Result<String>;
}

/// Runs an editor command on a temporary file.
#[derive(Debug, Clone)]
pub struct ExternalEditor {
    command: String,
}

impl ExternalEditor {
    pub const fn new(command: String) -> Self {
        Self { command }
    }
}

impl Editor for ExternalEditor {
    fn edit(&self, text: &str) -> Result<String> {
        let mut file = tempfile::Builder::new()
            .prefix("clocker-")
            .suffix(".json")
            .tempfile()
            .context("failed to create temporary file")?;
        file.write_all(text.as_bytes())?;
        file.flush()?;

        let mut words = self.command.split_whitespace();
        let program = words.next().context("editor command is empty")?;
        let status = Command::new(program)
            .args(words)
            .arg(file.path())
            .status()
            .with_context(|| format!("failed to launch editor: {}", self.command))?;
        if !status.success() {
            bail!("non-zero exit code from $EDITOR");
        }

        std::fs::read_to_string(file.path()).context("failed to read edited file")
    }
}

pub fn run(
    db: &mut Database,
    args: &EditArgs,
    dates: &DateContext,
    editor: &dyn Editor,
) -> Result<()> {
    let key = resolve_key(dates, &args.stamp)?;
    let mut entry = db.get_entry(&key)?;

    let Some(field) = args.field.as_deref() else {
        let edited = editor.edit(&entry.to_json_pretty()?)?;
        if db.replace_entry_text(&key, &edited)? {
            tracing::info!(%key, "entry updated");
        }
        return Ok(());
    };

    let field: Field = field.parse()?;
    let current = match field {
        Field::Start => Value::String(stamp_of(&key).unwrap_or(&key).to_string()),
        _ => entry.field_value(&field),
    };
    let edited = editor.edit(&serde_json::to_string_pretty(&current)?)?;
    let value: Value = serde_json::from_str(&edited).context("error parsing json")?;
    if value == current {
        return Ok(());
    }

    if field == Field::Start {
        let Value::String(stamp) = value else {
            bail!("start must be a date string");
        };
        let new_key = db.set_field(&Target::Key(key), &field, &stamp, dates)?;
        tracing::info!(key = %new_key, "entry moved");
        return Ok(());
    }

    entry.set_field_value(&field, value)?;
    db.replace_entry(&key, &entry)?;
    tracing::info!(%key, %field, "field updated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::RefCell;

    use serde_json::json;

    use crate::commands::testing::{dates, seed_closed, ts};

    /// Records what it was shown and answers with a fixed reply.
    struct ScriptedEditor {
        reply: String,
        shown: RefCell<Option<String>>,
    }

    impl ScriptedEditor {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                shown: RefCell::new(None),
            }
        }

        fn shown(&self) -> String {
            self.shown.borrow().clone().unwrap()
        }
    }

    impl Editor for ScriptedEditor {
        fn edit(&self, text: &str) -> Result<String> {
            *self.shown.borrow_mut() = Some(text.to_string());
            Ok(self.reply.clone())
        }
    }

    fn args(field: Option<&str>) -> EditArgs {
        EditArgs {
            stamp: "2024-02-28 09:00:00".to_string(),
            field: field.map(str::to_string),
        }
    }

    fn seeded() -> (Database, String) {
        let mut db = Database::open_in_memory().unwrap();
        let key = seed_closed(&mut db, "2024-02-28 09:00:00", "2024-02-28 10:00:00", "client");
        (db, key)
    }

    #[test]
    fn edit_whole_entry() {
        let (mut db, key) = seeded();
        let editor = ScriptedEditor::new(r#"{"end": "2024-02-28 11:00:00", "type": "other", "po": 9}"#);

        run(&mut db, &args(None), &dates(), &editor).unwrap();
        assert_eq!(
            editor.shown(),
            "{\n  \"end\": \"2024-02-28 10:00:00\",\n  \"type\": \"client\"\n}"
        );

        let entry = db.get_entry(&key).unwrap();
        assert_eq!(entry.end, Some(ts("2024-02-28 11:00:00")));
        assert_eq!(entry.data["po"], json!(9));
        assert_eq!(
            db.type_index_keys().unwrap(),
            ["time-type!other!2024-02-28 09:00:00"]
        );
    }

    #[test]
    fn edit_single_field() {
        let (mut db, key) = seeded();
        let editor = ScriptedEditor::new("\"multi\\nline\"\n");

        run(&mut db, &args(Some("message")), &dates(), &editor).unwrap();
        assert_eq!(editor.shown(), "null");
        assert_eq!(
            db.get_entry(&key).unwrap().message.as_deref(),
            Some("multi\nline")
        );
    }

    #[test]
    fn edit_start_moves_entry() {
        let (mut db, key) = seeded();
        let editor = ScriptedEditor::new("\"2024-02-28 08:00:00\"");

        run(&mut db, &args(Some("start")), &dates(), &editor).unwrap();
        assert_eq!(editor.shown(), "\"2024-02-28 09:00:00\"");
        assert!(db.find_entry(&key).unwrap().is_none());
        assert!(db.find_entry("time!2024-02-28 08:00:00").unwrap().is_some());
    }

    #[test]
    fn invalid_json_leaves_entry_untouched() {
        let (mut db, key) = seeded();
        let before = db.get_entry(&key).unwrap();

        let editor = ScriptedEditor::new("{ oops");
        assert!(run(&mut db, &args(None), &dates(), &editor).is_err());
        let err = run(&mut db, &args(Some("type")), &dates(), &editor).unwrap_err();
        assert_eq!(err.to_string(), "error parsing json");

        assert_eq!(db.get_entry(&key).unwrap(), before);
    }

    #[test]
    fn failing_external_editor_is_reported() {
        let editor = ExternalEditor::new("false".to_string());
        let err = editor.edit("{}").unwrap_err();
        assert_eq!(err.to_string(), "non-zero exit code from $EDITOR");
    }

    #[test]
    fn external_editor_returns_file_contents() {
        let editor = ExternalEditor::new("true".to_string());
        assert_eq!(editor.edit("{\"a\": 1}").unwrap(), "{\"a\": 1}");
    }
}
