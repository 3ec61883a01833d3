//! Insert command for creating a blank entry at a given key.

use anyhow::Result;
use clap::Args;
use clocker_core::DateContext;
use clocker_db::Database;

use super::util::resolve_key;

#[derive(Debug, Clone, Args)]
pub struct InsertArgs {
    /// Key of the new entry; `NaN` stores the invalid-date entry.
    pub key: String,
}

pub fn run(db: &mut Database, args: &InsertArgs, dates: &DateContext) -> Result<()> {
    let key = resolve_key(dates, &args.key)?;
    db.insert_blank(&key)?;
    tracing::info!(%key, "inserted blank entry");
    Ok(())
}
