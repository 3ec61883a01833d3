//! Remove command for deleting entries.

use anyhow::Result;
use clap::Args;
use clocker_core::DateContext;
use clocker_db::Database;

use super::util::resolve_key;

#[derive(Debug, Clone, Args)]
pub struct RmArgs {
    /// Entries to delete (stamps, unix seconds or date expressions).
    #[arg(required = true)]
    pub keys: Vec<String>,
}

pub fn run(db: &mut Database, args: &RmArgs, dates: &DateContext) -> Result<()> {
    let keys = args
        .keys
        .iter()
        .map(|token| resolve_key(dates, token))
        .collect::<Result<Vec<_>>>()?;
    let removed = db.remove_entries(&keys)?;
    tracing::info!(removed, "removed entries");
    Ok(())
}
