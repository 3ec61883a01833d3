//! Restart command for resuming an earlier kind of work.

use anyhow::Result;
use clap::Args;
use clocker_core::DateContext;
use clocker_db::Database;

use super::util::target;

#[derive(Debug, Clone, Args)]
pub struct RestartArgs {
    /// Entry to copy type and message from; defaults to the most recent one.
    pub key: Option<String>,
}

pub fn run(db: &mut Database, args: &RestartArgs, dates: &DateContext) -> Result<()> {
    let target = target(dates, args.key.as_deref())?;
    let key = db.restart(&target, dates.now)?;
    tracing::info!(%key, "restarted");
    Ok(())
}
