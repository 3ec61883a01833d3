//! Stop command for closing a running session.

use anyhow::Result;
use clap::Args;
use clocker_core::DateContext;
use clocker_db::{Database, StopRequest};

use super::util::{date_or_now, target};

#[derive(Debug, Clone, Args)]
pub struct StopArgs {
    /// Entry to stop; defaults to the most recent one.
    pub key: Option<String>,

    /// Message appended to the entry.
    #[arg(short, long)]
    pub message: Option<String>,

    /// Stop time instead of now.
    #[arg(long)]
    pub date: Option<String>,
}

pub fn run(db: &mut Database, args: &StopArgs, dates: &DateContext) -> Result<()> {
    let request = StopRequest {
        target: target(dates, args.key.as_deref())?,
        message: args.message.clone(),
        at: date_or_now(dates, args.date.as_deref())?,
    };
    let row = db.stop(request)?;
    tracing::info!(key = %row.key, "stopped");
    Ok(())
}
