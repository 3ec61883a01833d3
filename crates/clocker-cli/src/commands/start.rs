//! Start command for opening a new session.

use anyhow::Result;
use clap::Args;
use clocker_core::DateContext;
use clocker_db::{Database, StartRequest};

use super::util::{date_or_now, parse_extra_data};

#[derive(Debug, Clone, Args)]
pub struct StartArgs {
    /// Type of work (client, project, ...).
    #[arg(short = 't', long = "type")]
    pub kind: Option<String>,

    /// Message describing the session.
    #[arg(short, long)]
    pub message: Option<String>,

    /// Start time instead of now (e.g. "9am", "yesterday 14:00").
    #[arg(long)]
    pub date: Option<String>,

    /// Extra data after `--`: --key value, --key=value, key=value.
    #[arg(last = true)]
    pub data: Vec<String>,
}

pub fn run(db: &mut Database, args: &StartArgs, dates: &DateContext) -> Result<()> {
    let request = StartRequest {
        kind: args.kind.clone(),
        message: args.message.clone(),
        at: date_or_now(dates, args.date.as_deref())?,
        data: parse_extra_data(&args.data)?,
    };
    let key = db.start(request)?;
    tracing::info!(%key, "started");
    Ok(())
}
