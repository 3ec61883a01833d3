//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::add::AddArgs;
use crate::commands::archive::ArchiveArgs;
use crate::commands::csv::CsvArgs;
use crate::commands::data::DataArgs;
use crate::commands::edit::EditArgs;
use crate::commands::get::GetArgs;
use crate::commands::insert::InsertArgs;
use crate::commands::list::ListArgs;
use crate::commands::report::ReportArgs;
use crate::commands::restart::RestartArgs;
use crate::commands::rm::RmArgs;
use crate::commands::set::SetArgs;
use crate::commands::start::StartArgs;
use crate::commands::stop::StopArgs;

/// Personal time tracker.
///
/// Records work sessions in a local store and reports on them as listings,
/// CSV, JSON or daily summaries.
#[derive(Debug, Parser)]
#[command(name = "clocker", version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging on stderr.
    #[arg(long, global = true)]
    pub debug: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Data directory holding the store.
    #[arg(short = 'd', long, global = true)]
    pub datadir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start a new session.
    Start(StartArgs),

    /// Stop a session (the most recent one by default).
    Stop(StopArgs),

    /// Start a new session with the type and message of an earlier one.
    Restart(RestartArgs),

    /// Show whether a session is running.
    Status,

    /// List entries.
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Print an entry as JSON.
    Get(GetArgs),

    /// Set one field of an entry.
    Set(SetArgs),

    /// Delete entries.
    Rm(RmArgs),

    /// Hide entries from default listings and reports.
    Archive(ArchiveArgs),

    /// Show archived entries again.
    Unarchive(ArchiveArgs),

    /// Record a finished session.
    Add(AddArgs),

    /// Export entries as CSV.
    Csv(CsvArgs),

    /// Export hours per day as JSON.
    Data(DataArgs),

    /// Summarise one day.
    Report(ReportArgs),

    /// Store a blank entry at a key.
    Insert(InsertArgs),

    /// Edit an entry in $EDITOR.
    Edit(EditArgs),
}
