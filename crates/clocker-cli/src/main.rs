use std::io::Write;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clocker_core::DateContext;
use tracing_subscriber::EnvFilter;

use clocker_cli::commands::edit::ExternalEditor;
use clocker_cli::commands::{
    add, archive, csv, data, edit, get, insert, list, report, restart, rm, set, start, status, stop,
};
use clocker_cli::{Cli, Commands, Config, Store};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr; stdout carries command output only.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config = Config::load_from(cli.config.as_deref())
        .context("failed to load configuration")?
        .with_data_dir(cli.datadir.clone());
    tracing::debug!(?config, "loaded configuration");

    let mut store = Store::open(&config.data_dir)?;
    let db = &mut store.db;
    let dates = DateContext::current(config.date_dialect);
    let mut out = std::io::stdout().lock();

    match command {
        Commands::Start(args) => start::run(db, args, &dates)?,
        Commands::Stop(args) => stop::run(db, args, &dates)?,
        Commands::Restart(args) => restart::run(db, args, &dates)?,
        Commands::Status => status::run(&mut out, db, &dates)?,
        Commands::List(args) => list::run(&mut out, db, args, &dates)?,
        Commands::Get(args) => get::run(&mut out, db, args, &dates)?,
        Commands::Set(args) => set::run(db, args, &dates)?,
        Commands::Rm(args) => rm::run(db, args, &dates)?,
        Commands::Archive(args) => archive::run(db, args, true, &dates)?,
        Commands::Unarchive(args) => archive::run(db, args, false, &dates)?,
        Commands::Add(args) => add::run(db, args, &dates)?,
        Commands::Csv(args) => csv::run(&mut out, db, args, &dates)?,
        Commands::Data(args) => data::run(&mut out, db, args, &dates)?,
        Commands::Report(args) => report::run(&mut out, db, args, &dates)?,
        Commands::Insert(args) => insert::run(db, args, &dates)?,
        Commands::Edit(args) => {
            let editor = ExternalEditor::new(config.editor_command());
            edit::run(db, args, &dates, &editor)?;
        }
    }

    out.flush()?;
    Ok(())
}
