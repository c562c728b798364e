//! `jayamesh` command-line entry point.
//!
//! # Responsibility
//! - Resolve configuration (flags over environment over defaults).
//! - Start logging, open the store, and dispatch one command.
//!
//! Exits non-zero with the error chain when a command fails.

mod cli;
mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use jayamesh_core::{
    init_logging, open_db_with_outcome, seed_if_empty, CoreConfig, MigrationOutcome,
};
use log::{error, info};
use rusqlite::Connection;

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        error!("event=cli_command module=cli status=error error={err:#}");
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(&cli);
    if let Err(err) = init_logging(&config.log_level, &config.log_dir) {
        eprintln!("warning: file logging disabled: {err}");
    }

    if let Commands::Format { file, json } = &cli.command {
        return commands::format(file.as_deref(), *json);
    }

    let mut conn = open_store(&config)?;
    match cli.command {
        Commands::Init => commands::init(&conn),
        Commands::Stats => commands::stats(&conn),
        Commands::Info => commands::info(&conn, &config),
        Commands::Data { action } => commands::data(&mut conn, action),
        Commands::Project { action } => commands::project(&conn, action),
        Commands::Section { action } => commands::section(&conn, action),
        Commands::Goal { action } => commands::goal(&conn, action),
        Commands::Task { action } => commands::task(&conn, action),
        Commands::Note { action } => commands::note(&conn, action),
        Commands::Focus { action } => commands::focus(&conn, action),
        Commands::Format { .. } => Ok(()),
    }
}

fn resolve_config(cli: &Cli) -> CoreConfig {
    let mut config = CoreConfig::from_env();
    if let Some(db) = &cli.db {
        config = config.with_db_path(db);
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(dir) = &cli.log_dir {
        config.log_dir = std::path::absolute(dir).unwrap_or_else(|_| dir.clone());
    }
    config
}

/// Opens the store; a brand-new file receives the sample project.
fn open_store(config: &CoreConfig) -> Result<Connection> {
    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create `{}`", parent.display()))?;
    }
    let (conn, outcome) = open_db_with_outcome(&config.db_path)
        .with_context(|| format!("failed to open `{}`", config.db_path.display()))?;

    match outcome {
        MigrationOutcome::Fresh => {
            if seed_if_empty(&conn)? {
                info!("event=cli_open module=cli status=ok outcome=fresh seeded=true");
            }
        }
        MigrationOutcome::Reset { from_version } => {
            eprintln!("note: store schema v{from_version} was replaced; sample data restored");
        }
        MigrationOutcome::UpToDate => {}
    }
    Ok(conn)
}
