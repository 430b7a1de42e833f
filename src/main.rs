mod cli;
mod commands;
mod config;
mod detail;
mod logging;
mod model;
mod storage;
mod ui;

use anyhow::Result;
use clap::Parser;
use logging::LogTarget;
use tracing::debug;

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let command = args.command.unwrap_or(cli::Command::Tui);
    let config = config::Config::load()?;

    let target = match command {
        cli::Command::Tui => LogTarget::File(logging::default_log_file()?),
        _ => LogTarget::Stderr,
    };
    logging::init(target, &config.log_filter)?;
    debug!(?command, "dispatching");

    match command {
        cli::Command::Init { name } => commands::init(name),
        cli::Command::List { collection, width } => commands::list(&config, collection, width),
        cli::Command::Add {
            message,
            collection,
            parent,
            kind,
        } => commands::add(message, collection, parent, kind),
        cli::Command::Complete { entry_id } => commands::complete(entry_id),
        cli::Command::Strike { entry_id } => commands::strike(entry_id),
        cli::Command::Lock { entry_id } => commands::lock(entry_id),
        cli::Command::Edit { entry_id, message } => commands::edit(entry_id, message),
        cli::Command::Move {
            entry_id,
            collection,
        } => commands::move_entry(entry_id, collection),
        cli::Command::Delete { entry_id } => commands::delete(entry_id),
        cli::Command::Tui => commands::tui(config),
    }
}
