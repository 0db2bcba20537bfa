//! Pomodesk - a terminal pomodoro desk.
//!
//! Focus/break timer with a daily task list, a notes pad and per-day focus
//! statistics, all stored in a local SQLite database.

use std::sync::mpsc;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

mod app;
mod cli;
mod clock;
mod commands;
mod event;
mod logging;
mod models;
mod notes;
mod notifications;
mod persistence;
mod quotes;
mod scheduler;
mod share;
mod tasks;
mod timer;
mod tui;
mod ui;
mod year;

use app::App;
use cli::{Cli, Commands};
use clock::SystemClock;
use persistence::{default_data_dir, Database};
use scheduler::ThreadScheduler;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let data_dir = cli.data_dir.unwrap_or_else(default_data_dir);
    let interactive = matches!(cli.command, None | Some(Commands::Tui));
    if let Err(e) = logging::enable_logging(&data_dir, cli.verbose && !interactive) {
        if !interactive {
            return Err(e);
        }
        eprintln!("pomodesk: logging disabled: {e:#}");
    }

    // The timer still runs when the data directory is unusable; commands need it.
    let db = if interactive {
        Database::open_or_in_memory(&data_dir)?
    } else {
        Database::open_in(&data_dir)
            .with_context(|| format!("failed to open database in {}", data_dir.display()))?
    };

    // Channel for ticks from the scheduler thread
    let (tx, rx) = mpsc::channel();
    let mut app = App::new(db, ThreadScheduler::new(tx), Arc::new(SystemClock));
    info!(data_dir = %data_dir.display(), "started");

    let output = match cli.command {
        None | Some(Commands::Tui) => {
            tui::run(&mut app, &rx)?;
            return Ok(());
        }
        Some(Commands::Stats { date }) => commands::stats(&app, date)?,
        Some(Commands::Share) => commands::share(&app),
        Some(Commands::Year { daily }) => commands::year(&app, daily),
        Some(Commands::Task(command)) => commands::task(&mut app, command)?,
        Some(Commands::Notes(command)) => commands::notes(&mut app, command),
        Some(Commands::Config(args)) => commands::config(&mut app, args),
    };

    println!("{output}");
    Ok(())
}
