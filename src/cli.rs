//! Command-line arguments.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "pomodesk")]
#[command(about = "A terminal pomodoro timer with a daily task list, notes and focus stats")]
#[command(long_about = "pomodesk - focus timer, todo list and notes pad

Runs the interactive timer when started without a command. Focus time
and completed sessions are tracked per day; everything is stored locally.

QUICK START:
  pomodesk                       Open the timer
  pomodesk task add \"Write report\" --pomodoros 2
  pomodesk share                 Print today's plan & results")]
#[command(version, propagate_version = true)]
pub struct Cli {
    /// Directory holding the database and logs
    #[arg(long, global = true, env = "POMODESK_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Mirror logs to stderr (ignored by the interactive timer)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Open the interactive timer (default)
    Tui,

    /// Show focused time and completed sessions for a day
    Stats {
        /// Day to show, as YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Print today's plan & results, ready to paste
    Share,

    /// Show how much of the year is left
    Year {
        /// Pomodoros per day for the year-end projection
        #[arg(long)]
        daily: Option<u32>,
    },

    /// Manage today's tasks
    #[command(subcommand)]
    Task(TaskCommands),

    /// Show or edit the notes pad
    #[command(subcommand)]
    Notes(NotesCommands),

    /// Show or change settings
    Config(ConfigArgs),
}

#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Add a task to today's list
    Add {
        name: String,
        /// Planned pomodoros (1-10)
        #[arg(short, long, default_value_t = 1)]
        pomodoros: u32,
    },
    /// List today's tasks
    List {
        /// Include tasks from earlier days
        #[arg(long)]
        all: bool,
    },
    /// Toggle a task's completed mark
    Done {
        /// Position in `task list`
        index: usize,
    },
    /// Rename a task or change its planned pomodoros
    Edit {
        index: usize,
        #[arg(long)]
        name: Option<String>,
        #[arg(short, long)]
        pomodoros: Option<u32>,
    },
    /// Delete a task
    Remove { index: usize },
}

#[derive(Subcommand, Debug)]
pub enum NotesCommands {
    /// Print the notes
    Show,
    /// Replace the notes
    Set { text: String },
    /// Erase the notes
    Clear,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Desktop notifications on completion
    #[arg(long, action = ArgAction::Set, value_name = "BOOL")]
    pub notifications: Option<bool>,

    /// Default pomodoros per day for the year projection (1-20)
    #[arg(long)]
    pub daily: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_command_runs_tui() {
        let cli = Cli::try_parse_from(["pomodesk"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_task_add() {
        let cli = Cli::try_parse_from(["pomodesk", "task", "add", "Write report", "-p", "3"]).unwrap();
        match cli.command {
            Some(Commands::Task(TaskCommands::Add { name, pomodoros })) => {
                assert_eq!(name, "Write report");
                assert_eq!(pomodoros, 3);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_stats_date() {
        let cli = Cli::try_parse_from(["pomodesk", "stats", "--date", "2024-03-12"]).unwrap();
        match cli.command {
            Some(Commands::Stats { date }) => {
                assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 12));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_config_flags() {
        let cli = Cli::try_parse_from(["pomodesk", "config", "--notifications", "false"]).unwrap();
        match cli.command {
            Some(Commands::Config(args)) => {
                assert_eq!(args.notifications, Some(false));
                assert_eq!(args.daily, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_data_dir() {
        let cli = Cli::try_parse_from(["pomodesk", "share", "--data-dir", "/tmp/pd"]).unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/pd")));
    }
}
