//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ft_core::StatsPeriod;

/// Focus timer.
///
/// Tracks focus and break time with a stopwatch or a countdown, records
/// finished sessions, and reports statistics by day, week, month and year.
#[derive(Debug, Parser)]
#[command(name = "ft", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the current timer.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Start or pause the current phase's timer.
    Toggle,

    /// Switch between focus and break. The new phase is not started.
    Phase,

    /// Reset the current phase's timer.
    Reset,

    /// Finish the current run and record it.
    Finish,

    /// Choose stopwatch or countdown for the current phase.
    Preset {
        #[command(subcommand)]
        kind: PresetKind,
    },

    /// Follow the running timer until it stops or Ctrl-C.
    Watch,

    /// Show focus statistics.
    Stats {
        /// Period to aggregate over.
        #[arg(long, default_value = "week", value_parser = parse_period)]
        period: StatsPeriod,

        /// Periods back from the current one (0 or negative).
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        offset: i32,

        /// Start of a custom range (YYYY-MM-DD or "N days ago").
        #[arg(long)]
        from: Option<String>,

        /// End of a custom range (YYYY-MM-DD or "N days ago").
        #[arg(long)]
        to: Option<String>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Inspect or clear recorded sessions.
    #[command(subcommand)]
    History(HistoryAction),

    /// Manage projects.
    #[command(subcommand)]
    Projects(ProjectsAction),

    /// Show or set the current task.
    Task {
        /// New task text.
        text: Option<String>,

        /// Clear the task.
        #[arg(long, conflicts_with = "text")]
        clear: bool,
    },

    /// Exchange state with the mirror store.
    #[command(subcommand)]
    Sync(SyncAction),
}

/// Timer modes.
#[derive(Debug, Subcommand)]
pub enum PresetKind {
    /// Count up; resumes where it was paused.
    Stopwatch,
    /// Count down from a fixed length.
    Countdown {
        /// Length in minutes (1-240); defaults to the last chosen length.
        minutes: Option<i64>,
    },
}

/// History actions.
#[derive(Debug, Subcommand)]
pub enum HistoryAction {
    /// List recent sessions.
    List {
        /// Maximum number of sessions to show.
        #[arg(long, default_value_t = 20)]
        limit: usize,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Delete every recorded session.
    Clear {
        /// Confirm deletion.
        #[arg(long)]
        yes: bool,
    },
}

/// Project actions.
#[derive(Debug, Subcommand)]
pub enum ProjectsAction {
    /// List projects; the active one is marked.
    List,
    /// Add a project and make it active.
    Add { name: String },
    /// Rename a project.
    Rename { id: String, name: String },
    /// Delete a project.
    Delete { id: String },
    /// Make a project active.
    Select { id: String },
}

/// Sync directions.
#[derive(Debug, Subcommand)]
pub enum SyncAction {
    /// Write local state to the mirror.
    Push,
    /// Merge mirror state into local state.
    Pull,
}

fn parse_period(s: &str) -> Result<StatsPeriod, String> {
    s.parse().map_err(|err: ft_core::ValidationError| err.to_string())
}
