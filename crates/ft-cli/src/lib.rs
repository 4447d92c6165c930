//! Focus timer CLI library.
//!
//! This crate provides the CLI interface for the focus timer: configuration,
//! the [`FocusApp`](app::FocusApp) state object and the subcommands.

pub mod app;
mod cli;
pub mod commands;
mod config;

pub use app::{FocusApp, PullSummary, RemoteState};
pub use cli::{Cli, Commands, HistoryAction, PresetKind, ProjectsAction, SyncAction};
pub use config::Config;
