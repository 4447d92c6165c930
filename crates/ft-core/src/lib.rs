//! Core domain logic for the focus timer.
//!
//! This crate contains the fundamental types and logic for:
//! - Timer engine: focus/break phases, each with a stopwatch and a countdown
//! - Session log: completed runs, capped and newest first
//! - Projects: the tag list sessions are recorded against
//! - Statistics: calendar-period totals and chart buckets
//!
//! Nothing here performs I/O. Callers sample the clock and pass `now` in.

pub mod calendar;
pub mod clock;
pub mod engine;
pub mod format;
pub mod identity;
pub mod project;
pub mod session;
pub mod snapshot;
pub mod stats;
pub mod timer;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{EngineConfig, TimerEngine, TimerView};
pub use format::format_mmss;
pub use identity::Identity;
pub use project::{Project, ProjectList};
pub use session::{Session, SessionLog, SessionMeta};
pub use snapshot::{LegacySnapshot, TimerSnapshot};
pub use stats::{StatsPeriod, StatsQuery, StatsReport, compute_stats};
pub use timer::PhaseTimer;
pub use types::{CountdownMinutes, Phase, ProjectId, SessionId, TimerKind, ValidationError};
