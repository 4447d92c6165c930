//! Persisted timer state and migration from the legacy single-phase schema.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::timer::PhaseTimer;
use crate::types::{CountdownMinutes, Phase, TimerKind};

/// Current snapshot schema version.
pub const SNAPSHOT_VERSION: u8 = 2;

/// Default countdown length for the focus phase.
pub const DEFAULT_FOCUS_MINUTES: i64 = 45;

/// Default countdown length for the break phase.
pub const DEFAULT_BREAK_MINUTES: i64 = 15;

/// Both phases' timers plus the selected phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub v: u8,
    pub phase: Phase,
    pub focus: PhaseTimer,
    #[serde(rename = "break")]
    pub brk: PhaseTimer,
    /// When the snapshot was written (ms); newer snapshots win on sync.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub written_at: Option<i64>,
}

impl TimerSnapshot {
    /// Parses a stored snapshot; anything that is not a valid v2 snapshot is `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        if value.get("v").and_then(Value::as_u64) != Some(u64::from(SNAPSHOT_VERSION)) {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }

    /// Whether this snapshot should replace `other` under last-write-wins.
    pub fn is_newer_than(&self, other: &Self) -> bool {
        self.written_at.unwrap_or(0) > other.written_at.unwrap_or(0)
    }
}

/// Picks the snapshot with the latest write timestamp. Ties keep `local`.
pub fn newest_snapshot(
    local: Option<TimerSnapshot>,
    remote: Option<TimerSnapshot>,
) -> Option<TimerSnapshot> {
    match (local, remote) {
        (Some(local), Some(remote)) if remote.is_newer_than(&local) => Some(remote),
        (Some(local), _) => Some(local),
        (None, remote) => remote,
    }
}

/// Mode of the legacy single-phase timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegacyMode {
    Fixed,
    Stopwatch,
}

/// The legacy single-phase timer schema.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacySnapshot {
    pub mode: LegacyMode,
    #[serde(default)]
    pub fixed_focus_min: Option<f64>,
    #[serde(default)]
    pub fixed_break_min: Option<f64>,
    #[serde(default)]
    pub elapsed_sec: Option<f64>,
    #[serde(default)]
    pub remaining_sec: Option<f64>,
    #[serde(default)]
    pub is_running: Option<bool>,
    #[serde(default)]
    pub phase: Option<Phase>,
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "legacy values are finite seconds or minutes"
)]
fn whole(value: f64) -> i64 {
    if value.is_finite() { value.trunc() as i64 } else { 0 }
}

impl LegacySnapshot {
    pub fn from_value(value: &Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }

    /// Converts to the two-phase schema.
    ///
    /// Progress is carried into the focus phase. Time that passed while the
    /// old timer was running cannot be reconstructed, so a running timer
    /// resumes from `now_ms`.
    pub fn migrate(&self, now_ms: i64) -> TimerSnapshot {
        let focus_min = CountdownMinutes::clamped(
            self.fixed_focus_min.map_or(DEFAULT_FOCUS_MINUTES, whole),
        );
        let break_min = CountdownMinutes::clamped(
            self.fixed_break_min.map_or(DEFAULT_BREAK_MINUTES, whole),
        );
        let running = self.is_running.unwrap_or(false);

        let mut focus = match self.mode {
            LegacyMode::Stopwatch => PhaseTimer::new(focus_min, TimerKind::Stopwatch),
            LegacyMode::Fixed => PhaseTimer::new(focus_min, TimerKind::Countdown),
        };
        match self.mode {
            LegacyMode::Stopwatch => {
                focus.stopwatch.base_sec = self.elapsed_sec.map_or(0, whole).max(0);
                if running {
                    focus.stopwatch.running = true;
                    focus.stopwatch.started_at = Some(now_ms);
                }
            }
            LegacyMode::Fixed => {
                focus.countdown.base_remaining_sec = self
                    .remaining_sec
                    .map_or(focus_min.seconds(), whole)
                    .max(0);
                if running {
                    focus.countdown.running = true;
                    focus.countdown.started_at = Some(now_ms);
                }
            }
        }

        TimerSnapshot {
            v: SNAPSHOT_VERSION,
            phase: self.phase.unwrap_or_default(),
            focus,
            brk: PhaseTimer::new(break_min, TimerKind::Countdown),
            written_at: Some(now_ms),
        }
    }
}
