//! Per-phase timer tracks.
//!
//! A track never runs a background clock. It stores a base value as of the
//! last pause plus the absolute timestamp it was started at, and the live
//! value is recomputed from those against any `now`. This is what keeps the
//! timer correct after the process was suspended or restarted.

use serde::{Deserialize, Serialize};

use crate::types::{CountdownMinutes, TimerKind};

/// Whole seconds elapsed between `started_at` and `now`, never negative.
fn elapsed_secs(started_at: i64, now_ms: i64) -> i64 {
    (now_ms - started_at).max(0) / 1000
}

/// Count-up track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StopwatchTrack {
    pub running: bool,
    /// Elapsed seconds as of the last pause.
    pub base_sec: i64,
    /// When the track was last started (ms).
    pub started_at: Option<i64>,
}

impl StopwatchTrack {
    /// Live elapsed seconds at `now_ms`.
    pub fn elapsed(&self, now_ms: i64) -> i64 {
        let base = self.base_sec.max(0);
        match (self.running, self.started_at) {
            (true, Some(started_at)) => base + elapsed_secs(started_at, now_ms),
            _ => base,
        }
    }

    /// Folds the live value into the base and stops.
    pub fn freeze(&mut self, now_ms: i64) {
        self.base_sec = self.elapsed(now_ms);
        self.running = false;
        self.started_at = None;
    }

    pub fn start(&mut self, now_ms: i64) {
        self.base_sec = self.elapsed(now_ms);
        self.running = true;
        self.started_at = Some(now_ms);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Count-down track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountdownTrack {
    pub running: bool,
    /// Remaining seconds as of the last pause.
    pub base_remaining_sec: i64,
    /// When the track was last started (ms).
    pub started_at: Option<i64>,
    /// The length this countdown was configured with.
    pub duration_min: CountdownMinutes,
}

impl CountdownTrack {
    /// A paused countdown holding its full length.
    pub fn full(duration: CountdownMinutes) -> Self {
        Self {
            running: false,
            base_remaining_sec: duration.seconds(),
            started_at: None,
            duration_min: duration,
        }
    }

    /// Live remaining seconds at `now_ms`, floored at zero.
    pub fn remaining(&self, now_ms: i64) -> i64 {
        let spent = match (self.running, self.started_at) {
            (true, Some(started_at)) => elapsed_secs(started_at, now_ms),
            _ => 0,
        };
        (self.base_remaining_sec - spent).max(0)
    }

    /// Seconds actually spent against the configured length.
    pub fn spent(&self, now_ms: i64) -> i64 {
        (self.duration_min.seconds() - self.remaining(now_ms)).max(0)
    }

    pub fn freeze(&mut self, now_ms: i64) {
        self.base_remaining_sec = self.remaining(now_ms);
        self.running = false;
        self.started_at = None;
    }

    /// Starts counting down. An expired countdown restarts from its full length.
    pub fn start(&mut self, now_ms: i64) {
        let remaining = self.remaining(now_ms);
        self.base_remaining_sec = if remaining <= 0 {
            self.duration_min.seconds()
        } else {
            remaining
        };
        self.running = true;
        self.started_at = Some(now_ms);
    }

    pub fn refill(&mut self) {
        *self = Self::full(self.duration_min);
    }
}

/// Everything needed to compute one phase's time at any instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseTimer {
    /// The selected mode.
    pub active: TimerKind,
    /// Last chosen countdown length, kept while the stopwatch is active.
    pub countdown_min: CountdownMinutes,
    pub stopwatch: StopwatchTrack,
    pub countdown: CountdownTrack,
}

impl PhaseTimer {
    /// A fresh, paused timer.
    pub fn new(minutes: CountdownMinutes, active: TimerKind) -> Self {
        Self {
            active,
            countdown_min: minutes,
            stopwatch: StopwatchTrack::default(),
            countdown: CountdownTrack::full(minutes),
        }
    }

    /// Elapsed seconds for a stopwatch, remaining seconds for a countdown.
    pub fn display_seconds(&self, now_ms: i64) -> i64 {
        match self.active {
            TimerKind::Stopwatch => self.stopwatch.elapsed(now_ms),
            TimerKind::Countdown => self.countdown.remaining(now_ms),
        }
    }

    /// Whether the active track is running.
    pub const fn is_running(&self) -> bool {
        match self.active {
            TimerKind::Stopwatch => self.stopwatch.running,
            TimerKind::Countdown => self.countdown.running,
        }
    }

    /// Whether either track is running.
    pub const fn any_running(&self) -> bool {
        self.stopwatch.running || self.countdown.running
    }

    /// Seconds that would be recorded if the active run were finished now.
    pub fn tracked_seconds(&self, now_ms: i64) -> i64 {
        match self.active {
            TimerKind::Stopwatch => self.stopwatch.elapsed(now_ms),
            TimerKind::Countdown => self.countdown.spent(now_ms),
        }
    }

    pub fn freeze(&mut self, now_ms: i64) {
        self.stopwatch.freeze(now_ms);
        self.countdown.freeze(now_ms);
    }

    /// Zeroes the active track: stopwatch to 0, countdown back to full.
    pub fn reset_active(&mut self) {
        match self.active {
            TimerKind::Stopwatch => self.stopwatch.clear(),
            TimerKind::Countdown => self.countdown.refill(),
        }
    }
}
