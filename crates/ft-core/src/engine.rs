//! The timer engine: phase/mode state machine over two [`PhaseTimer`]s.
//!
//! Every operation takes the sampled `now` so the engine itself is free of
//! clocks and side effects; the caller persists the resulting state and
//! appends emitted sessions to the log.
//!
//! Per phase the active track is either idle (base known) or running (base
//! and start known). Phase toggles and mode changes pause everything first,
//! so a running timer can never bleed into another phase or mode.

use serde::Serialize;

use crate::session::{Session, SessionMeta};
use crate::snapshot::{SNAPSHOT_VERSION, TimerSnapshot};
use crate::timer::{CountdownTrack, PhaseTimer};
use crate::types::{CountdownMinutes, Phase, TimerKind};

/// Behaviour switches for the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineConfig {
    /// Start the other phase when a countdown expires.
    pub auto_chain: bool,
    /// Finished runs at or below this many seconds are discarded.
    pub min_session_secs: i64,
}

/// Read-only view of the current phase for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerView {
    pub phase: Phase,
    pub kind: TimerKind,
    pub display_sec: i64,
    pub running: bool,
    pub countdown_min: u32,
}

/// Owns the phase selection and both phases' timers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerEngine {
    phase: Phase,
    focus: PhaseTimer,
    brk: PhaseTimer,
    config: EngineConfig,
}

impl TimerEngine {
    /// A fresh engine: focus on a stopwatch, break on a countdown.
    pub fn new(config: EngineConfig, focus_min: CountdownMinutes, break_min: CountdownMinutes) -> Self {
        Self {
            phase: Phase::Focus,
            focus: PhaseTimer::new(focus_min, TimerKind::Stopwatch),
            brk: PhaseTimer::new(break_min, TimerKind::Countdown),
            config,
        }
    }

    /// Restores persisted state. Display values are recomputed from the
    /// stored bases and start timestamps, so no catch-up is needed. Tracks
    /// that must not run are frozen at `now_ms`.
    pub fn from_snapshot(snapshot: &TimerSnapshot, config: EngineConfig, now_ms: i64) -> Self {
        let mut engine = Self {
            phase: snapshot.phase,
            focus: snapshot.focus,
            brk: snapshot.brk,
            config,
        };
        engine.enforce_single_live_track(now_ms);
        engine
    }

    pub fn snapshot(&self, written_at: i64) -> TimerSnapshot {
        TimerSnapshot {
            v: SNAPSHOT_VERSION,
            phase: self.phase,
            focus: self.focus,
            brk: self.brk,
            written_at: Some(written_at),
        }
    }

    pub const fn phase(&self) -> Phase {
        self.phase
    }

    pub const fn config(&self) -> EngineConfig {
        self.config
    }

    pub const fn timer(&self, phase: Phase) -> &PhaseTimer {
        match phase {
            Phase::Focus => &self.focus,
            Phase::Break => &self.brk,
        }
    }

    const fn timer_mut(&mut self, phase: Phase) -> &mut PhaseTimer {
        match phase {
            Phase::Focus => &mut self.focus,
            Phase::Break => &mut self.brk,
        }
    }

    pub const fn current(&self) -> &PhaseTimer {
        self.timer(self.phase)
    }

    pub fn display_seconds(&self, now_ms: i64) -> i64 {
        self.current().display_seconds(now_ms)
    }

    pub const fn is_running(&self) -> bool {
        self.current().is_running()
    }

    /// Whether any track of either phase is running; the host polls while true.
    pub const fn any_running(&self) -> bool {
        self.focus.any_running() || self.brk.any_running()
    }

    pub fn view(&self, now_ms: i64) -> TimerView {
        let current = self.current();
        TimerView {
            phase: self.phase,
            kind: current.active,
            display_sec: current.display_seconds(now_ms),
            running: current.is_running(),
            countdown_min: current.countdown_min.minutes(),
        }
    }

    /// Freezes every running track of both phases.
    pub fn pause_all(&mut self, now_ms: i64) {
        self.focus.freeze(now_ms);
        self.brk.freeze(now_ms);
    }

    /// Pauses everything and switches phase. The new phase is not started.
    pub fn toggle_phase(&mut self, now_ms: i64) {
        self.pause_all(now_ms);
        self.phase = self.phase.other();
        tracing::debug!(phase = %self.phase, "switched phase");
    }

    /// Starts or pauses the current phase's active track.
    pub fn start_pause(&mut self, now_ms: i64) {
        let phase = self.phase;
        let timer = self.timer_mut(phase);
        match timer.active {
            TimerKind::Stopwatch if timer.stopwatch.running => timer.stopwatch.freeze(now_ms),
            TimerKind::Stopwatch => timer.stopwatch.start(now_ms),
            TimerKind::Countdown if timer.countdown.running => timer.countdown.freeze(now_ms),
            TimerKind::Countdown => timer.countdown.start(now_ms),
        }
        let running = timer.is_running();
        tracing::debug!(%phase, running, "toggled timer");
    }

    /// Pauses everything and zeroes the current phase's active track.
    pub fn reset_current(&mut self, now_ms: i64) {
        self.pause_all(now_ms);
        let phase = self.phase;
        self.timer_mut(phase).reset_active();
        tracing::debug!(%phase, "reset timer");
    }

    /// Finishes the current run.
    ///
    /// Returns the recorded session, or `None` when the tracked time is too
    /// short to be worth recording (accidental taps). Either way every track
    /// ends up paused; a recorded run also resets the current phase.
    pub fn finish_session(&mut self, now_ms: i64, meta: &SessionMeta) -> Option<Session> {
        let phase = self.phase;
        let duration = self.current().tracked_seconds(now_ms);
        self.pause_all(now_ms);

        if duration <= 0 || duration <= self.config.min_session_secs {
            tracing::debug!(%phase, duration, "discarded short session");
            return None;
        }

        let session = Session::record(phase, duration, now_ms, meta);
        self.timer_mut(phase).reset_active();
        tracing::debug!(%phase, duration, id = %session.id, "recorded session");
        Some(session)
    }

    /// Switches the current phase's mode.
    ///
    /// Choosing the stopwatch resumes it from where it was paused. Choosing a
    /// countdown (minutes clamped to \[1, 240\], defaulting to the last
    /// chosen length) always refills it to the new full length.
    pub fn apply_preset(&mut self, now_ms: i64, kind: TimerKind, minutes: Option<i64>) {
        self.pause_all(now_ms);
        let phase = self.phase;
        let timer = self.timer_mut(phase);
        match kind {
            TimerKind::Stopwatch => timer.active = TimerKind::Stopwatch,
            TimerKind::Countdown => {
                let minutes = minutes.map_or(timer.countdown_min, CountdownMinutes::clamped);
                timer.active = TimerKind::Countdown;
                timer.countdown_min = minutes;
                timer.countdown = CountdownTrack::full(minutes);
            }
        }
        tracing::debug!(%phase, %kind, "applied preset");
    }

    /// Re-evaluates the current phase at `now`.
    ///
    /// Returns a session when a running countdown has reached zero. The
    /// finish pauses the track, so evaluating the same expiry again yields
    /// nothing. With auto-chaining the other phase is started at `now`.
    pub fn tick(&mut self, now_ms: i64, meta: &SessionMeta) -> Option<Session> {
        let current = self.current();
        let expired = current.active == TimerKind::Countdown
            && current.countdown.running
            && current.countdown.remaining(now_ms) == 0;
        if !expired {
            return None;
        }

        let session = self.finish_session(now_ms, meta);
        if self.config.auto_chain {
            self.toggle_phase(now_ms);
            self.start_pause(now_ms);
        }
        session
    }

    /// Stored state may predate the pause-on-switch rule; only the current
    /// phase's active track is allowed to keep running.
    fn enforce_single_live_track(&mut self, now_ms: i64) {
        let phase = self.phase;
        for other in [Phase::Focus, Phase::Break] {
            let timer = self.timer_mut(other);
            let keep = if other == phase { Some(timer.active) } else { None };
            if keep != Some(TimerKind::Stopwatch) && timer.stopwatch.running {
                timer.stopwatch.freeze(now_ms);
            }
            if keep != Some(TimerKind::Countdown) && timer.countdown.running {
                timer.countdown.freeze(now_ms);
            }
        }
    }
}
