//! The application state object.
//!
//! [`FocusApp`] owns the engine, the session log, the projects and the task
//! for one identity. It is built with [`FocusApp::load`], mutated by the
//! commands, and written back with [`FocusApp::flush`]. Writes are best
//! effort: a failed save is logged and the in-memory state stays valid.

use chrono::TimeZone;
use ft_core::snapshot::newest_snapshot;
use ft_core::{
    Clock, ProjectId, ProjectList, Session, SessionLog, SessionMeta, StatsQuery, StatsReport,
    TimerEngine, TimerKind, TimerSnapshot, TimerView, ValidationError, compute_stats,
};
use ft_db::mirror::merge_sessions;
use ft_db::{KvStore, UserStore};

use crate::Config;

#[derive(Debug, Default, Clone, Copy)]
struct Dirty {
    timer: bool,
    history: bool,
    projects: bool,
    task: bool,
}

/// State pulled from the mirror.
#[derive(Debug, Default)]
pub struct RemoteState {
    pub history: Vec<Session>,
    pub task: Option<String>,
    pub projects: Option<ProjectList>,
    pub timer: Option<TimerSnapshot>,
}

/// What a pull changed locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PullSummary {
    pub new_sessions: usize,
    pub timer_replaced: bool,
}

pub struct FocusApp<S, C> {
    store: UserStore<S>,
    clock: C,
    engine: TimerEngine,
    /// When the timer state was last written; decides sync conflicts.
    timer_written_at: Option<i64>,
    history: SessionLog,
    projects: ProjectList,
    task: String,
    dirty: Dirty,
}

impl<S: KvStore, C: Clock> FocusApp<S, C> {
    /// Loads stored state, falling back to defaults for anything missing.
    ///
    /// A countdown that ran out while nothing was watching is recorded here,
    /// before any command can pause or reset it.
    pub fn load(mut store: UserStore<S>, clock: C, config: &Config) -> Self {
        let now = clock.now_ms();
        let engine_config = config.engine_config();
        let snapshot = store.load_timer(now);
        let engine = snapshot.map_or_else(
            || {
                TimerEngine::new(
                    engine_config,
                    config.focus_countdown(),
                    config.break_countdown(),
                )
            },
            |snapshot| TimerEngine::from_snapshot(&snapshot, engine_config, now),
        );
        let history = store.load_history(config.history_cap);
        let projects = store.load_projects();
        let task = store.load_task();
        tracing::debug!(
            identity = %store.identity(),
            sessions = history.len(),
            running = engine.any_running(),
            "loaded state"
        );
        let mut app = Self {
            store,
            clock,
            engine,
            timer_written_at: snapshot.and_then(|s| s.written_at),
            history,
            projects,
            task,
            dirty: Dirty::default(),
        };
        if let Some(session) = app.tick() {
            tracing::info!(
                phase = %session.phase,
                duration_sec = session.duration_sec,
                "recorded countdown that expired while closed"
            );
        }
        app
    }

    pub fn now(&self) -> i64 {
        self.clock.now_ms()
    }

    pub const fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub const fn history(&self) -> &SessionLog {
        &self.history
    }

    pub const fn projects(&self) -> &ProjectList {
        &self.projects
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    pub const fn store(&self) -> &UserStore<S> {
        &self.store
    }

    pub fn view(&self) -> TimerView {
        self.engine.view(self.now())
    }

    /// The timer state as last persisted, for sync.
    pub fn timer_snapshot(&self) -> TimerSnapshot {
        let mut snapshot = self.engine.snapshot(0);
        snapshot.written_at = self.timer_written_at;
        snapshot
    }

    fn meta(&self) -> SessionMeta {
        SessionMeta::new(Some(&self.task), self.projects.active())
    }

    fn timer_changed(&mut self, now: i64) {
        self.timer_written_at = Some(now);
        self.dirty.timer = true;
    }

    fn record(&mut self, session: Option<Session>) -> Option<Session> {
        let session = session?;
        self.history.push(session.clone());
        self.dirty.history = true;
        Some(session)
    }

    pub fn start_pause(&mut self) {
        let now = self.now();
        self.engine.start_pause(now);
        self.timer_changed(now);
    }

    pub fn toggle_phase(&mut self) {
        let now = self.now();
        self.engine.toggle_phase(now);
        self.timer_changed(now);
    }

    pub fn reset(&mut self) {
        let now = self.now();
        self.engine.reset_current(now);
        self.timer_changed(now);
    }

    /// Finishes the current run; `None` when it was too short to record.
    pub fn finish(&mut self) -> Option<Session> {
        let now = self.now();
        let meta = self.meta();
        let session = self.engine.finish_session(now, &meta);
        self.timer_changed(now);
        self.record(session)
    }

    pub fn apply_preset(&mut self, kind: TimerKind, minutes: Option<i64>) {
        let now = self.now();
        self.engine.apply_preset(now, kind, minutes);
        self.timer_changed(now);
    }

    /// Re-evaluates the timer; records a session when a countdown expired.
    ///
    /// An expiry changes the timer even when the run was too short to record.
    pub fn tick(&mut self) -> Option<Session> {
        let now = self.now();
        let meta = self.meta();
        let before = self.engine.clone();
        let session = self.engine.tick(now, &meta);
        if self.engine != before {
            self.timer_changed(now);
        }
        self.record(session)
    }

    pub fn set_task(&mut self, task: &str) {
        task.trim().clone_into(&mut self.task);
        self.dirty.task = true;
    }

    pub fn clear_history(&mut self) -> usize {
        let removed = self.history.len();
        self.history.clear();
        self.dirty.history = true;
        removed
    }

    pub fn add_project(&mut self, name: &str) -> Result<ProjectId, ValidationError> {
        let id = self.projects.add(name)?.id.clone();
        self.dirty.projects = true;
        Ok(id)
    }

    pub fn rename_project(&mut self, id: &ProjectId, name: &str) -> Result<bool, ValidationError> {
        let renamed = self.projects.rename(id, name)?;
        self.dirty.projects |= renamed;
        Ok(renamed)
    }

    pub fn delete_project(&mut self, id: &ProjectId) -> bool {
        let deleted = self.projects.delete(id);
        self.dirty.projects |= deleted;
        deleted
    }

    pub fn select_project(&mut self, id: &ProjectId) -> bool {
        let selected = self.projects.select(id);
        self.dirty.projects |= selected;
        selected
    }

    pub fn stats<Tz: TimeZone>(&self, query: &StatsQuery, tz: &Tz) -> StatsReport {
        compute_stats(self.history.as_slice(), query, self.now(), tz)
    }

    /// Merges mirror state into local state.
    ///
    /// Sessions are unioned by id. Task and projects are taken from the
    /// mirror when present. The timer is replaced only by a newer write.
    pub fn apply_remote(&mut self, remote: RemoteState) -> PullSummary {
        let before = self.history.len();
        let local: Vec<Session> = self.history.iter().cloned().collect();
        let merged = merge_sessions([remote.history, local]);
        let mut summary = PullSummary::default();
        if merged.len() != before {
            summary.new_sessions = merged.len().saturating_sub(before);
            self.history = SessionLog::from_items(merged, self.history.cap());
            self.dirty.history = true;
        }

        if let Some(task) = remote.task {
            if task != self.task {
                self.task = task;
                self.dirty.task = true;
            }
        }

        if let Some(projects) = remote.projects {
            if projects != self.projects {
                self.projects = projects;
                self.dirty.projects = true;
            }
        }

        let local = self.timer_snapshot();
        if let Some(winner) = newest_snapshot(Some(local), remote.timer) {
            if winner != local {
                self.engine = TimerEngine::from_snapshot(&winner, self.engine.config(), self.now());
                self.timer_written_at = winner.written_at;
                self.dirty.timer = true;
                summary.timer_replaced = true;
            }
        }

        tracing::debug!(?summary, "applied remote state");
        summary
    }

    /// Writes every changed part back to the store. Returns `false` if any
    /// write failed; failures are logged and the in-memory state is kept.
    pub fn flush(&mut self) -> bool {
        let mut ok = true;
        if self.dirty.timer {
            let snapshot = self.timer_snapshot();
            ok &= log_failure("timer", self.store.save_timer(&snapshot));
        }
        if self.dirty.history {
            ok &= log_failure("history", self.store.save_history(&self.history));
        }
        if self.dirty.projects {
            ok &= log_failure("projects", self.store.save_projects(&self.projects));
        }
        if self.dirty.task {
            ok &= log_failure("task", self.store.save_task(&self.task));
        }
        self.dirty = Dirty::default();
        ok
    }
}

fn log_failure(what: &str, result: Result<(), ft_db::DbError>) -> bool {
    match result {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(what, error = %err, "failed to save; continuing in memory");
            false
        }
    }
}
