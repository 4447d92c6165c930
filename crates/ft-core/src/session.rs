//! Recorded sessions and the capped session log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::project::Project;
use crate::types::{Phase, ProjectId, SessionId};

/// Default maximum number of sessions kept in the log.
pub const DEFAULT_HISTORY_CAP: usize = 2000;

/// Timestamps below this are taken to be seconds rather than milliseconds.
const MILLIS_THRESHOLD: f64 = 1e12;

/// Longest run accepted from stored data: 30 days.
const MAX_SESSION_SECS: f64 = 2_592_000.0;

/// Latest accepted timestamp, the end of year 9999 (ms).
const MAX_TIMESTAMP_MS: f64 = 253_402_300_799_999.0;

/// One completed focus or break run. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: SessionId,
    #[serde(rename = "type")]
    pub phase: Phase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    /// Start of the run (ms).
    pub started_at: i64,
    /// End of the run (ms).
    pub ended_at: i64,
    /// Tracked seconds.
    pub duration_sec: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
    /// Project name as it was when the session was recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
}

/// Task and project attached to a session when it is recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionMeta {
    pub task: Option<String>,
    pub project: Option<Project>,
}

impl SessionMeta {
    pub fn new(task: Option<&str>, project: Option<&Project>) -> Self {
        Self {
            task: task.map(str::trim).filter(|t| !t.is_empty()).map(String::from),
            project: project.cloned(),
        }
    }
}

impl Session {
    /// Records a run of `duration_sec` seconds that ended at `ended_at`.
    pub fn record(phase: Phase, duration_sec: i64, ended_at: i64, meta: &SessionMeta) -> Self {
        let duration_sec = duration_sec.max(0);
        Self {
            id: SessionId::generate(),
            phase,
            task: meta.task.clone(),
            started_at: ended_at.saturating_sub(duration_sec.saturating_mul(1000)),
            ended_at,
            duration_sec,
            project_id: meta.project.as_ref().map(|p| p.id.clone()),
            project_name: meta.project.as_ref().map(|p| p.name.clone()),
        }
    }

    /// Parses one stored record, returning `None` for anything malformed.
    ///
    /// Second-based timestamps from older data are converted to milliseconds.
    /// Timestamps outside years 1970..=9999 and durations over 30 days are
    /// rejected.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let id = SessionId::new(obj.get("id")?.as_str()?).ok()?;
        let phase = obj.get("type")?.as_str()?.parse::<Phase>().ok()?;
        let started_at = normalize_timestamp(finite(obj.get("startedAt")?)?)?;
        let ended_at = normalize_timestamp(finite(obj.get("endedAt")?)?)?;
        let duration = finite(obj.get("durationSec")?)?;
        if !(0.0..=MAX_SESSION_SECS).contains(&duration) {
            return None;
        }
        let task = obj
            .get("task")
            .and_then(Value::as_str)
            .map(str::to_string);
        let project_id = obj
            .get("projectId")
            .and_then(Value::as_str)
            .and_then(|id| ProjectId::new(id).ok());
        let project_name = obj
            .get("projectName")
            .and_then(Value::as_str)
            .map(str::to_string);

        #[expect(
            clippy::cast_possible_truncation,
            reason = "finite values checked above; stored durations are whole seconds"
        )]
        let duration_sec = duration.round() as i64;

        Some(Self {
            id,
            phase,
            task,
            started_at,
            ended_at,
            duration_sec,
            project_id,
            project_name,
        })
    }

    /// Start time as a `DateTime`.
    pub fn start_time(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.started_at).unwrap_or_default()
    }

    /// End time as a `DateTime`.
    pub fn end_time(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.ended_at).unwrap_or_default()
    }
}

fn finite(value: &Value) -> Option<f64> {
    value.as_f64().filter(|v| v.is_finite())
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "range checked against MAX_TIMESTAMP_MS before the cast"
)]
fn normalize_timestamp(t: f64) -> Option<i64> {
    let ms = if t > MILLIS_THRESHOLD { t } else { t * 1000.0 }.round();
    (0.0..=MAX_TIMESTAMP_MS).contains(&ms).then(|| ms as i64)
}

/// Parses a stored session array, dropping invalid records.
///
/// Anything that is not an array yields an empty log.
pub fn parse_sessions(value: &Value) -> Vec<Session> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };
    let sessions: Vec<Session> = items.iter().filter_map(Session::from_value).collect();
    let dropped = items.len() - sessions.len();
    if dropped > 0 {
        tracing::warn!(dropped, "discarded malformed session records");
    }
    sessions
}

/// Completed sessions, newest first, capped at a fixed length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionLog {
    items: Vec<Session>,
    cap: usize,
}

impl Default for SessionLog {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAP)
    }
}

impl SessionLog {
    pub fn new(cap: usize) -> Self {
        Self {
            items: Vec::new(),
            cap: cap.max(1),
        }
    }

    /// Builds a log from stored items (newest first), trimming to the cap.
    pub fn from_items(items: Vec<Session>, cap: usize) -> Self {
        let mut log = Self::new(cap);
        log.items = items;
        log.items.truncate(log.cap);
        log
    }

    /// Prepends a session, dropping the oldest entry when over the cap.
    pub fn push(&mut self, session: Session) {
        self.items.insert(0, session);
        self.items.truncate(self.cap);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub const fn cap(&self) -> usize {
        self.cap
    }

    /// Sessions newest first.
    pub fn iter(&self) -> impl Iterator<Item = &Session> {
        self.items.iter()
    }

    pub fn newest(&self) -> Option<&Session> {
        self.items.first()
    }

    pub fn as_slice(&self) -> &[Session] {
        &self.items
    }
}
