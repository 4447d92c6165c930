//! Mirroring local state to a size-limited remote key-value store.
//!
//! Remote stores cap each value (4096 characters for Telegram cloud storage),
//! so the session log is split into numbered chunks `h_0`, `h_1`, ...
//! Everything else fits in a single value. All keys are prefixed with the
//! identity so one remote store can hold several users.

use std::collections::HashSet;

use ft_core::project::parse_projects;
use ft_core::session::parse_sessions;
use ft_core::{Identity, ProjectId, ProjectList, Session, TimerSnapshot};
use serde_json::Value;

use crate::{DbError, KvStore};

/// Largest value, in characters, a chunk may have.
pub const CHUNK_MAX_CHARS: usize = 4096;

const CHUNK_PREFIX: &str = "h_";
const TASK: &str = "task";
const PROJECTS: &str = "projects";
const ACTIVE_PROJECT: &str = "active_project";
const TIMER: &str = "timer_v2";

fn encode<T: serde::Serialize + ?Sized>(key: &str, value: &T) -> Result<String, DbError> {
    serde_json::to_string(value).map_err(|source| DbError::Encode {
        key: key.to_string(),
        source,
    })
}

/// Splits sessions into JSON arrays of at most [`CHUNK_MAX_CHARS`] characters,
/// preserving order. A single session larger than the limit gets a chunk of
/// its own.
pub fn chunk_sessions(sessions: &[Session]) -> Result<Vec<String>, DbError> {
    let mut chunks = Vec::new();
    let mut current: Vec<String> = Vec::new();
    // Length of `[a,b,...]` for `current`.
    let mut current_len = 0;

    for session in sessions {
        let item = encode("session", session)?;
        let item_len = item.chars().count();
        let next_len = if current.is_empty() {
            item_len + 2
        } else {
            current_len + item_len + 1
        };
        if next_len > CHUNK_MAX_CHARS && !current.is_empty() {
            chunks.push(format!("[{}]", current.join(",")));
            current.clear();
            current_len = item_len + 2;
        } else {
            current_len = next_len;
        }
        current.push(item);
    }
    if !current.is_empty() {
        chunks.push(format!("[{}]", current.join(",")));
    }
    Ok(chunks)
}

/// Combines chunk contents into one log: invalid records dropped, newest
/// first, duplicates by id removed.
pub fn merge_sessions(sources: impl IntoIterator<Item = Vec<Session>>) -> Vec<Session> {
    let mut all: Vec<Session> = sources.into_iter().flatten().collect();
    all.sort_by(|a, b| b.ended_at.cmp(&a.ended_at));
    let mut seen = HashSet::new();
    all.retain(|s| seen.insert(s.id.clone()));
    all
}

/// One identity's view of a remote store.
#[derive(Debug)]
pub struct Mirror<S> {
    store: S,
    identity: Identity,
}

impl<S: KvStore> Mirror<S> {
    pub const fn new(store: S, identity: Identity) -> Self {
        Self { store, identity }
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    fn key(&self, name: &str) -> String {
        format!("{}/{name}", self.identity.key())
    }

    fn chunk_keys(&self) -> Result<Vec<(usize, String)>, DbError> {
        let prefix = self.key(CHUNK_PREFIX);
        Ok(self
            .store
            .keys()?
            .into_iter()
            .filter_map(|key| {
                let index = key.strip_prefix(&prefix)?.parse::<usize>().ok()?;
                Some((index, key))
            })
            .collect())
    }

    /// Writes the session log as chunks and removes chunks left over from a
    /// longer log. Returns the number of chunks written.
    pub fn push_history(&mut self, sessions: &[Session]) -> Result<usize, DbError> {
        let chunks = chunk_sessions(sessions)?;
        for (index, chunk) in chunks.iter().enumerate() {
            let key = self.key(&format!("{CHUNK_PREFIX}{index}"));
            self.store.set(&key, chunk)?;
        }
        let stale: Vec<String> = self
            .chunk_keys()?
            .into_iter()
            .filter(|(index, _)| *index >= chunks.len())
            .map(|(_, key)| key)
            .collect();
        self.store.remove_many(&stale)?;
        tracing::debug!(chunks = chunks.len(), removed = stale.len(), "pushed history");
        Ok(chunks.len())
    }

    /// Reads every chunk back into one log.
    pub fn pull_history(&self) -> Result<Vec<Session>, DbError> {
        let mut sources = Vec::new();
        for (_, key) in self.chunk_keys()? {
            let Some(raw) = self.store.get(&key)? else {
                continue;
            };
            match serde_json::from_str::<Value>(&raw) {
                Ok(value) => sources.push(parse_sessions(&value)),
                Err(err) => tracing::warn!(key = %key, error = %err, "skipping malformed chunk"),
            }
        }
        Ok(merge_sessions(sources))
    }

    pub fn push_task(&mut self, task: &str) -> Result<(), DbError> {
        let key = self.key(TASK);
        self.store.set(&key, task)
    }

    pub fn pull_task(&self) -> Result<Option<String>, DbError> {
        self.store.get(&self.key(TASK))
    }

    pub fn push_projects(&mut self, list: &ProjectList) -> Result<(), DbError> {
        let key = self.key(PROJECTS);
        self.store.set(&key, &encode(&key, list.projects())?)?;
        let key = self.key(ACTIVE_PROJECT);
        let active = list.active_id().map(ProjectId::as_str).unwrap_or_default();
        self.store.set(&key, active)
    }

    /// The remote project list, or `None` when it is missing or has no valid
    /// projects.
    pub fn pull_projects(&self) -> Result<Option<ProjectList>, DbError> {
        let Some(raw) = self.store.get(&self.key(PROJECTS))? else {
            return Ok(None);
        };
        let projects = serde_json::from_str::<Value>(&raw)
            .map(|value| parse_projects(&value))
            .unwrap_or_default();
        if projects.is_empty() {
            return Ok(None);
        }
        let active = self
            .store
            .get(&self.key(ACTIVE_PROJECT))?
            .and_then(|id| ProjectId::new(id).ok());
        Ok(Some(ProjectList::from_parts(projects, active)))
    }

    pub fn push_timer(&mut self, snapshot: &TimerSnapshot) -> Result<(), DbError> {
        let key = self.key(TIMER);
        self.store.set(&key, &encode(&key, snapshot)?)
    }

    pub fn pull_timer(&self) -> Result<Option<TimerSnapshot>, DbError> {
        let snapshot = self
            .store
            .get(&self.key(TIMER))?
            .and_then(|raw| serde_json::from_str::<Value>(&raw).ok())
            .as_ref()
            .and_then(TimerSnapshot::from_value);
        Ok(snapshot)
    }
}
