//! Typed per-identity access to the key-value store.

use ft_core::project::parse_projects;
use ft_core::session::parse_sessions;
use ft_core::{Identity, LegacySnapshot, ProjectId, ProjectList, SessionLog, TimerSnapshot};
use serde::Serialize;
use serde_json::Value;

use crate::{DbError, KvStore};

pub const HISTORY_KEY: &str = "history_v1";
pub const TASK_KEY: &str = "task_v1";
pub const PROJECTS_KEY: &str = "projects_v1";
pub const ACTIVE_PROJECT_KEY: &str = "active_project_v1";
pub const TIMER_KEY: &str = "timer_v2";

/// Keys the single-phase timer schema was stored under, oldest last.
pub const LEGACY_TIMER_KEYS: &[&str] = &["timer_v1", "timer_mode_v1", "timer_v0"];

/// One identity's view of a [`KvStore`].
///
/// Loads never fail: unreadable or malformed values are logged and replaced
/// by defaults. Saves return errors so callers can keep running in memory.
#[derive(Debug)]
pub struct UserStore<S> {
    store: S,
    identity: Identity,
}

impl<S: KvStore> UserStore<S> {
    pub const fn new(store: S, identity: Identity) -> Self {
        Self { store, identity }
    }

    pub const fn identity(&self) -> &Identity {
        &self.identity
    }

    pub const fn inner(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    fn key(&self, base: &str) -> String {
        self.identity.namespaced(base)
    }

    fn get_logged(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(key, error = %err, "failed to read stored value");
                None
            }
        }
    }

    /// Reads `base` for this identity. The anonymous identity adopts data
    /// stored under the bare legacy key once, moving it to the namespaced key.
    fn read(&mut self, base: &str) -> Option<String> {
        let key = self.key(base);
        if let Some(value) = self.get_logged(&key) {
            return Some(value);
        }
        if !self.identity.is_anonymous() {
            return None;
        }
        let legacy = self.get_logged(base)?;
        tracing::debug!(from = base, to = %key, "migrating un-namespaced value");
        let moved = self
            .store
            .set(&key, &legacy)
            .and_then(|()| self.store.remove(base));
        if let Err(err) = moved {
            tracing::warn!(key = %key, error = %err, "failed to migrate legacy value");
        }
        Some(legacy)
    }

    fn read_json(&mut self, base: &str) -> Option<Value> {
        let raw = self.read(base)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(key = base, error = %err, "discarding malformed stored value");
                None
            }
        }
    }

    fn write(&mut self, base: &str, value: &str) -> Result<(), DbError> {
        let key = self.key(base);
        self.store.set(&key, value)
    }

    fn write_json<T: Serialize + ?Sized>(&mut self, base: &str, value: &T) -> Result<(), DbError> {
        let json = serde_json::to_string(value).map_err(|source| DbError::Encode {
            key: base.to_string(),
            source,
        })?;
        self.write(base, &json)
    }

    /// The session log, newest first, trimmed to `cap`.
    pub fn load_history(&mut self, cap: usize) -> SessionLog {
        let items = self
            .read_json(HISTORY_KEY)
            .map(|value| parse_sessions(&value))
            .unwrap_or_default();
        SessionLog::from_items(items, cap)
    }

    pub fn save_history(&mut self, log: &SessionLog) -> Result<(), DbError> {
        self.write_json(HISTORY_KEY, log.as_slice())
    }

    /// The stored timer snapshot.
    ///
    /// When only the legacy single-phase schema is present it is migrated at
    /// `now_ms` and the result is written back, so migration happens once.
    pub fn load_timer(&mut self, now_ms: i64) -> Option<TimerSnapshot> {
        let current = self.read_json(TIMER_KEY);
        if let Some(snapshot) = current.as_ref().and_then(TimerSnapshot::from_value) {
            return Some(snapshot);
        }

        let legacy = LEGACY_TIMER_KEYS
            .iter()
            .find_map(|key| self.get_logged(key))
            .and_then(|raw| serde_json::from_str::<Value>(&raw).ok())
            .or(current)
            .or_else(|| {
                self.get_logged(TIMER_KEY)
                    .and_then(|raw| serde_json::from_str::<Value>(&raw).ok())
            })
            .as_ref()
            .and_then(LegacySnapshot::from_value)?;

        let snapshot = legacy.migrate(now_ms);
        tracing::info!(identity = %self.identity, "migrated legacy timer state");
        if let Err(err) = self.save_timer(&snapshot) {
            tracing::warn!(error = %err, "failed to persist migrated timer state");
        }
        Some(snapshot)
    }

    pub fn save_timer(&mut self, snapshot: &TimerSnapshot) -> Result<(), DbError> {
        self.write_json(TIMER_KEY, snapshot)
    }

    /// The project list and selection. An empty or missing list is seeded
    /// with the defaults, which are written back.
    pub fn load_projects(&mut self) -> ProjectList {
        let projects = self
            .read_json(PROJECTS_KEY)
            .map(|value| parse_projects(&value))
            .unwrap_or_default();
        if projects.is_empty() {
            let seeded = ProjectList::seeded();
            if let Err(err) = self.save_projects(&seeded) {
                tracing::warn!(error = %err, "failed to persist default projects");
            }
            return seeded;
        }
        let active = self
            .read(ACTIVE_PROJECT_KEY)
            .and_then(|id| ProjectId::new(id).ok());
        ProjectList::from_parts(projects, active)
    }

    pub fn save_projects(&mut self, list: &ProjectList) -> Result<(), DbError> {
        self.write_json(PROJECTS_KEY, list.projects())?;
        let active = list.active_id().map(ProjectId::as_str).unwrap_or_default();
        self.write(ACTIVE_PROJECT_KEY, active)
    }

    /// The current free-text task; empty when unset.
    pub fn load_task(&mut self) -> String {
        self.read(TASK_KEY).unwrap_or_default()
    }

    pub fn save_task(&mut self, task: &str) -> Result<(), DbError> {
        self.write(TASK_KEY, task)
    }
}

#[cfg(test)]
mod tests {
    use ft_core::session::SessionMeta;
    use ft_core::{CountdownMinutes, EngineConfig, Phase, Session, TimerEngine, TimerKind};
    use serde_json::json;

    use super::*;
    use crate::{Database, MemoryStore};

    const NOW: i64 = 1_700_000_000_000;

    fn anon(store: MemoryStore) -> UserStore<MemoryStore> {
        UserStore::new(store, Identity::Anonymous)
    }

    fn session(ended_at: i64) -> Session {
        Session::record(Phase::Focus, 60, ended_at, &SessionMeta::default())
    }

    #[test]
    fn history_roundtrip_is_lossless() {
        let mut store = anon(MemoryStore::new());
        let mut log = SessionLog::new(10);
        log.push(session(NOW));
        log.push(session(NOW + 60_000));

        store.save_history(&log).unwrap();
        assert_eq!(store.load_history(10), log);
    }

    #[test]
    fn malformed_history_loads_empty() {
        let mut inner = MemoryStore::new();
        inner.set("history_v1_anon", "{not json").unwrap();
        let mut store = anon(inner);
        assert!(store.load_history(10).is_empty());
    }

    #[test]
    fn identities_do_not_share_data() {
        let mut alice = UserStore::new(MemoryStore::new(), Identity::Telegram(1));
        alice.save_task("alice's task").unwrap();

        let mut bob = UserStore::new(alice.into_inner(), Identity::Telegram(2));
        assert_eq!(bob.load_task(), "");
        bob.save_task("bob's task").unwrap();

        let inner = bob.into_inner();
        assert_eq!(inner.get("task_v1_tg_1").unwrap().as_deref(), Some("alice's task"));
        assert_eq!(inner.get("task_v1_tg_2").unwrap().as_deref(), Some("bob's task"));
    }

    #[test]
    fn anonymous_adopts_legacy_keys_once() {
        let mut inner = MemoryStore::new();
        inner.set("task_v1", "old task").unwrap();
        let mut store = anon(inner);

        assert_eq!(store.load_task(), "old task");
        let inner = store.into_inner();
        assert_eq!(inner.get("task_v1").unwrap(), None);
        assert_eq!(inner.get("task_v1_anon").unwrap().as_deref(), Some("old task"));
    }

    #[test]
    fn telegram_identity_ignores_legacy_keys() {
        let mut inner = MemoryStore::new();
        inner.set("task_v1", "old task").unwrap();
        let mut store = UserStore::new(inner, Identity::Telegram(9));
        assert_eq!(store.load_task(), "");
    }

    #[test]
    fn timer_snapshot_roundtrip_preserves_display() {
        let mut engine = TimerEngine::new(
            EngineConfig::default(),
            CountdownMinutes::clamped(45),
            CountdownMinutes::clamped(15),
        );
        engine.apply_preset(NOW, TimerKind::Countdown, Some(25));
        engine.start_pause(NOW);
        let at = NOW + 90_500;

        let mut store = anon(MemoryStore::new());
        store.save_timer(&engine.snapshot(at)).unwrap();
        let loaded = store.load_timer(at).unwrap();
        let restored = TimerEngine::from_snapshot(&loaded, EngineConfig::default(), at);

        assert_eq!(restored.display_seconds(at), engine.display_seconds(at));
    }

    #[test]
    fn legacy_timer_is_migrated_and_persisted() {
        let mut inner = MemoryStore::new();
        let legacy = json!({"mode": "stopwatch", "elapsedSec": 120, "isRunning": true});
        inner.set("timer_v1", &legacy.to_string()).unwrap();
        let mut store = anon(inner);

        let snapshot = store.load_timer(NOW).unwrap();
        assert_eq!(snapshot.focus.stopwatch.base_sec, 120);
        assert_eq!(snapshot.focus.stopwatch.started_at, Some(NOW));

        // The second load reads the migrated v2 snapshot, not the legacy one.
        let again = store.load_timer(NOW + 60_000).unwrap();
        assert_eq!(again, snapshot);
        assert!(store.inner().get("timer_v2_anon").unwrap().is_some());
    }

    #[test]
    fn missing_timer_is_none() {
        let mut store = anon(MemoryStore::new());
        assert!(store.load_timer(NOW).is_none());
    }

    #[test]
    fn projects_are_seeded_and_persisted() {
        let mut store = anon(MemoryStore::new());
        let list = store.load_projects();
        assert_eq!(list, ProjectList::seeded());
        assert_eq!(
            store.inner().get("active_project_v1_anon").unwrap().as_deref(),
            Some("deep-work")
        );
    }

    #[test]
    fn projects_roundtrip_keeps_selection() {
        let mut store = UserStore::new(Database::open_in_memory().unwrap(), Identity::Telegram(5));
        let mut list = ProjectList::seeded();
        list.add("Thesis").unwrap();
        store.save_projects(&list).unwrap();

        assert_eq!(store.load_projects(), list);
    }
}
