//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use ft_core::session::DEFAULT_HISTORY_CAP;
use ft_core::snapshot::{DEFAULT_BREAK_MINUTES, DEFAULT_FOCUS_MINUTES};
use ft_core::{CountdownMinutes, EngineConfig, Identity};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,
    /// Telegram user id; absent means the anonymous identity.
    pub user_id: Option<i64>,
    /// Ticker period for `ft watch`, in milliseconds.
    pub tick_interval_ms: u64,
    /// Start the other phase when a countdown expires.
    pub auto_chain: bool,
    /// Finished runs at or below this many seconds are not recorded.
    pub min_session_secs: i64,
    /// Maximum number of sessions kept.
    pub history_cap: usize,
    /// Default focus countdown length.
    pub focus_minutes: i64,
    /// Default break countdown length.
    pub break_minutes: i64,
    /// Database acting as the remote store for `ft sync`.
    pub mirror_path: Option<PathBuf>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // user_id identifies a person; keep it out of debug logs.
        f.debug_struct("Config")
            .field("database_path", &self.database_path)
            .field("user_id", &self.user_id.map(|_| "[set]"))
            .field("tick_interval_ms", &self.tick_interval_ms)
            .field("auto_chain", &self.auto_chain)
            .field("min_session_secs", &self.min_session_secs)
            .field("history_cap", &self.history_cap)
            .field("focus_minutes", &self.focus_minutes)
            .field("break_minutes", &self.break_minutes)
            .field("mirror_path", &self.mirror_path)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("ft.db"),
            user_id: None,
            tick_interval_ms: 500,
            auto_chain: false,
            min_session_secs: 0,
            history_cap: DEFAULT_HISTORY_CAP,
            focus_minutes: DEFAULT_FOCUS_MINUTES,
            break_minutes: DEFAULT_BREAK_MINUTES,
            mirror_path: None,
        }
    }
}

impl Config {
    /// Loads configuration from default locations.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (FT_*)
        figment = figment.merge(Env::prefixed("FT_"));

        figment.extract()
    }

    pub fn identity(&self) -> Identity {
        Identity::from_user_id(self.user_id)
    }

    pub const fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            auto_chain: self.auto_chain,
            min_session_secs: self.min_session_secs,
        }
    }

    pub fn focus_countdown(&self) -> CountdownMinutes {
        CountdownMinutes::clamped(self.focus_minutes)
    }

    pub fn break_countdown(&self) -> CountdownMinutes {
        CountdownMinutes::clamped(self.break_minutes)
    }
}

/// Returns the platform-specific config directory for ft.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("ft"))
}

/// Returns the platform-specific data directory for ft.
///
/// On Linux: `~/.local/share/ft`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("ft"))
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;

    #[test]
    fn test_dirs_data_path_ends_with_ft() {
        let path = dirs_data_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "ft");
    }

    #[test]
    fn test_default_config_uses_data_dir_for_db() {
        let config = Config::default();
        let data_dir = dirs_data_path().unwrap();
        assert_eq!(config.database_path, data_dir.join("ft.db"));
        assert_eq!(config.history_cap, 2000);
        assert!(!config.auto_chain);
        assert!(config.identity().is_anonymous());
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "database_path = \"/tmp/ft-test.db\"\nuser_id = 42\nauto_chain = true\nfocus_minutes = 500"
        )
        .unwrap();

        let config = Config::load_from(Some(file.path())).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/ft-test.db"));
        assert_eq!(config.identity(), Identity::Telegram(42));
        assert!(config.engine_config().auto_chain);
        assert_eq!(config.focus_countdown().minutes(), 240);
        assert_eq!(config.tick_interval_ms, 500);
    }

    #[test]
    fn test_debug_hides_user_id() {
        let config = Config {
            user_id: Some(123_456),
            ..Config::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("123456"));
        assert!(debug.contains("[set]"));
    }
}
