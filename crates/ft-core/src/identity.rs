//! Who the stored data belongs to.

use std::fmt;

/// The user whose data is being read or written.
///
/// All persisted keys are namespaced by identity so switching users never
/// reads or overwrites another user's state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Identity {
    /// A Telegram user id.
    Telegram(i64),
    /// No identity available.
    #[default]
    Anonymous,
}

impl Identity {
    /// Identity for an optional user id.
    pub fn from_user_id(user_id: Option<i64>) -> Self {
        user_id.map_or(Self::Anonymous, Self::Telegram)
    }

    /// Key suffix, `tg_<id>` or `anon`.
    pub fn key(&self) -> String {
        match self {
            Self::Telegram(id) => format!("tg_{id}"),
            Self::Anonymous => "anon".to_string(),
        }
    }

    /// `base` namespaced to this identity, `"<base>_<identity>"`.
    pub fn namespaced(&self, base: &str) -> String {
        format!("{base}_{}", self.key())
    }

    pub const fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}
