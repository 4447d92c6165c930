//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// The countdown length was outside the allowed range.
    #[error("countdown must be between 1 and 240 minutes, got {value}")]
    CountdownOutOfRange { value: i64 },

    /// A statistics offset pointed past the current period.
    #[error("period offset must not be positive, got {offset}")]
    FutureOffset { offset: i32 },

    /// A custom statistics range ended before it started.
    #[error("custom range ends before it starts ({from} > {to})")]
    InvertedRange { from: i64, to: i64 },

    /// Invalid enum string.
    #[error("invalid {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
}

/// One of the two independent timing contexts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Focus,
    Break,
}

impl Phase {
    /// String representation for storage and display.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Focus => "focus",
            Self::Break => "break",
        }
    }

    /// The phase a toggle switches to.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Focus => Self::Break,
            Self::Break => Self::Focus,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Phase {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "focus" => Ok(Self::Focus),
            "break" => Ok(Self::Break),
            _ => Err(ValidationError::InvalidValue {
                field: "phase",
                value: s.to_string(),
            }),
        }
    }
}

/// Timing mode of a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerKind {
    /// Counts up, open-ended.
    Stopwatch,
    /// Counts down from a configured length.
    Countdown,
}

impl TimerKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Stopwatch => "stopwatch",
            Self::Countdown => "countdown",
        }
    }
}

impl fmt::Display for TimerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TimerKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stopwatch" => Ok(Self::Stopwatch),
            "countdown" => Ok(Self::Countdown),
            _ => Err(ValidationError::InvalidValue {
                field: "timer kind",
                value: s.to_string(),
            }),
        }
    }
}

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(
    /// A validated session identifier.
    ///
    /// Generated as a UUID when a session is recorded; imported sessions keep
    /// whatever non-empty identifier they were stored with.
    SessionId, "session ID"
);

define_string_id!(
    /// A validated project identifier.
    ProjectId, "project ID"
);

impl SessionId {
    /// Generates a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl ProjectId {
    /// Generates a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

/// A countdown length in whole minutes, in the range \[1, 240\].
///
/// The engine never stores an out-of-range length: user input goes through
/// [`CountdownMinutes::clamped`] and persisted values are clamped on
/// deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CountdownMinutes(u32);

impl CountdownMinutes {
    /// The shortest allowed countdown.
    pub const MIN: Self = Self(1);

    /// The longest allowed countdown (four hours).
    pub const MAX: Self = Self(240);

    /// Creates a countdown length after validation.
    pub fn new(minutes: i64) -> Result<Self, ValidationError> {
        if !(i64::from(Self::MIN.0)..=i64::from(Self::MAX.0)).contains(&minutes) {
            return Err(ValidationError::CountdownOutOfRange { value: minutes });
        }
        Ok(Self::clamped(minutes))
    }

    /// Creates a countdown length, clamping to \[1, 240\].
    #[must_use]
    pub fn clamped(minutes: i64) -> Self {
        let clamped = minutes.clamp(i64::from(Self::MIN.0), i64::from(Self::MAX.0));
        Self(u32::try_from(clamped).unwrap_or(Self::MIN.0))
    }

    /// Returns the length in minutes.
    #[must_use]
    pub const fn minutes(self) -> u32 {
        self.0
    }

    /// Returns the length in seconds.
    #[must_use]
    pub fn seconds(self) -> i64 {
        i64::from(self.0) * 60
    }
}

impl fmt::Display for CountdownMinutes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} min", self.0)
    }
}

impl Serialize for CountdownMinutes {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CountdownMinutes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        if !value.is_finite() {
            return Ok(Self::MIN);
        }
        // Clamp on deserialization to be lenient with stored data
        #[expect(
            clippy::cast_possible_truncation,
            reason = "value is clamped to the countdown range right after"
        )]
        let whole = value.trunc() as i64;
        Ok(Self::clamped(whole))
    }
}
