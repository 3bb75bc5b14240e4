//! User preferences for the timer.
//!
//! Settings are persisted as a flat JSON object:
//!
//! ```json
//! {"work": 25, "short": 5, "long": 15, "cyclesBeforeLong": 4, "sound": true, "autoStart": false}
//! ```
//!
//! Anything read from storage or typed by the user goes through
//! [`SettingsCandidate`] first, so every [`Settings`] value in circulation has
//! positive durations and a cycle threshold of at least one.

mod candidate;
mod store;

pub use candidate::{parse_int_prefix, SettingsCandidate};
pub use store::{load_settings, persist_settings, SETTINGS_KEY};

use serde::{Deserialize, Serialize};

/// Normalized timer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Work period length in minutes.
    pub work: u32,
    /// Short break length in minutes.
    #[serde(rename = "short")]
    pub short_break: u32,
    /// Long break length in minutes.
    #[serde(rename = "long")]
    pub long_break: u32,
    /// Completed work periods between long breaks.
    pub cycles_before_long: u32,
    #[serde(rename = "sound")]
    pub sound_enabled: bool,
    /// Start the next period automatically after a transition.
    pub auto_start: bool,
}

pub const DEFAULT_WORK_MIN: u32 = 25;
pub const DEFAULT_SHORT_BREAK_MIN: u32 = 5;
pub const DEFAULT_LONG_BREAK_MIN: u32 = 15;
pub const DEFAULT_CYCLES_BEFORE_LONG: u32 = 4;

impl Default for Settings {
    fn default() -> Self {
        Self {
            work: DEFAULT_WORK_MIN,
            short_break: DEFAULT_SHORT_BREAK_MIN,
            long_break: DEFAULT_LONG_BREAK_MIN,
            cycles_before_long: DEFAULT_CYCLES_BEFORE_LONG,
            sound_enabled: true,
            auto_start: false,
        }
    }
}

impl Settings {
    /// Parse a stored settings payload.
    ///
    /// Missing or malformed payloads yield the defaults; present fields are
    /// normalized individually and merged over the defaults.
    pub fn from_stored_json(raw: &str) -> Self {
        match serde_json::from_str::<serde_json::Value>(raw) {
            Ok(value) if value.is_object() => {
                SettingsCandidate::from_value(&value).merge_over(&Settings::default())
            }
            Ok(_) => {
                tracing::warn!("Stored settings are not an object, using defaults");
                Settings::default()
            }
            Err(e) => {
                tracing::warn!("Stored settings are malformed, using defaults: {}", e);
                Settings::default()
            }
        }
    }

    /// Serialize to the stored JSON shape.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
