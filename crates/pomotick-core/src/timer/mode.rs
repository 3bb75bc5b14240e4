use serde::{Deserialize, Serialize};

use crate::settings::Settings;

/// The kind of period the timer is counting down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    #[serde(rename = "work")]
    Work,
    #[serde(rename = "short")]
    ShortBreak,
    #[serde(rename = "long")]
    LongBreak,
}

impl Mode {
    /// Human-readable label shown next to the countdown.
    pub fn label(self) -> &'static str {
        match self {
            Mode::Work => "Work",
            Mode::ShortBreak => "Short Break",
            Mode::LongBreak => "Long Break",
        }
    }

    pub fn is_break(self) -> bool {
        !matches!(self, Mode::Work)
    }

    /// Configured duration of this mode in minutes.
    pub fn duration_min(self, settings: &Settings) -> u32 {
        match self {
            Mode::Work => settings.work,
            Mode::ShortBreak => settings.short_break,
            Mode::LongBreak => settings.long_break,
        }
    }

    /// Configured duration of this mode in seconds.
    ///
    /// Uses saturating arithmetic so absurd minute values cannot overflow.
    pub fn duration_secs(self, settings: &Settings) -> u64 {
        u64::from(self.duration_min(settings)).saturating_mul(60)
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
