//! Period transition policy.
//!
//! Decides what comes after a period ends. Pure: the result depends only on
//! the finishing mode, the cycle count and the settings.

use super::mode::Mode;
use crate::settings::Settings;

/// Outcome of ending a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextPeriod {
    pub mode: Mode,
    /// Work cycles completed after this transition.
    pub completed_work_cycles: u64,
    /// Seconds loaded for the new period.
    pub remaining_secs: u64,
}

/// Compute the period following `from`.
///
/// Ending a Work period counts a cycle; every `cycles_before_long`-th cycle
/// is followed by a long break. Breaks always return to Work.
pub fn next_period(from: Mode, completed_work_cycles: u64, settings: &Settings) -> NextPeriod {
    let (mode, completed_work_cycles) = match from {
        Mode::Work => {
            let cycles = completed_work_cycles.saturating_add(1);
            let every = u64::from(settings.cycles_before_long.max(1));
            let mode = if cycles % every == 0 {
                Mode::LongBreak
            } else {
                Mode::ShortBreak
            };
            (mode, cycles)
        }
        Mode::ShortBreak | Mode::LongBreak => (Mode::Work, completed_work_cycles),
    };
    NextPeriod {
        mode,
        completed_work_cycles,
        remaining_secs: mode.duration_secs(settings),
    }
}
