//! Read-only view of the timer for front ends.

use serde::Serialize;

use crate::settings::Settings;
use crate::timer::TimerEngine;

/// What a display surface needs to draw the timer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
    /// Remaining time as `MM:SS`.
    pub formatted_time: String,
    pub mode_label: &'static str,
    pub cycles_completed: u64,
    /// Fraction of the current period already elapsed, in `[0, 1]`.
    pub progress_fraction: f64,
    pub running: bool,
}

impl Projection {
    pub fn new(engine: &TimerEngine, settings: &Settings) -> Self {
        Self {
            formatted_time: format_time(engine.remaining_secs()),
            mode_label: engine.mode().label(),
            cycles_completed: engine.completed_work_cycles(),
            progress_fraction: engine.progress(settings),
            running: engine.is_running(),
        }
    }

    /// One-line summary, e.g. `24:59 - Work`.
    pub fn title(&self) -> String {
        format!("{} - {}", self.formatted_time, self.mode_label)
    }

    /// Text progress bar of `width` cells.
    pub fn progress_bar(&self, width: usize) -> String {
        let filled = ((self.progress_fraction * width as f64).round() as usize).min(width);
        format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
    }
}

/// Format seconds as zero-padded `MM:SS`. Minutes do not roll over into hours.
pub fn format_time(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(59), "00:59");
        assert_eq!(format_time(25 * 60), "25:00");
        assert_eq!(format_time(61 * 60 + 5), "61:05");
        assert_eq!(format_time(100 * 60), "100:00");
    }

    #[test]
    fn fresh_projection() {
        let settings = Settings::default();
        let engine = TimerEngine::new(&settings);
        let projection = Projection::new(&engine, &settings);
        assert_eq!(projection.formatted_time, "25:00");
        assert_eq!(projection.mode_label, "Work");
        assert_eq!(projection.cycles_completed, 0);
        assert_eq!(projection.progress_fraction, 0.0);
        assert_eq!(projection.title(), "25:00 - Work");
        assert_eq!(projection.progress_bar(4), "[----]");
    }

    #[test]
    fn progress_tracks_elapsed_time() {
        let settings = Settings {
            work: 1,
            ..Settings::default()
        };
        let mut engine = TimerEngine::new(&settings);
        engine.adjust_time(-30, &settings);
        let projection = Projection::new(&engine, &settings);
        assert_eq!(projection.formatted_time, "00:30");
        assert!((projection.progress_fraction - 0.5).abs() < f64::EPSILON);
        assert_eq!(projection.progress_bar(10), "[#####-----]");
    }

    proptest! {
        #[test]
        fn formatted_time_round_trips(secs in 0u64..1_000_000) {
            let formatted = format_time(secs);
            let (m, s) = formatted.split_once(':').unwrap();
            prop_assert!(m.len() >= 2);
            prop_assert_eq!(s.len(), 2);
            prop_assert_eq!(m.parse::<u64>().unwrap() * 60 + s.parse::<u64>().unwrap(), secs);
        }

        #[test]
        fn progress_stays_in_unit_range(delta in -10_000i64..10_000) {
            let settings = Settings::default();
            let mut engine = TimerEngine::new(&settings);
            engine.adjust_time(delta, &settings);
            let p = Projection::new(&engine, &settings).progress_fraction;
            prop_assert!((0.0..=1.0).contains(&p));
        }
    }
}
