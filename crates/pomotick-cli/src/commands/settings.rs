use clap::Subcommand;
use pomotick_core::settings::{load_settings, persist_settings};
use pomotick_core::{AppConfig, Settings, SettingsCandidate};
use serde_json::Value;

use pomotick_core::open_store;

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print the current settings as JSON
    Show,
    /// Change one or more settings; invalid numbers fall back to defaults
    Save {
        /// Work period in minutes
        #[arg(long, allow_hyphen_values = true)]
        work: Option<String>,
        /// Short break in minutes
        #[arg(long = "short", allow_hyphen_values = true)]
        short_break: Option<String>,
        /// Long break in minutes
        #[arg(long = "long", allow_hyphen_values = true)]
        long_break: Option<String>,
        /// Work periods before a long break
        #[arg(long = "cycles", allow_hyphen_values = true)]
        cycles_before_long: Option<String>,
        /// Ring the bell when a period ends
        #[arg(long)]
        sound: Option<bool>,
        /// Start the next period automatically
        #[arg(long)]
        auto_start: Option<bool>,
    },
    /// Restore default settings
    Reset,
}

pub fn run(action: SettingsAction, config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(config, false)?;
    let settings = match action {
        SettingsAction::Show => load_settings(&store),
        SettingsAction::Save {
            work,
            short_break,
            long_break,
            cycles_before_long,
            sound,
            auto_start,
        } => {
            let mut candidate = SettingsCandidate::from(&load_settings(&store));
            let raw = |value: Option<String>, current: Option<Value>| value.map(Value::String).or(current);
            candidate.work = raw(work, candidate.work.take());
            candidate.short_break = raw(short_break, candidate.short_break.take());
            candidate.long_break = raw(long_break, candidate.long_break.take());
            candidate.cycles_before_long =
                raw(cycles_before_long, candidate.cycles_before_long.take());
            if let Some(sound) = sound {
                candidate.sound_enabled = Some(Value::Bool(sound));
            }
            if let Some(auto_start) = auto_start {
                candidate.auto_start = Some(Value::Bool(auto_start));
            }
            let settings = candidate.normalize();
            persist_settings(&store, &settings)?;
            settings
        }
        SettingsAction::Reset => {
            let settings = Settings::default();
            persist_settings(&store, &settings)?;
            settings
        }
    };
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}
