use pomotick_core::settings::load_settings;
use pomotick_core::{open_store, AppConfig, Projection, SessionSnapshot, TimerEngine};
use serde::Serialize;
use tracing::warn;

#[derive(Serialize)]
struct Status {
    /// Whether a run saved mid-period can be resumed with `run --resume`.
    resumable: bool,
    projection: Projection,
}

pub fn run(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(config, false)?;
    let settings = load_settings(&store);
    let saved = SessionSnapshot::load(&store).unwrap_or_else(|e| {
        warn!("Ignoring unreadable saved session: {}", e);
        None
    });

    // A saved session is shown the way `run --resume` brings it back: paused.
    let status = match saved {
        Some(snapshot) => Status {
            resumable: true,
            projection: Projection::new(&snapshot.paused_engine(), &settings),
        },
        None => Status {
            resumable: false,
            projection: Projection::new(&TimerEngine::new(&settings), &settings),
        },
    };
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}
