use tracing::{debug, warn};

use super::Settings;
use crate::error::StorageError;
use crate::storage::KeyValueStore;

/// Key holding the serialized settings.
pub const SETTINGS_KEY: &str = "pomodoro.settings";

/// Load settings from the store.
///
/// Never fails: a missing key, an unreadable store or a malformed payload all
/// yield defaults, and partial payloads merge over them.
pub fn load_settings<K: KeyValueStore + ?Sized>(store: &K) -> Settings {
    match store.get(SETTINGS_KEY) {
        Ok(Some(raw)) => Settings::from_stored_json(&raw),
        Ok(None) => {
            debug!("No stored settings, using defaults");
            Settings::default()
        }
        Err(e) => {
            warn!("Failed to read settings, using defaults: {}", e);
            Settings::default()
        }
    }
}

/// Write the full settings object to the store.
pub fn persist_settings<K: KeyValueStore + ?Sized>(
    store: &K,
    settings: &Settings,
) -> Result<(), StorageError> {
    let json = settings.to_json()?;
    store.set(SETTINGS_KEY, &json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn missing_key_gives_defaults() {
        let store = MemoryStore::new();
        assert_eq!(load_settings(&store), Settings::default());
    }

    #[test]
    fn persisted_settings_load_back() {
        let store = MemoryStore::new();
        let settings = Settings {
            work: 50,
            cycles_before_long: 2,
            auto_start: true,
            ..Settings::default()
        };
        persist_settings(&store, &settings).unwrap();
        assert_eq!(load_settings(&store), settings);
    }

    #[test]
    fn garbage_payload_gives_defaults() {
        let store = MemoryStore::new();
        store.set(SETTINGS_KEY, "\u{0}garbage").unwrap();
        assert_eq!(load_settings(&store), Settings::default());
    }
}
