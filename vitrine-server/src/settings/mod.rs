//! Durable panel settings
//!
//! Webhook endpoints and the tracked board message id live in a JSON file
//! under the work directory. Loaded once at startup, rewritten on every
//! mutation; readers always see the latest in-memory value.

use crate::utils::AppError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

/// Process-wide panel settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    /// Webhook owning the price-board message
    pub main_webhook: Option<String>,
    /// Webhook receiving delivery notifications
    pub delivery_webhook: Option<String>,
    /// Identifier of the canonical board message
    pub main_message_id: Option<String>,
}

impl AppSettings {
    /// Both values required for board synchronization, or None
    pub fn board_target(&self) -> Option<(&str, &str)> {
        match (self.main_webhook.as_deref(), self.main_message_id.as_deref()) {
            (Some(webhook), Some(message_id)) if !webhook.is_empty() && !message_id.is_empty() => {
                Some((webhook, message_id))
            }
            _ => None,
        }
    }
}

/// File-backed settings store
pub struct SettingsStore {
    path: PathBuf,
    inner: RwLock<AppSettings>,
}

impl SettingsStore {
    /// Load settings from `path`, falling back to defaults
    ///
    /// A missing file is normal on first run; a corrupt file is logged and
    /// replaced by defaults on the next save.
    pub fn load(path: PathBuf) -> Self {
        let settings = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(parsed) => {
                    tracing::info!(path = %path.display(), "Settings loaded");
                    parsed
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Settings file corrupt, using defaults");
                    AppSettings::default()
                }
            },
            Err(_) => AppSettings::default(),
        };
        Self {
            path,
            inner: RwLock::new(settings),
        }
    }

    /// Current settings snapshot
    pub fn snapshot(&self) -> AppSettings {
        self.inner.read().expect("settings lock poisoned").clone()
    }

    /// Mutate and persist immediately
    pub fn update(
        &self,
        mutate: impl FnOnce(&mut AppSettings),
    ) -> Result<AppSettings, AppError> {
        let snapshot = {
            let mut guard = self.inner.write().expect("settings lock poisoned");
            mutate(&mut guard);
            guard.clone()
        };
        let raw = serde_json::to_string_pretty(&snapshot)
            .map_err(|e| AppError::internal(format!("Failed to serialize settings: {e}")))?;
        fs::write(&self.path, raw)
            .map_err(|e| AppError::internal(format!("Failed to write settings file: {e}")))?;
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::load(dir.path().join("settings.json"));
        let settings = store.snapshot();
        assert!(settings.main_webhook.is_none());
        assert!(settings.board_target().is_none());
    }

    #[test]
    fn test_update_persists_across_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let store = SettingsStore::load(path.clone());
        store
            .update(|s| {
                s.main_webhook = Some("https://example.com/api/webhooks/1/x".into());
                s.main_message_id = Some("42".into());
            })
            .unwrap();

        let reloaded = SettingsStore::load(path);
        let settings = reloaded.snapshot();
        assert_eq!(settings.main_message_id.as_deref(), Some("42"));
        assert!(settings.board_target().is_some());
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{not json").unwrap();

        let store = SettingsStore::load(path);
        assert!(store.snapshot().main_webhook.is_none());
    }

    #[test]
    fn test_board_target_requires_both_values() {
        let settings = AppSettings {
            main_webhook: Some("https://example.com/hook".into()),
            delivery_webhook: None,
            main_message_id: None,
        };
        assert!(settings.board_target().is_none());
    }
}
