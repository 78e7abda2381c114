use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::PathBuf,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::entry::config::DEFAULT_LOOKUP_TIMEOUT;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum InputMode {
    #[default]
    Numeric,
    Menu,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EntrySettings {
    pub input_mode: InputMode,
    pub fixed_observer: Option<String>,
    pub active_observers_only: bool,
    pub region_lookup_timeout_ms: u64,
}

impl Default for EntrySettings {
    fn default() -> Self {
        Self {
            input_mode: InputMode::Numeric,
            fixed_observer: None,
            active_observers_only: false,
            region_lookup_timeout_ms: DEFAULT_LOOKUP_TIMEOUT.as_millis() as u64,
        }
    }
}

impl EntrySettings {
    fn validate(&self) -> Result<()> {
        if let Some(code) = &self.fixed_observer {
            let mut chars = code.chars();
            let well_formed = matches!(
                (chars.next(), chars.next(), chars.next()),
                (Some(lead), Some(trail), None)
                    if lead.is_ascii_alphanumeric() && trail.is_ascii_digit()
            );
            if !well_formed {
                bail!("fixed observer must be a two-character code, got '{code}'");
            }
        }
        if self.region_lookup_timeout_ms == 0 {
            bail!("region lookup timeout must be greater than zero");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct UserSettings {
    #[serde(default)]
    entry: EntrySettings,
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            match serde_json::from_str::<UserSettings>(&contents) {
                Ok(data) => match data.entry.validate() {
                    Ok(()) => data,
                    Err(err) => {
                        log::warn!("Ignoring invalid settings at {}: {err}", path.display());
                        UserSettings::default()
                    }
                },
                Err(err) => {
                    log::warn!("Ignoring unreadable settings at {}: {err}", path.display());
                    UserSettings::default()
                }
            }
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn entry(&self) -> EntrySettings {
        self.read().entry.clone()
    }

    pub fn update_entry(&self, settings: EntrySettings) -> Result<()> {
        settings.validate()?;
        let mut guard = self.write();
        guard.entry = settings;
        self.persist(&guard)
    }

    fn read(&self) -> RwLockReadGuard<'_, UserSettings> {
        self.data.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, UserSettings> {
        self.data.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json")).unwrap();
        let settings = store.entry();
        assert_eq!(settings.input_mode, InputMode::Numeric);
        assert_eq!(settings.region_lookup_timeout_ms, 3000);
        assert_eq!(settings.fixed_observer, None);
    }

    #[test]
    fn invalid_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        fs::write(&path, r#"{"entry":{"region_lookup_timeout_ms":0}}"#).unwrap();
        let store = SettingsStore::new(path.clone()).unwrap();
        assert_eq!(store.entry(), EntrySettings::default());

        fs::write(&path, r#"{"entry":{"fixed_observer":"4A","active_observers_only":true}}"#)
            .unwrap();
        let store = SettingsStore::new(path.clone()).unwrap();
        assert_eq!(store.entry().fixed_observer, None);
        assert!(!store.entry().active_observers_only);

        fs::write(&path, r#"{"entry":{"fixed_observer":"A3","region_lookup_timeout_ms":250}}"#)
            .unwrap();
        let store = SettingsStore::new(path).unwrap();
        assert_eq!(store.entry().fixed_observer.as_deref(), Some("A3"));
        assert_eq!(store.entry().region_lookup_timeout_ms, 250);
    }

    #[test]
    fn persists_updates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let store = SettingsStore::new(path.clone()).unwrap();
        store
            .update_entry(EntrySettings {
                input_mode: InputMode::Menu,
                fixed_observer: Some("A3".into()),
                active_observers_only: true,
                region_lookup_timeout_ms: 250,
            })
            .unwrap();

        let reopened = SettingsStore::new(path.clone()).unwrap();
        assert_eq!(reopened.entry().fixed_observer.as_deref(), Some("A3"));
        assert!(reopened.entry().active_observers_only);

        let raw = fs::read_to_string(path).unwrap();
        assert!(raw.contains("\"menu\""));
    }

    #[test]
    fn rejects_malformed_fixed_observer() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json")).unwrap();
        for code in ["4", "445", "4A"] {
            let settings = EntrySettings {
                fixed_observer: Some(code.into()),
                ..EntrySettings::default()
            };
            assert!(store.update_entry(settings).is_err(), "{code}");
        }
        assert_eq!(store.entry(), EntrySettings::default());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"entry":{"fixed_observer":"44"}}"#).unwrap();
        let store = SettingsStore::new(path).unwrap();
        assert_eq!(store.entry().fixed_observer.as_deref(), Some("44"));
        assert_eq!(store.entry().region_lookup_timeout_ms, 3000);
    }
}
