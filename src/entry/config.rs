use std::time::Duration;

use crate::settings::EntrySettings;

pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryConfig {
    /// Upper bound on a region lookup before GG falls back to manual entry.
    pub lookup_timeout: Duration,
    /// Observer code every new session starts with.
    pub fixed_observer: Option<String>,
}

impl Default for EntryConfig {
    fn default() -> Self {
        Self {
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
            fixed_observer: None,
        }
    }
}

impl From<&EntrySettings> for EntryConfig {
    fn from(settings: &EntrySettings) -> Self {
        Self {
            lookup_timeout: Duration::from_millis(settings.region_lookup_timeout_ms),
            fixed_observer: settings.fixed_observer.clone(),
        }
    }
}
