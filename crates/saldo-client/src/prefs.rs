//! Display preferences behind a small key-value interface

use saldo_core::{CoreError, CoreResult};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

/// Key holding the dark-mode flag
pub const DARK_MODE_KEY: &str = "darkMode";

/// Key-value storage for user preferences
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> CoreResult<()>;
}

/// Preferences kept for the lifetime of the process
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: Mutex<BTreeMap<String, String>>,
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Preferences stored as a flat YAML map
#[derive(Debug)]
pub struct FilePreferences {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl FilePreferences {
    /// Load the file; a missing file starts empty
    pub fn open(path: impl Into<PathBuf>) -> CoreResult<Self> {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => serde_yaml::from_str(&content).map_err(|e| CoreError::InvalidFormat {
                message: format!("{}: {}", path.display(), e),
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }
}

impl PreferenceStore for FilePreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = values.clone();
        next.insert(key.to_string(), value.to_string());

        let content = serde_yaml::to_string(&next).map_err(|e| CoreError::InvalidFormat {
            message: e.to_string(),
        })?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, content)?;
        *values = next;
        Ok(())
    }
}

/// Display settings read from a preference store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayPreferences {
    pub dark_mode: bool,
}

impl Default for DisplayPreferences {
    fn default() -> Self {
        Self { dark_mode: true }
    }
}

impl DisplayPreferences {
    /// Dark mode is on unless the stored flag is exactly `false`
    pub fn load(store: &dyn PreferenceStore) -> Self {
        Self {
            dark_mode: store.get(DARK_MODE_KEY).as_deref() != Some("false"),
        }
    }

    pub fn save(&self, store: &dyn PreferenceStore) -> CoreResult<()> {
        store.set(DARK_MODE_KEY, if self.dark_mode { "true" } else { "false" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dark_mode_defaults_on() {
        let store = MemoryPreferences::default();
        assert!(DisplayPreferences::load(&store).dark_mode);

        store.set(DARK_MODE_KEY, "garbage").unwrap();
        assert!(DisplayPreferences::load(&store).dark_mode);

        store.set(DARK_MODE_KEY, "false").unwrap();
        assert!(!DisplayPreferences::load(&store).dark_mode);
    }

    #[test]
    fn test_file_preferences_persist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs").join("preferences.yaml");

        let store = FilePreferences::open(&path).unwrap();
        assert!(store.get(DARK_MODE_KEY).is_none());
        DisplayPreferences { dark_mode: false }.save(&store).unwrap();

        let reopened = FilePreferences::open(&path).unwrap();
        assert_eq!(reopened.get(DARK_MODE_KEY).as_deref(), Some("false"));
        assert!(!DisplayPreferences::load(&reopened).dark_mode);
    }

    #[test]
    fn test_file_preferences_rejects_bad_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.yaml");
        std::fs::write(&path, "- not\n- a map\n").unwrap();
        assert!(matches!(
            FilePreferences::open(&path),
            Err(CoreError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_failed_write_keeps_previous_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.yaml");
        let store = FilePreferences::open(&path).unwrap();
        store.set(DARK_MODE_KEY, "true").unwrap();

        // a directory in place of the file makes the write fail
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        assert!(store.set(DARK_MODE_KEY, "false").is_err());
        assert_eq!(store.get(DARK_MODE_KEY).as_deref(), Some("true"));
    }
}
