//! Settings persistence.
//!
//! A [`SettingsStore`] hands out resolved [`Settings`] and accepts loose
//! [`SettingsInput`] to save. Saving always normalizes first, so a store never
//! holds a value the presenter would have to second-guess.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use tempfile::NamedTempFile;

use crate::errors::StoreError;
use crate::settings::{Settings, SettingsInput};

/// Get/set contract for display settings.
pub trait SettingsStore: Send + Sync {
    /// Current settings, or defaults when nothing usable is stored.
    fn get(&self) -> Settings;

    /// Normalizes `input`, stores it, and returns what was stored.
    fn set(&self, input: SettingsInput) -> Result<Settings, StoreError>;

    /// Forgets stored settings so that [`SettingsStore::get`] returns defaults.
    fn clear(&self) -> Result<(), StoreError>;
}

/// Settings held in memory only.
///
/// Like [`JsonFileStore`], fields left out of a [`SettingsStore::set`] take
/// their value from the store's `defaults`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    defaults: SettingsInput,
    settings: RwLock<Option<Settings>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that reads as `defaults` until something is set.
    pub fn with_defaults(defaults: SettingsInput) -> Self {
        Self {
            defaults,
            settings: RwLock::new(None),
        }
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            defaults: SettingsInput::default(),
            settings: RwLock::new(Some(settings)),
        }
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self) -> Settings {
        self.settings
            .read()
            .clone()
            .unwrap_or_else(|| self.defaults.clone().normalize())
    }

    fn set(&self, input: SettingsInput) -> Result<Settings, StoreError> {
        let settings = self.defaults.clone().overlay(input).normalize();
        *self.settings.write() = Some(settings.clone());
        Ok(settings)
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.settings.write() = None;
        Ok(())
    }
}

/// Settings saved as a JSON file.
///
/// The file is read once and cached. A missing or unparseable file reads as
/// the store's `defaults` (normalized), with a warning for the latter. Fields
/// left out of a [`SettingsStore::set`] also take their value from `defaults`.
///
/// The cache lock is held for writing while the file is loaded, written or
/// removed, so a cached value never predates the last completed `set`.
/// Writes go to a temporary file that is renamed over the old one.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    defaults: SettingsInput,
    cache: RwLock<Option<Settings>>,
}

impl JsonFileStore {
    /// Opens a store at `path`. `defaults` applies whenever the file is absent.
    pub fn new<P: Into<PathBuf>>(path: P, defaults: SettingsInput) -> Self {
        Self {
            path: path.into(),
            defaults,
            cache: RwLock::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Settings {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No settings file at {}, using defaults", self.path.display());
                return self.defaults.clone().normalize();
            }
            Err(e) => {
                tracing::warn!(
                    "Could not read settings file {}: {e}. Using defaults",
                    self.path.display()
                );
                return self.defaults.clone().normalize();
            }
        };

        match serde_json::from_str::<SettingsInput>(&raw) {
            Ok(input) => self.defaults.clone().overlay(input).normalize(),
            Err(e) => {
                tracing::warn!(
                    "Settings file {} is not valid: {e}. Using defaults",
                    self.path.display()
                );
                self.defaults.clone().normalize()
            }
        }
    }

    /// Replaces the file in one rename so readers never see a partial write.
    fn write_file(&self, contents: &[u8]) -> Result<(), StoreError> {
        let dir = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let write_failed = |source| StoreError::WriteFailed {
            path: self.path.clone(),
            source,
        };

        std::fs::create_dir_all(dir).map_err(|source| StoreError::WriteFailed {
            path: dir.to_path_buf(),
            source,
        })?;
        let mut file = NamedTempFile::new_in(dir).map_err(write_failed)?;
        file.write_all(contents).map_err(write_failed)?;
        file.persist(&self.path).map_err(|e| write_failed(e.error))?;
        Ok(())
    }
}

impl SettingsStore for JsonFileStore {
    fn get(&self) -> Settings {
        if let Some(settings) = self.cache.read().as_ref() {
            return settings.clone();
        }

        let mut cache = self.cache.write();
        // another caller may have filled it while we waited
        if let Some(settings) = cache.as_ref() {
            return settings.clone();
        }
        let settings = self.load();
        *cache = Some(settings.clone());
        settings
    }

    fn set(&self, input: SettingsInput) -> Result<Settings, StoreError> {
        let settings = self.defaults.clone().overlay(input).normalize();
        let json = serde_json::to_string_pretty(&SettingsInput::from(&settings))?;

        let mut cache = self.cache.write();
        self.write_file(json.as_bytes())?;
        tracing::debug!("Saved settings to {}", self.path.display());

        *cache = Some(settings.clone());
        Ok(settings)
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut cache = self.cache.write();
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!("Removed settings file {}", self.path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(source) => {
                return Err(StoreError::RemoveFailed {
                    path: self.path.clone(),
                    source,
                });
            }
        }
        *cache = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::DisplayPosition;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store_defaults_when_unset() {
        let store = MemoryStore::new();
        assert_eq!(store.get(), Settings::default());
    }

    #[test]
    fn test_memory_store_set_normalizes() {
        let store = MemoryStore::new();
        let stored = store
            .set(SettingsInput {
                words_per_minute: Some(0),
                display_position: Some("bottom".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(stored.words_per_minute.get(), 200);
        assert_eq!(stored.display_position, DisplayPosition::Bottom);
        assert_eq!(store.get(), stored);
    }

    #[test]
    fn test_memory_store_clear() {
        let store = MemoryStore::with_settings(Settings {
            display_enabled: false,
            ..Default::default()
        });
        assert!(!store.get().display_enabled);
        store.clear().unwrap();
        assert_eq!(store.get(), Settings::default());
    }

    #[test]
    fn test_memory_store_set_fills_from_defaults() {
        let store = MemoryStore::with_defaults(SettingsInput {
            words_per_minute: Some(120),
            display_position: Some("bottom".to_string()),
            ..Default::default()
        });
        assert_eq!(store.get().words_per_minute.get(), 120);

        let stored = store
            .set(SettingsInput {
                display_position: Some("top".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(stored.words_per_minute.get(), 120);
        assert_eq!(stored.display_position, DisplayPosition::Top);

        store.clear().unwrap();
        assert_eq!(store.get().display_position, DisplayPosition::Bottom);
    }

    #[test]
    fn test_file_store_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(
            dir.path().join("settings.json"),
            SettingsInput {
                words_per_minute: Some(180),
                ..Default::default()
            },
        );
        assert_eq!(store.get().words_per_minute.get(), 180);
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/settings.json");

        let store = JsonFileStore::new(&path, SettingsInput::default());
        store
            .set(SettingsInput {
                words_per_minute: Some(240),
                eligible_content_categories: Some(vec!["page".to_string()]),
                ..Default::default()
            })
            .unwrap();
        assert!(path.is_file());

        let reopened = JsonFileStore::new(&path, SettingsInput::default());
        let settings = reopened.get();
        assert_eq!(settings.words_per_minute.get(), 240);
        assert!(settings.is_eligible("page"));
        assert!(!settings.is_eligible("post"));
    }

    #[test]
    fn test_file_store_corrupt_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = JsonFileStore::new(&path, SettingsInput::default());
        assert_eq!(store.get(), Settings::default());
    }

    #[test]
    fn test_file_store_normalizes_stored_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"words_per_minute": -3, "display_position": "middle", "display_template": "nothing"}"#,
        )
        .unwrap();

        let settings = JsonFileStore::new(&path, SettingsInput::default()).get();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_file_store_clear_removes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        let store = JsonFileStore::new(&path, SettingsInput::default());

        store
            .set(SettingsInput {
                display_enabled: Some(false),
                ..Default::default()
            })
            .unwrap();
        assert!(!store.get().display_enabled);

        store.clear().unwrap();
        assert!(!path.exists());
        assert!(store.get().display_enabled);

        // clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_file_store_get_racing_set_keeps_new_value() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");

        for wpm in 300..500i64 {
            // fresh store each round so get() has to load from disk
            let store = JsonFileStore::new(&path, SettingsInput::default());
            std::thread::scope(|scope| {
                scope.spawn(|| store.get());
                scope.spawn(|| {
                    store
                        .set(SettingsInput {
                            words_per_minute: Some(wpm),
                            ..Default::default()
                        })
                        .unwrap()
                });
            });
            assert_eq!(store.get().words_per_minute.get(), wpm as usize);
        }
    }

    #[test]
    fn test_file_store_readers_never_see_partial_writes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        let writer = JsonFileStore::new(&path, SettingsInput::default());
        writer
            .set(SettingsInput {
                words_per_minute: Some(300),
                ..Default::default()
            })
            .unwrap();

        std::thread::scope(|scope| {
            scope.spawn(|| {
                for wpm in 301..600 {
                    writer
                        .set(SettingsInput {
                            words_per_minute: Some(wpm),
                            ..Default::default()
                        })
                        .unwrap();
                }
            });
            for _ in 0..300 {
                let reader = JsonFileStore::new(&path, SettingsInput::default());
                assert!(reader.get().words_per_minute.get() >= 300);
            }
        });
    }
}
