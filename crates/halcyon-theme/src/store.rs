//! Persisted theme selection.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::registry::{DEFAULT_THEME, ThemeId};

/// Errors writing the persisted theme choice. Reads never error: invalid or
/// missing persisted values are treated as unset.
#[derive(Debug, thiserror::Error)]
pub enum ThemeStoreError {
    /// Failed to write the theme file to disk.
    #[error("failed to write theme choice: {0}")]
    WriteError(#[source] std::io::Error),

    /// Failed to serialize the theme choice.
    #[error("failed to serialize theme choice: {0}")]
    SerializeError(#[source] ron::Error),
}

#[derive(Serialize, Deserialize)]
struct PersistedChoice {
    theme: String,
}

/// The current theme, backed by a `theme.ron` file in the config directory.
///
/// Setting a theme is a pure state transition: it updates the persisted
/// preference and nothing else. Rendering reacts to `current()` elsewhere.
pub struct ThemeStore {
    current: ThemeId,
    path: PathBuf,
}

impl ThemeStore {
    /// Load the persisted choice from `dir/theme.ron`, falling back to the
    /// default theme when the file is missing, unreadable, or names an
    /// unknown theme.
    pub fn load(dir: &Path) -> Self {
        let path = dir.join("theme.ron");
        let current = std::fs::read_to_string(&path)
            .ok()
            .and_then(|contents| ron::from_str::<PersistedChoice>(&contents).ok())
            .and_then(|choice| match choice.theme.parse::<ThemeId>() {
                Ok(id) => Some(id),
                Err(()) => {
                    log::warn!(
                        "Ignoring unrecognized persisted theme {:?}",
                        choice.theme
                    );
                    None
                }
            })
            .unwrap_or(DEFAULT_THEME);
        Self { current, path }
    }

    /// The active theme.
    pub fn current(&self) -> ThemeId {
        self.current
    }

    /// Select a theme and persist the choice.
    pub fn set(&mut self, theme: ThemeId) -> Result<(), ThemeStoreError> {
        self.current = theme;
        self.persist()
    }

    /// Advance to the next theme in registry order, wrapping around.
    pub fn cycle(&mut self) -> Result<ThemeId, ThemeStoreError> {
        let next = self.current.next();
        self.set(next)?;
        Ok(next)
    }

    fn persist(&self) -> Result<(), ThemeStoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(ThemeStoreError::WriteError)?;
        }
        let choice = PersistedChoice {
            theme: self.current.to_string(),
        };
        let serialized = ron::to_string(&choice).map_err(ThemeStoreError::SerializeError)?;
        std::fs::write(&self.path, serialized).map_err(ThemeStoreError::WriteError)?;
        log::info!("Theme set to {}", self.current);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::THEMES;

    #[test]
    fn test_missing_file_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = ThemeStore::load(dir.path());
        assert_eq!(store.current(), DEFAULT_THEME);
    }

    #[test]
    fn test_set_persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ThemeStore::load(dir.path());
        store.set(ThemeId::Horizon).unwrap();

        let reloaded = ThemeStore::load(dir.path());
        assert_eq!(reloaded.current(), ThemeId::Horizon);
    }

    #[test]
    fn test_invalid_persisted_value_is_unset_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("theme.ron"), "(theme: \"plasma\")").unwrap();
        let store = ThemeStore::load(dir.path());
        assert_eq!(store.current(), DEFAULT_THEME);
    }

    #[test]
    fn test_corrupt_file_is_unset_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("theme.ron"), "{{garbage").unwrap();
        let store = ThemeStore::load(dir.path());
        assert_eq!(store.current(), DEFAULT_THEME);
    }

    #[test]
    fn test_cycle_visits_every_theme_and_wraps() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ThemeStore::load(dir.path());
        assert_eq!(store.current(), THEMES[0].id);

        for expected in THEMES.iter().skip(1) {
            assert_eq!(store.cycle().unwrap(), expected.id);
        }
        assert_eq!(store.cycle().unwrap(), THEMES[0].id);
    }
}
