//! Persistence for state that outlives a run: the ignore config, the history list and
//! user preferences. Each value lives in its own JSON file under one store directory.

use crate::assembler::Language;
use crate::config::IgnoreConfig;
use crate::history::History;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

pub const STORE_DIR_ENV: &str = "FOLDER2PROMPT_HOME";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to create store directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("No store directory: set FOLDER2PROMPT_HOME or pass --store-dir")]
    NoStoreDir,
}

/// Load-or-default and save for one persisted value.
pub trait PersistentStore<T> {
    /// Missing or unreadable state yields `T::default()`; never fails.
    fn load_or_default(&self) -> T;

    fn save(&self, value: &T) -> Result<(), StoreError>;
}

/// One pretty-printed JSON document per value.
#[derive(Debug, Clone)]
pub struct JsonFileStore<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonFileStore<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<T> PersistentStore<T> for JsonFileStore<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    fn load_or_default(&self) -> T {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %self.path.display(), error = %e, "unreadable store file, using defaults");
                }
                return T::default();
            }
        };
        serde_json::from_str(&text).unwrap_or_else(|e| {
            tracing::warn!(path = %self.path.display(), error = %e, "corrupt store file, using defaults");
            T::default()
        })
    }

    fn save(&self, value: &T) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let bytes = serde_json::to_vec_pretty(value).map_err(|source| StoreError::Serialize {
            path: self.path.clone(),
            source,
        })?;
        std::fs::write(&self.path, bytes).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!(path = %self.path.display(), "saved");
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Preferences {
    pub language: Language,
    /// Keep at most this many history records. `None` keeps everything.
    pub history_limit: Option<usize>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            language: Language::En,
            history_limit: None,
        }
    }
}

/// File layout of a store directory.
#[derive(Debug, Clone)]
pub struct StoreLayout {
    root: PathBuf,
}

impl StoreLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `--store-dir`, then `$FOLDER2PROMPT_HOME`, then the platform config dir.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, StoreError> {
        if let Some(p) = explicit {
            return Ok(Self::new(p));
        }
        if let Some(p) = std::env::var_os(STORE_DIR_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::new(PathBuf::from(p)));
        }
        dirs::config_dir()
            .map(|d| Self::new(d.join("folder2prompt")))
            .ok_or(StoreError::NoStoreDir)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ignore_config(&self) -> JsonFileStore<IgnoreConfig> {
        JsonFileStore::new(self.root.join("ignore_config.json"))
    }

    pub fn history(&self) -> JsonFileStore<History> {
        JsonFileStore::new(self.root.join("history.json"))
    }

    pub fn preferences(&self) -> JsonFileStore<Preferences> {
        JsonFileStore::new(self.root.join("preferences.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{HistoryRecord, NamingLabels};
    use tempfile::TempDir;

    #[test]
    fn missing_file_loads_defaults() {
        let tmp = TempDir::new().unwrap();
        let layout = StoreLayout::new(tmp.path());
        assert_eq!(layout.ignore_config().load_or_default(), IgnoreConfig::default());
        assert!(layout.history().load_or_default().is_empty());
        assert_eq!(layout.preferences().load_or_default(), Preferences::default());
    }

    #[test]
    fn corrupt_file_loads_defaults() {
        let tmp = TempDir::new().unwrap();
        let layout = StoreLayout::new(tmp.path());
        std::fs::write(tmp.path().join("ignore_config.json"), "[[[").unwrap();
        assert_eq!(layout.ignore_config().load_or_default(), IgnoreConfig::default());
    }

    #[test]
    fn save_creates_directory_and_round_trips() {
        let tmp = TempDir::new().unwrap();
        let layout = StoreLayout::new(tmp.path().join("nested/store"));

        let cfg = IgnoreConfig {
            ignored_dirs: vec!["vendor".into()],
            ignored_exts: vec![".lock".into()],
        };
        layout.ignore_config().save(&cfg).unwrap();
        assert_eq!(layout.ignore_config().load_or_default(), cfg);

        let text = std::fs::read_to_string(layout.root().join("ignore_config.json")).unwrap();
        assert!(text.contains("\"ignoredDirs\""));
    }

    #[test]
    fn history_persists_in_order() {
        let tmp = TempDir::new().unwrap();
        let store = StoreLayout::new(tmp.path()).history();

        let mut h = store.load_or_default();
        for id in ["first", "second"] {
            let r = HistoryRecord::build_with(&[], &[], id, &NamingLabels::default(), id.into(), 1);
            h.push_front(r, None);
        }
        store.save(&h).unwrap();

        let loaded = store.load_or_default();
        let ids: Vec<&str> = loaded.records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["second", "first"]);

        // Stored as a bare JSON array.
        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        assert!(raw.is_array());
    }

    #[test]
    fn preferences_tolerate_missing_fields() {
        let tmp = TempDir::new().unwrap();
        let store = StoreLayout::new(tmp.path()).preferences();
        std::fs::write(store.path(), r#"{"language":"zh"}"#).unwrap();
        let prefs = store.load_or_default();
        assert_eq!(prefs.language, Language::Zh);
        assert_eq!(prefs.history_limit, None);
    }

    #[test]
    fn explicit_store_dir_wins() {
        let layout = StoreLayout::resolve(Some(Path::new("/tmp/f2p-explicit"))).unwrap();
        assert_eq!(layout.root(), Path::new("/tmp/f2p-explicit"));
    }
}
