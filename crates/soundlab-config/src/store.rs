//! Keyed preset persistence.
//!
//! A [`PresetStore`] holds serialized preset documents by id. A
//! [`PresetLibrary`] pairs a store with a [`PresetCodec`] so callers deal
//! in engine states rather than text.

use std::collections::BTreeMap;

use chrono::{SecondsFormat, Utc};
use serde_json::Value;

use crate::defaults::EngineState;
use crate::error::ConfigError;
use crate::preset::{LoadedPreset, PresetCodec, PresetMetadata};
use crate::versions::DefaultsProvider;

/// Storage for serialized preset documents, keyed by id.
pub trait PresetStore {
    /// Insert or replace the document stored under `id`.
    fn put(&mut self, id: &str, document: &str) -> Result<(), ConfigError>;

    /// The document stored under `id`, or `None` if there is none.
    fn get(&self, id: &str) -> Result<Option<String>, ConfigError>;

    /// Every stored id, sorted.
    fn list(&self) -> Result<Vec<String>, ConfigError>;

    /// Remove the document stored under `id`. Returns whether one existed.
    fn delete(&mut self, id: &str) -> Result<bool, ConfigError>;
}

/// A preset store held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryPresetStore {
    documents: BTreeMap<String, String>,
}

impl MemoryPresetStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PresetStore for MemoryPresetStore {
    fn put(&mut self, id: &str, document: &str) -> Result<(), ConfigError> {
        self.documents.insert(id.to_string(), document.to_string());
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<String>, ConfigError> {
        Ok(self.documents.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<String>, ConfigError> {
        Ok(self.documents.keys().cloned().collect())
    }

    fn delete(&mut self, id: &str) -> Result<bool, ConfigError> {
        Ok(self.documents.remove(id).is_some())
    }
}

#[cfg(feature = "std")]
pub use file::FilePresetStore;

#[cfg(feature = "std")]
mod file {
    use std::fs;
    use std::io::ErrorKind;
    use std::path::{Path, PathBuf};

    use super::PresetStore;
    use crate::error::ConfigError;

    /// A preset store keeping one `<id>.json` file per preset in a directory.
    ///
    /// The directory is created on the first write.
    #[derive(Debug, Clone)]
    pub struct FilePresetStore {
        dir: PathBuf,
    }

    impl FilePresetStore {
        /// Store presets in `dir`.
        pub fn new(dir: impl Into<PathBuf>) -> Self {
            Self { dir: dir.into() }
        }

        /// The backing directory.
        pub fn dir(&self) -> &Path {
            &self.dir
        }

        /// File path for a preset id.
        pub fn path_for(&self, id: &str) -> Result<PathBuf, ConfigError> {
            if id.is_empty() || id.starts_with('.') || id.contains(['/', '\\']) {
                return Err(ConfigError::MalformedInput(format!("invalid preset id '{id}'")));
            }
            Ok(self.dir.join(format!("{id}.json")))
        }
    }

    impl PresetStore for FilePresetStore {
        fn put(&mut self, id: &str, document: &str) -> Result<(), ConfigError> {
            let path = self.path_for(id)?;
            fs::create_dir_all(&self.dir).map_err(|e| ConfigError::create_dir(&self.dir, e))?;
            fs::write(&path, document).map_err(|e| ConfigError::write_file(&path, e))?;
            tracing::debug!(id, path = %path.display(), "stored preset");
            Ok(())
        }

        fn get(&self, id: &str) -> Result<Option<String>, ConfigError> {
            let path = self.path_for(id)?;
            match fs::read_to_string(&path) {
                Ok(text) => Ok(Some(text)),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
                Err(e) => Err(ConfigError::read_file(&path, e)),
            }
        }

        fn list(&self) -> Result<Vec<String>, ConfigError> {
            let entries = match fs::read_dir(&self.dir) {
                Ok(entries) => entries,
                Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
                Err(e) => return Err(ConfigError::read_file(&self.dir, e)),
            };
            let mut ids: Vec<String> = entries
                .filter_map(Result::ok)
                .map(|entry| entry.path())
                .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
                .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(String::from))
                .collect();
            ids.sort();
            Ok(ids)
        }

        fn delete(&mut self, id: &str) -> Result<bool, ConfigError> {
            let path = self.path_for(id)?;
            match fs::remove_file(&path) {
                Ok(()) => Ok(true),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
                Err(e) => Err(ConfigError::write_file(&path, e)),
            }
        }
    }
}

/// Summary of a stored preset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetRecord {
    /// Store id.
    pub id: String,
    /// Display name, if the document carries one.
    pub name: Option<String>,
    /// Author, if the document carries one.
    pub author: Option<String>,
    /// Creation timestamp, if the document carries one.
    pub created_at: Option<String>,
    /// Modification timestamp, if the document carries one.
    pub updated_at: Option<String>,
}

impl PresetRecord {
    fn from_document(id: &str, doc: &Value) -> Self {
        let field = |key: &str| doc.get(key).and_then(Value::as_str).map(String::from);
        Self {
            id: id.to_string(),
            name: field("name"),
            author: field("author"),
            created_at: field("createdAt"),
            updated_at: field("updatedAt"),
        }
    }
}

/// Saves and loads engine states through a [`PresetStore`].
///
/// # Example
///
/// ```rust
/// use soundlab_config::{
///     BuiltinDefaults, MemoryPresetStore, PresetCodec, PresetLibrary, PresetMetadata,
///     default_engine_state,
/// };
///
/// let codec = PresetCodec::new(BuiltinDefaults::new().unwrap());
/// let mut library = PresetLibrary::new(MemoryPresetStore::new(), codec);
///
/// let state = default_engine_state().unwrap();
/// library.save("init", &state, &PresetMetadata::new("Init", "me")).unwrap();
///
/// let loaded = library.load("init").unwrap().unwrap();
/// assert_eq!(loaded.engine_state, *state);
/// assert!(library.load("missing").unwrap().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct PresetLibrary<S, P> {
    store: S,
    codec: PresetCodec<P>,
}

impl<S: PresetStore, P: DefaultsProvider> PresetLibrary<S, P> {
    /// Pair a store with a codec.
    pub fn new(store: S, codec: PresetCodec<P>) -> Self {
        Self { store, codec }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The codec used to encode and decode presets.
    pub fn codec(&self) -> &PresetCodec<P> {
        &self.codec
    }

    /// Encode `state` and store it under `id`, replacing any existing preset.
    ///
    /// `updatedAt` is stamped with the current time. `createdAt` comes from
    /// `metadata`, then from the preset being replaced, then the current time.
    pub fn save(
        &mut self,
        id: &str,
        state: &EngineState,
        metadata: &PresetMetadata,
    ) -> Result<(), ConfigError> {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let mut metadata = metadata.clone();
        if metadata.created_at.is_none() {
            metadata.created_at = self.created_at(id).or_else(|| Some(now.clone()));
        }
        metadata.updated_at = Some(now);

        let document = self.codec.save(state, &metadata, true)?;
        self.store.put(id, &document)
    }

    fn created_at(&self, id: &str) -> Option<String> {
        let document = self.store.get(id).ok()??;
        let doc: Value = serde_json::from_str(&document).ok()?;
        PresetRecord::from_document(id, &doc).created_at
    }

    /// Store a document as given after checking that it loads.
    pub fn put_document(&mut self, id: &str, document: &str) -> Result<LoadedPreset, ConfigError> {
        let loaded = self.codec.import(document)?;
        self.store.put(id, document)?;
        Ok(loaded)
    }

    /// Load the preset stored under `id`.
    ///
    /// Returns `Ok(None)` if nothing is stored under `id`. A stored document
    /// that no longer loads is an error.
    pub fn load(&self, id: &str) -> Result<Option<LoadedPreset>, ConfigError> {
        let Some(document) = self.store.get(id)? else {
            return Ok(None);
        };
        match self.codec.import(&document) {
            Ok(loaded) => Ok(Some(loaded)),
            Err(err) => {
                tracing::warn!(id, error = %err, "stored preset is corrupted");
                Err(err)
            }
        }
    }

    /// The raw stored document for `id`.
    pub fn document(&self, id: &str) -> Result<Option<String>, ConfigError> {
        self.store.get(id)
    }

    /// Summaries of every stored preset, sorted by id.
    ///
    /// Documents that are not valid JSON are listed with empty fields.
    pub fn list(&self) -> Result<Vec<PresetRecord>, ConfigError> {
        let mut records = Vec::new();
        for id in self.store.list()? {
            let Some(document) = self.store.get(&id)? else {
                continue;
            };
            let doc = serde_json::from_str(&document).unwrap_or_else(|e| {
                tracing::warn!(id = %id, error = %e, "unreadable preset document");
                Value::Null
            });
            records.push(PresetRecord::from_document(&id, &doc));
        }
        Ok(records)
    }

    /// Whether a preset is stored under `id`.
    pub fn contains(&self, id: &str) -> Result<bool, ConfigError> {
        Ok(self.store.get(id)?.is_some())
    }

    /// Remove the preset stored under `id`. Returns whether one existed.
    pub fn delete(&mut self, id: &str) -> Result<bool, ConfigError> {
        self.store.delete(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::default_engine_state;
    use crate::versions::BuiltinDefaults;
    use serde_json::json;

    fn library<S: PresetStore>(store: S) -> PresetLibrary<S, BuiltinDefaults> {
        PresetLibrary::new(store, PresetCodec::new(BuiltinDefaults::new().unwrap()))
    }

    fn tweaked_state() -> EngineState {
        let mut state = (*default_engine_state().unwrap()).clone();
        state.params["fx"]["reverb"]["enabled"] = json!(true);
        state.params["fx"]["reverb"]["amount"] = json!(0.35);
        state
    }

    // --- memory store ---

    #[test]
    fn test_memory_store_basics() {
        let mut store = MemoryPresetStore::new();
        store.put("b", "{}").unwrap();
        store.put("a", "[]").unwrap();
        assert_eq!(store.list().unwrap(), vec!["a", "b"]);
        assert_eq!(store.get("a").unwrap().as_deref(), Some("[]"));
        assert!(store.delete("a").unwrap());
        assert!(!store.delete("a").unwrap());
        assert!(store.get("a").unwrap().is_none());
    }

    // --- file store ---

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FilePresetStore::new(dir.path().join("presets"));
        assert!(store.list().unwrap().is_empty());

        store.put("pad", r#"{"name": "Pad"}"#).unwrap();
        assert_eq!(store.list().unwrap(), vec!["pad"]);
        assert_eq!(
            store.get("pad").unwrap().as_deref(),
            Some(r#"{"name": "Pad"}"#)
        );
        assert!(store.get("lead").unwrap().is_none());
        assert!(store.delete("pad").unwrap());
        assert!(!store.delete("pad").unwrap());
    }

    #[test]
    fn test_file_store_rejects_path_ids() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FilePresetStore::new(dir.path());
        assert!(matches!(
            store.put("../escape", "{}"),
            Err(ConfigError::MalformedInput(_))
        ));
        assert!(store.get("").is_err());
    }

    // --- library ---

    #[test]
    fn test_library_save_load() {
        let mut lib = library(MemoryPresetStore::new());
        let state = tweaked_state();
        lib.save("verb", &state, &PresetMetadata::new("Verb", "me"))
            .unwrap();

        let loaded = lib.load("verb").unwrap().unwrap();
        assert_eq!(loaded.engine_state, state);
        assert_eq!(loaded.metadata.author.as_deref(), Some("me"));
    }

    #[test]
    fn test_library_missing_is_none() {
        let lib = library(MemoryPresetStore::new());
        assert!(lib.load("nothing").unwrap().is_none());
    }

    #[test]
    fn test_library_corrupted_is_error() {
        let mut store = MemoryPresetStore::new();
        store.put("broken", "{not json").unwrap();
        store.put("bogus", r#"{"engineVersion": "1.0.0"}"#).unwrap();
        let lib = library(store);
        assert!(lib.load("broken").is_err());
        assert!(matches!(lib.load("bogus"), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_library_list_records() {
        let mut lib = library(MemoryPresetStore::new());
        let meta = PresetMetadata::new("Verb", "me").with_timestamps("2024-01-01", "2024-02-01");
        lib.save("verb", &tweaked_state(), &meta).unwrap();
        lib.save(
            "init",
            &default_engine_state().unwrap(),
            &PresetMetadata::new("Init", "factory"),
        )
        .unwrap();

        let records = lib.list().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "init");
        assert_eq!(records[1].name.as_deref(), Some("Verb"));
        assert_eq!(records[1].created_at.as_deref(), Some("2024-01-01"));
    }

    #[test]
    fn test_library_save_stamps_timestamps() {
        let mut lib = library(MemoryPresetStore::new());
        lib.save("pad", &tweaked_state(), &PresetMetadata::new("Pad", "me"))
            .unwrap();

        let first = lib.list().unwrap().remove(0);
        let created = first.created_at.clone().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(&created).is_ok());
        assert!(first.updated_at.is_some());

        // Saving again keeps the original creation time
        lib.save("pad", &tweaked_state(), &PresetMetadata::new("Pad", "me"))
            .unwrap();
        let second = lib.list().unwrap().remove(0);
        assert_eq!(second.created_at.as_deref(), Some(created.as_str()));
        assert!(second.updated_at.as_deref() >= first.updated_at.as_deref());
    }

    #[test]
    fn test_library_save_refreshes_updated_at() {
        let mut lib = library(MemoryPresetStore::new());
        let meta = PresetMetadata::new("Verb", "me").with_timestamps("2024-01-01", "2024-02-01");
        lib.save("verb", &tweaked_state(), &meta).unwrap();

        let record = lib.list().unwrap().remove(0);
        assert_eq!(record.created_at.as_deref(), Some("2024-01-01"));
        assert_ne!(record.updated_at.as_deref(), Some("2024-02-01"));
    }

    #[test]
    fn test_library_put_document_checks_first() {
        let mut lib = library(MemoryPresetStore::new());
        assert!(lib.put_document("bad", r#"{"name": 1}"#).is_err());
        assert!(!lib.contains("bad").unwrap());
    }

    #[test]
    fn test_library_delete() {
        let mut lib = library(MemoryPresetStore::new());
        lib.save("x", &tweaked_state(), &PresetMetadata::new("X", "me"))
            .unwrap();
        assert!(lib.delete("x").unwrap());
        assert!(!lib.contains("x").unwrap());
    }
}
