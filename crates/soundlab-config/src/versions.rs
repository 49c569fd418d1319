//! Per-version default states.
//!
//! Presets store only what differs from the defaults of their engine
//! version, so loading one needs those defaults. A [`DefaultsProvider`]
//! resolves a version string to a shared, read-only default state.

use std::collections::HashMap;
use std::sync::Arc;

use crate::defaults::EngineState;
use crate::engine_spec::{known_versions, schema_for_version};
use crate::error::ConfigError;
use crate::spec::SpecError;

/// Resolves an engine version to its default state.
pub trait DefaultsProvider {
    /// The default state for `version`.
    ///
    /// Fails with [`ConfigError::UnknownVersion`] if the version is not known.
    fn defaults(&self, version: &str) -> Result<Arc<EngineState>, ConfigError>;

    /// Versions this provider can resolve, sorted.
    fn versions(&self) -> Vec<String>;
}

impl<T: DefaultsProvider + ?Sized> DefaultsProvider for Arc<T> {
    fn defaults(&self, version: &str) -> Result<Arc<EngineState>, ConfigError> {
        (**self).defaults(version)
    }

    fn versions(&self) -> Vec<String> {
        (**self).versions()
    }
}

impl<T: DefaultsProvider + ?Sized> DefaultsProvider for &T {
    fn defaults(&self, version: &str) -> Result<Arc<EngineState>, ConfigError> {
        (**self).defaults(version)
    }

    fn versions(&self) -> Vec<String> {
        (**self).versions()
    }
}

/// Defaults built from the schemas compiled into this crate.
#[derive(Debug, Clone)]
pub struct BuiltinDefaults {
    states: HashMap<String, Arc<EngineState>>,
}

impl BuiltinDefaults {
    /// Build the default state of every built-in schema.
    pub fn new() -> Result<Self, SpecError> {
        let mut states = HashMap::new();
        for &version in known_versions() {
            if let Some(spec) = schema_for_version(version) {
                states.insert(
                    version.to_string(),
                    Arc::new(EngineState::from_spec(version, spec)?),
                );
            }
        }
        Ok(Self { states })
    }

    /// Add or replace the defaults for a version.
    pub fn with_state(mut self, state: EngineState) -> Self {
        self.states.insert(state.version.clone(), Arc::new(state));
        self
    }
}

impl DefaultsProvider for BuiltinDefaults {
    fn defaults(&self, version: &str) -> Result<Arc<EngineState>, ConfigError> {
        self.states
            .get(version)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownVersion(version.to_string()))
    }

    fn versions(&self) -> Vec<String> {
        let mut versions: Vec<String> = self.states.keys().cloned().collect();
        versions.sort();
        versions
    }
}

#[cfg(feature = "std")]
pub use directory::DirectoryDefaults;

#[cfg(feature = "std")]
mod directory {
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    use serde_json::Value;

    use super::DefaultsProvider;
    use crate::defaults::EngineState;
    use crate::error::ConfigError;

    /// Defaults read from `<dir>/<version>.json`.
    ///
    /// Each file holds a bare parameter tree; the version comes from the
    /// file name. Files are read on every call.
    #[derive(Debug, Clone)]
    pub struct DirectoryDefaults {
        dir: PathBuf,
    }

    impl DirectoryDefaults {
        /// Read defaults from `dir`.
        pub fn new(dir: impl Into<PathBuf>) -> Self {
            Self { dir: dir.into() }
        }

        /// The directory defaults are read from.
        pub fn dir(&self) -> &Path {
            &self.dir
        }

        fn file_for(&self, version: &str) -> Option<PathBuf> {
            // versions name files; keep them inside the directory
            if version.is_empty() || version.contains(['/', '\\']) || version.starts_with('.') {
                return None;
            }
            Some(self.dir.join(format!("{version}.json")))
        }
    }

    impl DefaultsProvider for DirectoryDefaults {
        fn defaults(&self, version: &str) -> Result<Arc<EngineState>, ConfigError> {
            let path = self
                .file_for(version)
                .filter(|p| p.is_file())
                .ok_or_else(|| ConfigError::UnknownVersion(version.to_string()))?;

            let text = fs::read_to_string(&path).map_err(|e| ConfigError::read_file(&path, e))?;
            let params = match serde_json::from_str(&text)? {
                Value::Object(map) => map,
                _ => {
                    return Err(ConfigError::MalformedInput(format!(
                        "defaults file '{}' must hold a JSON object",
                        path.display()
                    )));
                }
            };
            tracing::debug!(version, path = %path.display(), "loaded defaults");
            Ok(Arc::new(EngineState::new(version, params)))
        }

        fn versions(&self) -> Vec<String> {
            let Ok(entries) = fs::read_dir(&self.dir) else {
                return Vec::new();
            };
            let mut versions: Vec<String> = entries
                .filter_map(Result::ok)
                .map(|entry| entry.path())
                .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
                .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(String::from))
                .collect();
            versions.sort();
            versions
        }
    }
}
