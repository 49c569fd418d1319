//! Application settings with change notification.
//!
//! A [`SettingsStore`] owns the current settings tree, the backend it is
//! persisted to, and the observers notified after every save. Stored
//! documents are merged over [`default_settings`], so keys added in newer
//! releases pick up their defaults.

use serde_json::{Map, Value};

use crate::defaults::build_group;
use crate::delta::merge;
use crate::engine_spec::settings_spec;
use crate::error::ConfigError;
use crate::path::ParamPath;
use crate::setters::set_value;
use crate::spec::SpecError;
use crate::validation::{ValidationError, validate_state};

/// Settings with every field at its default.
pub fn default_settings() -> Result<Map<String, Value>, SpecError> {
    build_group(settings_spec())
}

/// Check a settings tree against the settings schema.
pub fn validate_settings(settings: &Map<String, Value>) -> Vec<ValidationError> {
    validate_state(settings, settings_spec(), &ParamPath::root())
}

/// Where settings are persisted.
pub trait SettingsBackend {
    /// The stored settings document, or `None` if nothing was stored yet.
    fn read(&self) -> Result<Option<Map<String, Value>>, ConfigError>;

    /// Replace the stored settings document.
    fn write(&mut self, settings: &Map<String, Value>) -> Result<(), ConfigError>;
}

/// Settings kept in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySettingsBackend {
    stored: Option<Map<String, Value>>,
}

impl MemorySettingsBackend {
    /// A backend with nothing stored.
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend that already holds `document`.
    pub fn with_document(document: Map<String, Value>) -> Self {
        Self {
            stored: Some(document),
        }
    }

    /// The last written document.
    pub fn stored(&self) -> Option<&Map<String, Value>> {
        self.stored.as_ref()
    }
}

impl SettingsBackend for MemorySettingsBackend {
    fn read(&self) -> Result<Option<Map<String, Value>>, ConfigError> {
        Ok(self.stored.clone())
    }

    fn write(&mut self, settings: &Map<String, Value>) -> Result<(), ConfigError> {
        self.stored = Some(settings.clone());
        Ok(())
    }
}

#[cfg(feature = "std")]
pub use toml_backend::TomlSettingsBackend;

#[cfg(feature = "std")]
mod toml_backend {
    use std::fs;
    use std::path::{Path, PathBuf};

    use serde_json::{Map, Value};

    use super::SettingsBackend;
    use crate::error::ConfigError;

    /// Settings stored as a TOML file.
    #[derive(Debug, Clone)]
    pub struct TomlSettingsBackend {
        path: PathBuf,
    }

    impl TomlSettingsBackend {
        /// Persist settings at `path`.
        pub fn new(path: impl Into<PathBuf>) -> Self {
            Self { path: path.into() }
        }

        /// The settings file path.
        pub fn path(&self) -> &Path {
            &self.path
        }
    }

    impl SettingsBackend for TomlSettingsBackend {
        fn read(&self) -> Result<Option<Map<String, Value>>, ConfigError> {
            if !self.path.exists() {
                return Ok(None);
            }
            let text =
                fs::read_to_string(&self.path).map_err(|e| ConfigError::read_file(&self.path, e))?;
            Ok(Some(toml::from_str(&text)?))
        }

        fn write(&mut self, settings: &Map<String, Value>) -> Result<(), ConfigError> {
            let text = toml::to_string_pretty(settings)?;
            if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
            }
            fs::write(&self.path, text).map_err(|e| ConfigError::write_file(&self.path, e))
        }
    }
}

/// Handle returned by [`SettingsStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(&Map<String, Value>) + Send>;

/// The settings cache, its backend, and its observers.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use std::sync::{Arc, Mutex};
/// use soundlab_config::{MemorySettingsBackend, SettingsStore};
///
/// let mut store = SettingsStore::open(MemorySettingsBackend::new()).unwrap();
/// assert_eq!(store.get()["ui"]["theme"], json!("dark"));
///
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink = Arc::clone(&seen);
/// store.subscribe(move |settings| {
///     sink.lock().unwrap().push(settings["ui"]["theme"].clone());
/// });
///
/// store.update_setting(&"ui.theme".parse().unwrap(), json!("light")).unwrap();
/// assert_eq!(*seen.lock().unwrap(), vec![json!("light")]);
/// ```
pub struct SettingsStore<B> {
    backend: B,
    settings: Map<String, Value>,
    observers: Vec<(SubscriptionId, Observer)>,
    next_id: u64,
}

impl<B> std::fmt::Debug for SettingsStore<B>
where
    B: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsStore")
            .field("backend", &self.backend)
            .field("settings", &self.settings)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl<B: SettingsBackend> SettingsStore<B> {
    /// Load settings from `backend`, merged over the defaults.
    ///
    /// A stored document that cannot be parsed is replaced by the
    /// defaults. Schema findings are logged, not returned.
    pub fn open(backend: B) -> Result<Self, ConfigError> {
        let stored = match backend.read() {
            Ok(stored) => stored.unwrap_or_default(),
            Err(err @ ConfigError::TomlParse(_)) => {
                tracing::warn!(error = %err, "failed to parse settings, using defaults");
                Map::new()
            }
            Err(err) => return Err(err),
        };
        let settings = with_defaults(&stored)?;
        warn_findings(&settings);
        Ok(Self {
            backend,
            settings,
            observers: Vec::new(),
            next_id: 0,
        })
    }

    /// The current settings.
    pub fn get(&self) -> &Map<String, Value> {
        &self.settings
    }

    /// The value of a single setting.
    pub fn value(&self, path: &ParamPath) -> Option<&Value> {
        path.lookup(&self.settings)
    }

    /// The backend settings are persisted to.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Change one setting and save.
    ///
    /// The value is checked against the settings schema first; nothing is
    /// saved if it is rejected.
    pub fn update_setting(&mut self, path: &ParamPath, value: Value) -> Result<(), ConfigError> {
        let mut next = self.settings.clone();
        set_value(&mut next, settings_spec(), path, value)?;
        self.save(next)
    }

    /// Deep-merge `partial` into the settings and save.
    pub fn update_settings(&mut self, partial: &Map<String, Value>) -> Result<(), ConfigError> {
        let mut next = self.settings.clone();
        merge(&mut next, partial);
        self.save(next)
    }

    /// Restore every setting to its default and save.
    pub fn reset(&mut self) -> Result<(), ConfigError> {
        self.save(Map::new())
    }

    /// Merge `settings` over the defaults, persist, and notify observers.
    pub fn save(&mut self, settings: Map<String, Value>) -> Result<(), ConfigError> {
        let merged = with_defaults(&settings)?;
        warn_findings(&merged);
        self.backend.write(&merged)?;
        self.settings = merged;
        tracing::debug!(observers = self.observers.len(), "settings saved");
        for (_, observer) in &mut self.observers {
            observer(&self.settings);
        }
        Ok(())
    }

    /// Register an observer called with the new settings after every save.
    ///
    /// Observers run in subscription order.
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&Map<String, Value>) + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove an observer. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(other, _)| *other != id);
        self.observers.len() != before
    }
}

fn with_defaults(settings: &Map<String, Value>) -> Result<Map<String, Value>, ConfigError> {
    let mut merged = default_settings()?;
    merge(&mut merged, settings);
    Ok(merged)
}

fn warn_findings(settings: &Map<String, Value>) {
    for finding in validate_settings(settings) {
        tracing::warn!(%finding, "invalid setting");
    }
}
