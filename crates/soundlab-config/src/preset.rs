//! Preset document format and the save/load codec.
//!
//! A preset is a JSON object holding the preset's metadata followed by the
//! engine parameters that differ from the defaults of its `engineVersion`:
//!
//! ```json
//! {
//!   "name": "Glass Bell",
//!   "author": "soundlab",
//!   "engineVersion": "1.0.0",
//!   "presetFormatVersion": "1.0",
//!   "fm": {
//!     "enabled": true,
//!     "ratio": 3.5
//!   },
//!   "osc": {
//!     "frequency": 880.0
//!   }
//! }
//! ```
//!
//! Metadata keys appear in a fixed order; parameter keys are sorted at
//! every level, so saving the same state twice yields identical text.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::defaults::EngineState;
use crate::delta::{compute_delta, merge, partition_document};
use crate::engine_spec::{ENGINE_VERSION, PRESET_FORMAT_VERSION};
use crate::error::ConfigError;
use crate::validation::{ValidationError, validate_preset};
use crate::versions::DefaultsProvider;

/// The JSON type a metadata field must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataType {
    /// A string.
    String,
    /// An array of strings.
    StringList,
    /// A boolean.
    Boolean,
    /// A number.
    Number,
}

impl MetadataType {
    /// Whether `value` has this type.
    pub fn matches(self, value: &Value) -> bool {
        match self {
            MetadataType::String => value.is_string(),
            MetadataType::StringList => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
            MetadataType::Boolean => value.is_boolean(),
            MetadataType::Number => value.is_number(),
        }
    }
}

impl fmt::Display for MetadataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MetadataType::String => "a string",
            MetadataType::StringList => "an array of strings",
            MetadataType::Boolean => "a boolean",
            MetadataType::Number => "a number",
        })
    }
}

/// Metadata fields in document order.
pub const METADATA_FIELDS: &[(&str, MetadataType)] = &[
    ("name", MetadataType::String),
    ("author", MetadataType::String),
    ("description", MetadataType::String),
    ("tags", MetadataType::StringList),
    ("genre", MetadataType::String),
    ("mood", MetadataType::String),
    ("createdAt", MetadataType::String),
    ("updatedAt", MetadataType::String),
    ("favorite", MetadataType::Boolean),
    ("rating", MetadataType::Number),
    ("engineVersion", MetadataType::String),
    ("presetFormatVersion", MetadataType::String),
    ("uuid", MetadataType::String),
];

/// Metadata fields every preset must carry.
pub const REQUIRED_METADATA: &[&str] = &["name", "author", "engineVersion", "presetFormatVersion"];

/// The declared type of a metadata field, or `None` if `key` is not one.
pub fn metadata_type(key: &str) -> Option<MetadataType> {
    METADATA_FIELDS
        .iter()
        .find(|(field, _)| *field == key)
        .map(|(_, kind)| *kind)
}

/// Descriptive fields of a preset.
///
/// Field order matches the order keys are written to a preset document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetMetadata {
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Author name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Search tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    /// Musical genre.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,

    /// Mood descriptor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,

    /// Creation timestamp (ISO 8601).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    /// Last modification timestamp (ISO 8601).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,

    /// Marked as favorite.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorite: Option<bool>,

    /// User rating.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,

    /// Engine schema version the parameters are relative to.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub engine_version: String,

    /// Preset document format version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset_format_version: Option<String>,

    /// Stable identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,

    /// Unrecognized top-level keys found when loading. Never written.
    #[serde(skip)]
    pub extra: Map<String, Value>,
}

impl PresetMetadata {
    /// Metadata for a preset of the current engine and format versions.
    pub fn new(name: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            author: Some(author.into()),
            engine_version: ENGINE_VERSION.to_string(),
            preset_format_version: Some(PRESET_FORMAT_VERSION.to_string()),
            ..Self::default()
        }
    }

    /// Set the engine version.
    pub fn with_engine_version(mut self, version: impl Into<String>) -> Self {
        self.engine_version = version.into();
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the tags.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    /// Set the genre.
    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    /// Set the mood.
    pub fn with_mood(mut self, mood: impl Into<String>) -> Self {
        self.mood = Some(mood.into());
        self
    }

    /// Set creation and modification timestamps.
    pub fn with_timestamps(mut self, created_at: impl Into<String>, updated_at: impl Into<String>) -> Self {
        self.created_at = Some(created_at.into());
        self.updated_at = Some(updated_at.into());
        self
    }

    /// Set the favorite flag.
    pub fn with_favorite(mut self, favorite: bool) -> Self {
        self.favorite = Some(favorite);
        self
    }

    /// Set the rating.
    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }

    /// Set the identifier.
    pub fn with_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.uuid = Some(uuid.into());
        self
    }

    /// Metadata keys in document order, omitting unset fields.
    pub fn to_map(&self) -> Result<Map<String, Value>, ConfigError> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(ConfigError::MalformedInput(format!(
                "metadata serialized to {other} instead of an object"
            ))),
        }
    }

    /// Read metadata from the non-parameter keys of a document.
    ///
    /// Keys that are not metadata fields are kept in [`PresetMetadata::extra`].
    pub fn from_map(map: Map<String, Value>) -> Result<Self, ConfigError> {
        let (known, extra): (Map<String, Value>, Map<String, Value>) = map
            .into_iter()
            .partition(|(key, _)| metadata_type(key).is_some());
        let mut metadata: PresetMetadata = serde_json::from_value(Value::Object(known))
            .map_err(|e| ConfigError::MalformedInput(format!("invalid preset metadata: {e}")))?;
        metadata.extra = extra;
        Ok(metadata)
    }
}

/// The result of loading a preset.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedPreset {
    /// Full engine state: the version's defaults with the preset applied.
    pub engine_state: EngineState,
    /// The preset's metadata. Always carries `engine_version`.
    pub metadata: PresetMetadata,
}

/// Saves engine states as preset documents and loads them back.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use soundlab_config::{BuiltinDefaults, PresetCodec, PresetMetadata, default_engine_state};
///
/// let codec = PresetCodec::new(BuiltinDefaults::new().unwrap());
///
/// let mut state = (*default_engine_state().unwrap()).clone();
/// state.params["osc"]["frequency"] = json!(880.0);
///
/// let text = codec.save(&state, &PresetMetadata::new("Octave Up", "me"), false).unwrap();
/// assert!(text.ends_with(r#""osc":{"frequency":880.0}}"#));
///
/// let loaded = codec.import(&text).unwrap();
/// assert_eq!(loaded.engine_state, state);
/// ```
#[derive(Debug, Clone)]
pub struct PresetCodec<P> {
    provider: P,
}

impl<P: DefaultsProvider> PresetCodec<P> {
    /// Create a codec resolving defaults through `provider`.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// The defaults provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Build the preset document for `state` as an ordered JSON object.
    pub fn to_document(
        &self,
        state: &EngineState,
        metadata: &PresetMetadata,
    ) -> Result<Map<String, Value>, ConfigError> {
        let version = metadata.engine_version.as_str();
        if version.is_empty() {
            return Err(ConfigError::MissingEngineVersion);
        }
        if state.version != version {
            tracing::warn!(
                state_version = %state.version,
                preset_version = %version,
                "saving state against defaults of a different engine version"
            );
        }

        let defaults = self.provider.defaults(version)?;
        let delta = compute_delta(&state.params, &defaults.params);

        let mut document = metadata.to_map()?;
        for (key, value) in delta {
            // metadata wins on a name collision
            if !document.contains_key(&key) {
                document.insert(key, value);
            }
        }

        tracing::debug!(
            version,
            keys = document.len(),
            "built preset document"
        );
        Ok(document)
    }

    /// Serialize `state` as a preset document.
    ///
    /// `pretty` selects two-space indented output over compact output.
    pub fn save(
        &self,
        state: &EngineState,
        metadata: &PresetMetadata,
        pretty: bool,
    ) -> Result<String, ConfigError> {
        let document = Value::Object(self.to_document(state, metadata)?);
        let text = if pretty {
            serde_json::to_string_pretty(&document)?
        } else {
            serde_json::to_string(&document)?
        };
        Ok(text)
    }

    /// Serialize `state` as a pretty-printed preset document.
    pub fn export(&self, state: &EngineState, metadata: &PresetMetadata) -> Result<String, ConfigError> {
        self.save(state, metadata, true)
    }

    /// Validate a preset document and rebuild the full engine state.
    ///
    /// Any validation finding rejects the whole document; no partially
    /// merged state is returned.
    pub fn load(&self, doc: &Value) -> Result<LoadedPreset, ConfigError> {
        let errors = validate_preset(doc, &self.provider);
        if let Some(err) = ValidationError::from_list(errors) {
            tracing::warn!(error = %err, "rejected preset");
            return Err(match err {
                ValidationError::NotAnObject | ValidationError::MissingEngineVersion => {
                    ConfigError::MalformedInput(err.to_string())
                }
                ValidationError::UnknownVersion { version } => ConfigError::UnknownVersion(version),
                other => ConfigError::Validation(other),
            });
        }

        let object = doc
            .as_object()
            .ok_or_else(|| ConfigError::MalformedInput(ValidationError::NotAnObject.to_string()))?;
        let version = object
            .get("engineVersion")
            .and_then(Value::as_str)
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingEngineVersion)?;

        let defaults = self.provider.defaults(version)?;
        let (delta, mut rest) = partition_document(object, &defaults.params);

        rest.remove("version");
        rest.insert("engineVersion".to_string(), Value::String(version.to_string()));
        let metadata = PresetMetadata::from_map(rest)?;

        let mut params = defaults.params.clone();
        merge(&mut params, &delta);

        tracing::debug!(version, changed = delta.len(), "loaded preset");
        Ok(LoadedPreset {
            engine_state: EngineState::new(version, params),
            metadata,
        })
    }

    /// Parse JSON text and load it as a preset.
    pub fn import(&self, text: &str) -> Result<LoadedPreset, ConfigError> {
        let doc: Value = serde_json::from_str(text)
            .map_err(|e| ConfigError::MalformedInput(format!("invalid JSON: {e}")))?;
        self.load(&doc)
    }
}
