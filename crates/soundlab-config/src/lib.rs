//! Parameter schema, default state, and preset persistence for the soundlab synth engine.
//!
//! The engine's parameters are described by a declarative schema of named
//! groups and typed leaves. From it this crate derives the default state,
//! validates running states, and encodes presets as minimal diffs against
//! the defaults of the engine version they were saved with.
//!
//! # Features
//!
//! - **Schema**: Typed parameter leaves (number, boolean, enum) in nested groups
//! - **Defaults**: Shared, read-only default states per engine version
//! - **Validation**: Bounds and membership checks on states, strict key checks on presets
//! - **Presets**: Delta save/load with translation of the legacy `modules` layout
//! - **Stores**: Keyed preset storage in memory or on disk
//! - **Settings**: Application settings with change observers, persisted as TOML
//! - **Factory Presets**: Built-in presets for common sounds
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use soundlab_config::{
//!     BuiltinDefaults, PresetCodec, PresetMetadata, default_engine_state, set_param,
//!     validate_engine_state,
//! };
//!
//! let codec = PresetCodec::new(BuiltinDefaults::new().unwrap());
//!
//! // Start from a working copy of the defaults
//! let mut state = (*default_engine_state().unwrap()).clone();
//! set_param(&mut state, &"fm.enabled".parse().unwrap(), json!(true)).unwrap();
//! set_param(&mut state, &"fm.ratio".parse().unwrap(), json!(3.5)).unwrap();
//!
//! // Only the changed parameters are written
//! let text = codec.export(&state, &PresetMetadata::new("Bell", "me")).unwrap();
//! assert!(text.contains("\"ratio\": 3.5"));
//! assert!(!text.contains("\"osc\""));
//!
//! let loaded = codec.import(&text).unwrap();
//! assert_eq!(loaded.engine_state, state);
//! assert!(validate_engine_state(&loaded.engine_state).is_empty());
//! ```

mod defaults;
mod delta;
mod error;
mod path;
mod preset;
mod setters;
mod settings;
mod spec;
mod store;
mod versions;

/// Built-in engine and settings schemas.
pub mod engine_spec;

/// Schema-driven state validation and preset validation.
pub mod validation;

/// Factory presets bundled with the library.
pub mod factory_presets;

/// Platform-specific paths for presets and settings.
#[cfg(feature = "std")]
pub mod paths;

pub use defaults::{EngineState, build_defaults, build_group, clone_state, default_engine_state};
pub use delta::{
    compute_delta, extract_deltas, flatten_modules, merge, partition_document, sort_keys,
    values_equal,
};
pub use engine_spec::{
    ENGINE_VERSION, LEGACY_ENGINE_VERSION, MODULES_KEY, PRESET_FORMAT_VERSION, engine_spec,
    known_versions, legacy_engine_spec, schema_for_version, settings_spec,
};
pub use error::ConfigError;
pub use factory_presets::{
    FACTORY_PRESET_NAMES, factory_preset_names, factory_preset_text, factory_presets,
    get_factory_preset, is_factory_preset, load_factory_preset,
};
pub use path::{ParamPath, PathError};
pub use preset::{
    LoadedPreset, METADATA_FIELDS, MetadataType, PresetCodec, PresetMetadata, REQUIRED_METADATA,
    metadata_type,
};
pub use setters::{get_param, set_param, set_value, spec_leaf};
pub use settings::{
    MemorySettingsBackend, SettingsBackend, SettingsStore, SubscriptionId, default_settings,
    validate_settings,
};
pub use spec::{ParamKind, ParamLeaf, SpecError, SpecGroup, SpecNode};
pub use store::{MemoryPresetStore, PresetLibrary, PresetRecord, PresetStore};
pub use validation::{
    ValidationError, validate_engine_state, validate_leaf, validate_modules, validate_preset,
    validate_state,
};
pub use versions::{BuiltinDefaults, DefaultsProvider};

#[cfg(feature = "std")]
pub use paths::{
    ensure_user_config_dir, ensure_user_presets_dir, find_preset, settings_path, user_config_dir,
    user_presets_dir,
};
#[cfg(feature = "std")]
pub use settings::TomlSettingsBackend;
#[cfg(feature = "std")]
pub use store::FilePresetStore;
#[cfg(feature = "std")]
pub use versions::DirectoryDefaults;
