//! Error types for configuration operations.

use std::path::PathBuf;
use thiserror::Error;

use crate::path::PathError;
use crate::spec::SpecError;
use crate::validation::ValidationError;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A schema is malformed
    #[error("invalid schema: {0}")]
    Spec(#[from] SpecError),

    /// A parameter path is malformed or does not resolve
    #[error(transparent)]
    Path(#[from] PathError),

    /// Validation errors
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// A state could not be deep-copied
    #[error("failed to clone state: {0}")]
    Clone(#[source] serde_json::Error),

    /// No defaults are known for an engine version
    #[error("unknown engine version: {0}")]
    UnknownVersion(String),

    /// Input is not a well-formed preset document
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// Preset metadata carries no engine version
    #[error("preset metadata is missing 'engineVersion'")]
    MissingEngineVersion,

    /// Failed to encode or decode JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("failed to write file '{path}': {source}")]
    WriteFile {
        /// Path of the file that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to create directory
    #[error("failed to create directory '{path}': {source}")]
    CreateDir {
        /// Path of the directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Preset not found
    #[error("preset not found: {0}")]
    PresetNotFound(String),
}

impl ConfigError {
    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create a write file error.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::WriteFile {
            path: path.into(),
            source,
        }
    }

    /// Create a create directory error.
    pub fn create_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::CreateDir {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::path::Path;

    fn mock_io_err() -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::NotFound, "mock")
    }

    // --- factory methods ---

    #[test]
    fn file_factories_keep_path_and_source() {
        let presets = Path::new("presets/pad.json");
        let settings = Path::new("config/settings.toml");
        let dir = Path::new("config/presets");

        let read = ConfigError::read_file(presets, mock_io_err());
        assert!(matches!(read, ConfigError::ReadFile { ref path, .. } if path == presets));
        let write = ConfigError::write_file(settings, mock_io_err());
        assert!(matches!(write, ConfigError::WriteFile { ref path, .. } if path == settings));
        let create = ConfigError::create_dir(dir, mock_io_err());
        assert!(matches!(create, ConfigError::CreateDir { ref path, .. } if path == dir));

        for err in [read, write, create] {
            assert!(err.source().is_some(), "{err} must expose its I/O source");
        }
    }

    // --- conversions ---

    #[test]
    fn validation_error_converts() {
        let err: ConfigError = ValidationError::NotAnObject.into();
        assert_eq!(
            err.to_string(),
            "validation failed: Preset must be a JSON object."
        );
    }

    #[test]
    fn path_error_is_transparent() {
        let err: ConfigError = PathError::UnknownParameter {
            path: "osc.bogus".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "unknown parameter: osc.bogus");
    }

    #[test]
    fn json_error_converts() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: ConfigError = source.into();
        assert!(matches!(err, ConfigError::Json(_)));
        assert!(err.source().is_some());
    }

    // --- Display formatting ---

    #[test]
    fn file_errors_display_path() {
        let msg = ConfigError::read_file("presets/pad.json", mock_io_err()).to_string();
        assert_eq!(msg, "failed to read file 'presets/pad.json': mock");

        let msg = ConfigError::create_dir("config/presets", mock_io_err()).to_string();
        assert!(msg.starts_with("failed to create directory 'config/presets'"), "got: {msg}");
    }

    #[test]
    fn preset_not_found_display() {
        let err = ConfigError::PresetNotFound("my-preset".to_string());
        assert_eq!(err.to_string(), "preset not found: my-preset");
    }

    #[test]
    fn unknown_version_display() {
        let err = ConfigError::UnknownVersion("2.0.0".to_string());
        assert_eq!(err.to_string(), "unknown engine version: 2.0.0");
    }

    // --- source chain ---

    #[test]
    fn malformed_input_source_is_none() {
        let err = ConfigError::MalformedInput("bad".to_string());
        assert!(err.source().is_none());
    }
}
