//! Shared CLI helpers used across multiple commands.

use std::path::Path;

use anyhow::Context;
use serde_json::Value;
use soundlab_config::{
    BuiltinDefaults, ConfigError, FilePresetStore, LoadedPreset, PresetCodec, PresetLibrary,
    factory_preset_text, user_presets_dir,
};

/// Library of user presets in the platform presets directory.
pub type UserLibrary = PresetLibrary<FilePresetStore, BuiltinDefaults>;

/// A codec over the built-in engine versions.
pub fn codec() -> anyhow::Result<PresetCodec<BuiltinDefaults>> {
    Ok(PresetCodec::new(BuiltinDefaults::new()?))
}

/// The user preset library.
pub fn user_library() -> anyhow::Result<UserLibrary> {
    Ok(PresetLibrary::new(
        FilePresetStore::new(user_presets_dir()),
        codec()?,
    ))
}

/// Read a text file with the path in the error message.
pub fn read_text(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read '{}'", path.display()))
}

/// Parse a command-line value: JSON if it parses, otherwise a plain string.
pub fn parse_value(s: &str) -> Value {
    serde_json::from_str(s).unwrap_or_else(|_| Value::String(s.to_string()))
}

/// Where a resolved preset came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetSource {
    Factory,
    User,
    File,
}

/// Resolve a preset by name or path to its document text.
///
/// Searches in this order:
/// 1. User presets (by id), so a user copy shadows a factory preset
/// 2. Factory presets (by name)
/// 3. File path
pub fn resolve_preset(library: &UserLibrary, name: &str) -> anyhow::Result<(PresetSource, String)> {
    match library.document(name) {
        Ok(Some(text)) => return Ok((PresetSource::User, text)),
        // not a valid preset id, so it can still be a factory name or a path
        Ok(None) | Err(ConfigError::MalformedInput(_)) => {}
        Err(e) => return Err(e.into()),
    }

    if let Some(text) = factory_preset_text(name) {
        return Ok((PresetSource::Factory, text.to_string()));
    }

    let path = Path::new(name);
    if path.is_file() {
        return Ok((PresetSource::File, read_text(path)?));
    }

    anyhow::bail!(
        "Preset '{}' not found. Use 'soundlab presets list' to see available presets.",
        name
    )
}

/// Resolve and load a preset by name or path.
pub fn load_preset(library: &UserLibrary, name: &str) -> anyhow::Result<(PresetSource, LoadedPreset)> {
    let (source, text) = resolve_preset(library, name)?;
    let loaded = library
        .codec()
        .import(&text)
        .with_context(|| format!("preset '{name}' does not load"))?;
    Ok((source, loaded))
}
