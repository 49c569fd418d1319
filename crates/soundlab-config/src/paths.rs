//! Platform-specific paths for presets and settings.
//!
//! # Directory Structure
//!
//! - **User config**: `~/.config/soundlab/` (Linux), `~/Library/Application Support/soundlab/` (macOS), `%APPDATA%\soundlab\` (Windows)
//! - **User presets**: `presets/` inside the user config directory, one `<id>.json` per preset
//! - **Settings**: `settings.toml` inside the user config directory
//!
//! Setting `SOUNDLAB_CONFIG_DIR` replaces the user config directory.
//!
//! # Example
//!
//! ```rust,no_run
//! use soundlab_config::paths;
//!
//! let presets_dir = paths::user_presets_dir();
//! println!("User presets: {:?}", presets_dir);
//!
//! if let Some(path) = paths::find_preset("warm_pad") {
//!     println!("Found preset at: {:?}", path);
//! }
//! ```

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Application name used for directory paths.
const APP_NAME: &str = "soundlab";

/// Subdirectory name for presets.
const PRESETS_SUBDIR: &str = "presets";

/// File name of the settings document.
const SETTINGS_FILE: &str = "settings.toml";

/// Environment variable overriding the user config directory.
pub const CONFIG_DIR_ENV: &str = "SOUNDLAB_CONFIG_DIR";

fn config_dir_from(override_dir: Option<PathBuf>) -> PathBuf {
    match override_dir {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_NAME),
    }
}

/// Returns the user-specific configuration directory.
///
/// # Platform Paths
///
/// - Linux: `~/.config/soundlab/`
/// - macOS: `~/Library/Application Support/soundlab/`
/// - Windows: `%APPDATA%\soundlab\`
///
/// Returns a fallback path if the config directory cannot be determined.
pub fn user_config_dir() -> PathBuf {
    config_dir_from(std::env::var_os(CONFIG_DIR_ENV).map(PathBuf::from))
}

/// Returns the user-specific presets directory.
pub fn user_presets_dir() -> PathBuf {
    user_config_dir().join(PRESETS_SUBDIR)
}

/// Returns the path of the settings file.
pub fn settings_path() -> PathBuf {
    user_config_dir().join(SETTINGS_FILE)
}

/// Find a preset file by name.
///
/// The name can be a path to an existing file, or a preset id looked up
/// in the user presets directory (with or without `.json` extension).
pub fn find_preset(name: &str) -> Option<PathBuf> {
    let path = PathBuf::from(name);
    if path.is_file() {
        return Some(path);
    }

    let filename = if name.ends_with(".json") {
        name.to_string()
    } else {
        format!("{name}.json")
    };
    let user_path = user_presets_dir().join(filename);
    user_path.is_file().then_some(user_path)
}

fn ensure_dir(dir: PathBuf) -> Result<PathBuf, ConfigError> {
    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| ConfigError::create_dir(&dir, e))?;
    }
    Ok(dir)
}

/// Ensure the user presets directory exists.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_user_presets_dir() -> Result<PathBuf, ConfigError> {
    ensure_dir(user_presets_dir())
}

/// Ensure the user config directory exists.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_user_config_dir() -> Result<PathBuf, ConfigError> {
    ensure_dir(user_config_dir())
}

/// Get the preset id from a file path.
///
/// ```rust
/// use soundlab_config::paths::preset_name_from_path;
/// use std::path::Path;
///
/// let name = preset_name_from_path(Path::new("/path/to/warm_pad.json"));
/// assert_eq!(name, Some("warm_pad".to_string()));
/// ```
pub fn preset_name_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
}
