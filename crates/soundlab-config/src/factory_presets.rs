//! Factory presets bundled with the soundlab library.
//!
//! These are embedded preset documents that are always available without
//! external files. They load through the same codec as user presets.

use serde_json::Value;

use crate::error::ConfigError;
use crate::preset::{LoadedPreset, PresetCodec};
use crate::versions::DefaultsProvider;

/// Array of factory preset names for external access.
pub static FACTORY_PRESET_NAMES: &[&str] = &["init", "fm_bell", "warm_pad", "pluck", "legacy_lead"];

/// JSON content for factory presets.
static FACTORY_PRESETS_JSON: &[(&str, &str)] = &[
    ("init", INIT_PRESET),
    ("fm_bell", FM_BELL_PRESET),
    ("warm_pad", WARM_PAD_PRESET),
    ("pluck", PLUCK_PRESET),
    ("legacy_lead", LEGACY_LEAD_PRESET),
];

/// Initialization preset - every parameter at its default.
const INIT_PRESET: &str = r#"{
  "name": "Init",
  "author": "soundlab",
  "description": "Single sine oscillator, everything else at defaults",
  "tags": ["init"],
  "engineVersion": "1.0.0",
  "presetFormatVersion": "1.0"
}"#;

/// Inharmonic FM bell with a long release.
const FM_BELL_PRESET: &str = r#"{
  "name": "FM Bell",
  "author": "soundlab",
  "description": "Bright inharmonic bell with a decaying modulator",
  "tags": ["bell", "fm", "keys"],
  "genre": "ambient",
  "mood": "bright",
  "engineVersion": "1.0.0",
  "presetFormatVersion": "1.0",
  "ampEnv": {
    "attack": 0.005,
    "decay": 1.8,
    "release": 2.5,
    "sustain": 0.0
  },
  "fm": {
    "amount": 850,
    "enabled": true,
    "env": {
      "decay": 1.2,
      "enabled": true,
      "sustain": 0.1
    },
    "ratio": 3.5
  },
  "fx": {
    "reverb": {
      "amount": 0.4,
      "enabled": true,
      "type": "plate"
    }
  }
}"#;

/// Slow, detuned pad.
const WARM_PAD_PRESET: &str = r#"{
  "name": "Warm Pad",
  "author": "soundlab",
  "description": "Detuned saw and triangle blend through a slow filter",
  "tags": ["pad", "warm"],
  "mood": "calm",
  "engineVersion": "1.0.0",
  "presetFormatVersion": "1.0",
  "ampEnv": {
    "attack": 1.2,
    "release": 2.0,
    "sustain": 0.8
  },
  "fx": {
    "reverb": {
      "amount": 0.55,
      "enabled": true
    },
    "width": {
      "amount": 0.9
    }
  },
  "osc": {
    "detune": 7,
    "stereoSpread": 0.6,
    "waves": {
      "saw": 0.7,
      "sine": 0.3,
      "triangle": 0.4
    }
  },
  "vibrato": {
    "delay": 0.5,
    "depth": 8,
    "enabled": true,
    "rate": 4.5
  },
  "voiceFilter": {
    "cutoff": 1800,
    "env": {
      "attack": 1.5,
      "release": 1.8
    },
    "resonance": 0.15
  }
}"#;

/// Short plucked string.
const PLUCK_PRESET: &str = r#"{
  "name": "Pluck",
  "author": "soundlab",
  "description": "Short square pluck with a snappy filter envelope",
  "tags": ["pluck", "lead"],
  "engineVersion": "1.0.0",
  "presetFormatVersion": "1.0",
  "ampEnv": {
    "attack": 0.001,
    "decay": 0.25,
    "release": 0.15,
    "sustain": 0.0
  },
  "osc": {
    "waves": {
      "sine": 0.2,
      "square": 0.8
    }
  },
  "voiceFilter": {
    "cutoff": 600,
    "env": {
      "decay": 0.12,
      "sustain": 0.0
    },
    "envAmount": 0.9,
    "resonance": 0.35
  }
}"#;

/// Lead saved by the 0.9 engine, with modules hoisted to the top level.
const LEGACY_LEAD_PRESET: &str = r#"{
  "name": "Legacy Lead",
  "author": "soundlab",
  "description": "Gliding saw lead from the 0.9 engine",
  "tags": ["lead", "legacy"],
  "engineVersion": "0.9.0",
  "presetFormatVersion": "1.0",
  "fx": {
    "drive": {
      "amount": 0.3,
      "enabled": true,
      "type": "tube"
    }
  },
  "global": {
    "glide": 0.12
  },
  "osc": {
    "waves": {
      "saw": 1.0,
      "sine": 0.0
    }
  }
}"#;

/// Get all factory presets as raw documents.
///
/// Returns `(name, document)` pairs in the order of [`FACTORY_PRESET_NAMES`].
///
/// # Example
///
/// ```rust
/// use soundlab_config::factory_presets;
///
/// for (name, doc) in factory_presets() {
///     println!("{}: {}", name, doc["name"]);
/// }
/// ```
pub fn factory_presets() -> Vec<(&'static str, Value)> {
    FACTORY_PRESETS_JSON
        .iter()
        .filter_map(|(name, text)| match serde_json::from_str(text) {
            Ok(doc) => Some((*name, doc)),
            Err(e) => {
                tracing::warn!(name, error = %e, "failed to parse factory preset");
                None
            }
        })
        .collect()
}

/// Get the raw JSON text of a factory preset (case-insensitive).
pub fn factory_preset_text(name: &str) -> Option<&'static str> {
    FACTORY_PRESETS_JSON
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, text)| *text)
}

/// Get a specific factory preset document by name (case-insensitive).
pub fn get_factory_preset(name: &str) -> Option<Value> {
    factory_preset_text(name).and_then(|text| serde_json::from_str(text).ok())
}

/// Load a factory preset into a full engine state.
///
/// Fails with [`ConfigError::PresetNotFound`] for an unknown name.
pub fn load_factory_preset<P: DefaultsProvider>(
    codec: &PresetCodec<P>,
    name: &str,
) -> Result<LoadedPreset, ConfigError> {
    let text = factory_preset_text(name).ok_or_else(|| ConfigError::PresetNotFound(name.to_string()))?;
    codec.import(text)
}

/// Get the names of all factory presets.
pub fn factory_preset_names() -> &'static [&'static str] {
    FACTORY_PRESET_NAMES
}

/// Check if a name corresponds to a factory preset.
pub fn is_factory_preset(name: &str) -> bool {
    FACTORY_PRESET_NAMES
        .iter()
        .any(|n| n.eq_ignore_ascii_case(name))
}
