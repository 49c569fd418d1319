//! Integration tests for soundlab-config.
//!
//! These tests verify end-to-end behavior across the schema, validators,
//! delta codec, and stores.

use serde_json::{Map, Value, json};
use soundlab_config::{
    BuiltinDefaults, ConfigError, DefaultsProvider, EngineState, FilePresetStore,
    LEGACY_ENGINE_VERSION, PresetCodec, PresetLibrary, PresetMetadata, SettingsStore,
    TomlSettingsBackend, ValidationError, default_engine_state, extract_deltas,
    factory_presets, known_versions, merge, schema_for_version, validate_engine_state,
    validate_preset, validate_state,
};
use tempfile::TempDir;

fn provider() -> BuiltinDefaults {
    BuiltinDefaults::new().expect("built-in schemas should produce defaults")
}

fn codec() -> PresetCodec<BuiltinDefaults> {
    PresetCodec::new(provider())
}

fn metadata_for(version: &str) -> PresetMetadata {
    PresetMetadata::new("Integration", "tests").with_engine_version(version)
}

fn object(value: Value) -> Map<String, Value> {
    value.as_object().cloned().expect("test value should be an object")
}

/// Every version's defaults validate cleanly against that version's schema.
#[test]
fn test_defaults_are_valid_for_every_version() {
    let provider = provider();
    for version in known_versions() {
        let state = provider.defaults(version).unwrap();
        let errors = validate_engine_state(&state);
        assert!(errors.is_empty(), "defaults for {version}: {errors:?}");
    }
}

/// The worked example: a single changed frequency.
#[test]
fn test_concrete_delta_scenario() {
    let defaults = object(json!({"osc": {"frequency": 440, "waves": {"sine": 1, "triangle": 0}}}));
    let state = object(json!({"osc": {"frequency": 880, "waves": {"sine": 1, "triangle": 0}}}));

    let delta = extract_deltas(&state, &defaults);
    assert_eq!(Value::Object(delta.clone()), json!({"osc": {"frequency": 880}}));

    let mut restored = defaults.clone();
    merge(&mut restored, &delta);
    assert_eq!(restored, state);
    // defaults untouched
    assert_eq!(defaults["osc"]["frequency"], json!(440));
}

#[test]
fn test_defaults_produce_empty_delta() {
    let defaults = default_engine_state().unwrap();
    assert!(extract_deltas(&defaults.params, &defaults.params).is_empty());
}

/// Saving then loading reproduces the state.
#[test]
fn test_round_trip_current_version() {
    let codec = codec();
    let mut state = (*default_engine_state().unwrap()).clone();
    state.params["osc"]["waves"]["square"] = json!(0.75);
    state.params["pitchEnv"]["mode"] = json!("absolute");
    state.params["routing"]["globalFilterToFx"] = json!(false);

    let meta = metadata_for("1.0.0");
    let text = codec.save(&state, &meta, true).unwrap();
    let loaded = codec.import(&text).unwrap();
    assert_eq!(loaded.engine_state, state);

    // re-saving is byte-identical
    let again = codec.save(&loaded.engine_state, &meta, true).unwrap();
    assert_eq!(again, text);
}

/// Legacy groups nested under `modules` are stored flat and re-nested on load.
#[test]
fn test_modules_round_trip() {
    let codec = codec();
    let defaults = codec.provider().defaults(LEGACY_ENGINE_VERSION).unwrap();
    let mut state = (*defaults).clone();
    state.params["modules"]["vibrato"]["enabled"] = json!(true);
    state.params["modules"]["fx"]["noise"]["type"] = json!("pink");
    state.params["global"]["tuning"] = json!(432.0);

    let meta = metadata_for(LEGACY_ENGINE_VERSION);
    let text = codec.save(&state, &meta, false).unwrap();
    let doc: Value = serde_json::from_str(&text).unwrap();
    assert!(doc.get("modules").is_none());
    assert_eq!(doc["vibrato"], json!({"enabled": true}));
    assert_eq!(doc["fx"], json!({"noise": {"type": "pink"}}));
    assert_eq!(doc["global"], json!({"tuning": 432.0}));

    let loaded = codec.load(&doc).unwrap();
    assert_eq!(loaded.engine_state, state);
    assert_eq!(
        loaded.engine_state.params["modules"]["vibrato"]["enabled"],
        json!(true)
    );
}

/// Extra keys fail the preset validator but not the schema validator.
#[test]
fn test_unknown_field_asymmetry() {
    let provider = provider();
    let doc = json!({
        "name": "Extra",
        "author": "tests",
        "engineVersion": "1.0.0",
        "presetFormatVersion": "1.0",
        "osc": {"pulseWidth": 0.5}
    });
    let errors = validate_preset(&doc, &provider);
    assert_eq!(
        errors,
        vec![ValidationError::UnknownParameter {
            path: "osc.pulseWidth".to_string()
        }]
    );
    assert!(matches!(codec().load(&doc), Err(ConfigError::Validation(_))));

    // the same extra key on a live state is not a schema finding
    let mut state = (*default_engine_state().unwrap()).clone();
    state.params["osc"]["pulseWidth"] = json!(0.5);
    assert!(validate_engine_state(&state).is_empty());
}

/// Out-of-range values pass the type-only preset check and fail the schema check.
#[test]
fn test_bounds_rejection() {
    let mut state = (*default_engine_state().unwrap()).clone();
    state.params["osc"]["frequency"] = json!(-5);
    let errors = validate_engine_state(&state);
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].to_string(),
        "osc.frequency must be within [20, 20000] (got -5)"
    );

    let doc = json!({
        "name": "Negative",
        "author": "tests",
        "engineVersion": "1.0.0",
        "presetFormatVersion": "1.0",
        "osc": {"frequency": -5}
    });
    assert!(validate_preset(&doc, &provider()).is_empty());

    let loaded = codec().load(&doc).unwrap();
    let errors = validate_engine_state(&loaded.engine_state);
    assert!(matches!(
        errors.as_slice(),
        [ValidationError::OutOfRange { path, .. }] if path == "osc.frequency"
    ));
}

#[test]
fn test_enum_rejection() {
    let mut state = (*default_engine_state().unwrap()).clone();
    state.params["globalFilter"]["type"] = json!("notch");
    state.params["fm"]["waveform"] = json!("noise");

    let messages: Vec<String> = validate_engine_state(&state)
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(
        messages,
        vec![
            "fm.waveform must be one of [sine, triangle, square, saw] (got \"noise\")",
            "globalFilter.type must be one of [peaking, lowshelf, highshelf, bandpass] (got \"notch\")",
        ]
    );
}

#[test]
fn test_schema_validation_of_subtree() {
    let spec = schema_for_version("1.0.0").unwrap();
    let osc_spec = spec.get("osc").and_then(|n| n.as_group()).unwrap();
    let osc = object(json!({
        "enabled": true,
        "frequency": 440,
        "detune": 0,
        "inharmonicity": 0,
        "useInharmonicity": "no",
        "stereoSpread": 0,
        "waves": {"sine": 1, "triangle": 0, "square": 0, "saw": 2}
    }));
    let messages: Vec<String> = validate_state(&osc, osc_spec, &"osc".parse().unwrap())
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(messages.len(), 2);
    assert!(messages[0].starts_with("osc.useInharmonicity"), "{messages:?}");
    assert!(messages[1].starts_with("osc.waves.saw"), "{messages:?}");
}

#[test]
fn test_load_returns_independent_state() {
    let codec = codec();
    let doc = get_doc("warm_pad");
    let mut first = codec.load(&doc).unwrap().engine_state;
    let second = codec.load(&doc).unwrap().engine_state;
    first.params["osc"]["detune"] = json!(-12);
    assert_eq!(second.params["osc"]["detune"], json!(7));

    let defaults = codec.provider().defaults("1.0.0").unwrap();
    assert_eq!(defaults.params["osc"]["detune"], json!(0.0));
}

fn get_doc(name: &str) -> Value {
    factory_presets()
        .into_iter()
        .find(|(n, _)| *n == name)
        .map(|(_, doc)| doc)
        .expect("factory preset should exist")
}

#[test]
fn test_factory_presets_round_trip_through_library() {
    let temp_dir = TempDir::new().unwrap();
    let mut library = PresetLibrary::new(FilePresetStore::new(temp_dir.path()), codec());

    for (name, doc) in factory_presets() {
        let loaded = library.codec().load(&doc).unwrap();
        library
            .save(name, &loaded.engine_state, &loaded.metadata)
            .unwrap();
        let reloaded = library.load(name).unwrap().unwrap();
        assert_eq!(reloaded.engine_state, loaded.engine_state, "preset {name}");
    }

    let ids: Vec<String> = library.list().unwrap().into_iter().map(|r| r.id).collect();
    assert_eq!(ids.len(), 5);
    assert!(temp_dir.path().join("fm_bell.json").is_file());
}

#[test]
fn test_corrupted_file_preset_is_error() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("broken.json"), "{\"name\": ").unwrap();
    let library = PresetLibrary::new(FilePresetStore::new(temp_dir.path()), codec());

    assert!(matches!(
        library.load("broken"),
        Err(ConfigError::MalformedInput(_))
    ));
    let records = library.list().unwrap();
    assert_eq!(records.len(), 1);
    assert!(records[0].name.is_none());
}

#[test]
fn test_state_serializes_with_version() {
    let state = EngineState::new("1.0.0", object(json!({"global": {"glide": 1}})));
    assert_eq!(
        serde_json::to_string(&state).unwrap(),
        r#"{"version":"1.0.0","global":{"glide":1}}"#
    );
}

#[test]
fn test_settings_persist_across_opens() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("settings.toml");

    {
        let mut store = SettingsStore::open(TomlSettingsBackend::new(&file)).unwrap();
        store
            .update_setting(&"engine.velocityCurve".parse().unwrap(), json!("soft"))
            .unwrap();
    }

    let text = std::fs::read_to_string(&file).unwrap();
    assert!(text.contains("velocityCurve = \"soft\""), "{text}");

    let store = SettingsStore::open(TomlSettingsBackend::new(&file)).unwrap();
    assert_eq!(store.get()["engine"]["velocityCurve"], json!("soft"));
}
