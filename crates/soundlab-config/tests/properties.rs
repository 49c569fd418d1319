//! Property-based tests for the preset codec.
//!
//! Perturbs valid engine states at random and checks that saving and
//! loading reproduces them exactly, and that re-saving is byte-stable.

use proptest::prelude::*;
use serde_json::{Value, json};
use soundlab_config::{
    BuiltinDefaults, DefaultsProvider, EngineState, ENGINE_VERSION, LEGACY_ENGINE_VERSION,
    MODULES_KEY, ParamPath, PresetCodec, PresetMetadata, set_param, validate_engine_state,
};

const FM_WAVEFORMS: &[&str] = &["sine", "triangle", "square", "saw"];
const FILTER_TYPES: &[&str] = &["peaking", "lowshelf", "highshelf", "bandpass"];

/// A set of parameter changes applied on top of the defaults.
#[derive(Debug, Clone)]
struct Tweaks {
    frequency: f64,
    detune: f64,
    saw: f64,
    fm_enabled: bool,
    fm_waveform: usize,
    filter_type: usize,
    filter_gain: f64,
    fx_to_master: bool,
    tuning: f64,
}

fn tweaks() -> impl Strategy<Value = Tweaks> {
    (
        20.0f64..=20000.0,
        -1200.0f64..=1200.0,
        0.0f64..=1.0,
        any::<bool>(),
        0usize..FM_WAVEFORMS.len(),
        0usize..FILTER_TYPES.len(),
        -24.0f64..=24.0,
        any::<bool>(),
        400.0f64..=480.0,
    )
        .prop_map(
            |(frequency, detune, saw, fm_enabled, fm_waveform, filter_type, filter_gain, fx_to_master, tuning)| {
                Tweaks {
                    frequency,
                    detune,
                    saw,
                    fm_enabled,
                    fm_waveform,
                    filter_type,
                    filter_gain,
                    fx_to_master,
                    tuning,
                }
            },
        )
}

fn apply(state: &mut EngineState, tweaks: &Tweaks, legacy: bool) {
    let set = |state: &mut EngineState, path: &str, value: Value| {
        let text = if legacy && !path.starts_with("routing") && !path.starts_with("global.") {
            format!("{MODULES_KEY}.{path}")
        } else {
            path.to_string()
        };
        let path: ParamPath = text.parse().unwrap();
        set_param(state, &path, value).unwrap();
    };
    set(state, "osc.frequency", json!(tweaks.frequency));
    set(state, "osc.detune", json!(tweaks.detune));
    set(state, "osc.waves.saw", json!(tweaks.saw));
    set(state, "fm.enabled", json!(tweaks.fm_enabled));
    set(state, "fm.waveform", json!(FM_WAVEFORMS[tweaks.fm_waveform]));
    set(state, "globalFilter.type", json!(FILTER_TYPES[tweaks.filter_type]));
    set(state, "globalFilter.gain", json!(tweaks.filter_gain));
    set(state, "routing.fxToMaster", json!(tweaks.fx_to_master));
    set(state, "global.tuning", json!(tweaks.tuning));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// For any valid state, load(save(S)) equals S and save is stable.
    #[test]
    fn preset_round_trip(tweaks in tweaks(), legacy in any::<bool>(), pretty in any::<bool>()) {
        let codec = PresetCodec::new(BuiltinDefaults::new().unwrap());
        let version = if legacy { LEGACY_ENGINE_VERSION } else { ENGINE_VERSION };
        let mut state = (*codec.provider().defaults(version).unwrap()).clone();
        apply(&mut state, &tweaks, legacy);
        prop_assert!(validate_engine_state(&state).is_empty());

        let meta = PresetMetadata::new("Random", "proptest").with_engine_version(version);
        let text = codec.save(&state, &meta, pretty).unwrap();
        let loaded = codec.import(&text).unwrap();
        prop_assert_eq!(&loaded.engine_state, &state);

        let again = codec.save(&loaded.engine_state, &meta, pretty).unwrap();
        prop_assert_eq!(again, text);
    }

    /// Saved documents never carry the legacy grouping key.
    #[test]
    fn saved_documents_are_flat(tweaks in tweaks()) {
        let codec = PresetCodec::new(BuiltinDefaults::new().unwrap());
        let mut state = (*codec.provider().defaults(LEGACY_ENGINE_VERSION).unwrap()).clone();
        apply(&mut state, &tweaks, true);

        let meta = PresetMetadata::new("Flat", "proptest").with_engine_version(LEGACY_ENGINE_VERSION);
        let doc = codec.to_document(&state, &meta).unwrap();
        prop_assert!(!doc.contains_key(MODULES_KEY));
    }
}
