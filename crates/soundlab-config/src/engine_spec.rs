//! The built-in schemas: the synth engine and the application settings.
//!
//! The engine schema is the source of truth for every tunable parameter of
//! a voice and the post-mix chain. The current layout (`1.0.0`) keeps every
//! module at the top level; the legacy layout (`0.9.0`) nested the
//! sound-producing modules under a `modules` group.

use std::sync::OnceLock;

use crate::spec::{ParamLeaf, SpecGroup};

/// Current engine schema version.
pub const ENGINE_VERSION: &str = "1.0.0";

/// Legacy engine schema version with the `modules` grouping.
pub const LEGACY_ENGINE_VERSION: &str = "0.9.0";

/// Preset document format written by this crate.
pub const PRESET_FORMAT_VERSION: &str = "1.0";

/// Name of the legacy grouping key.
pub const MODULES_KEY: &str = "modules";

/// Envelope stages shared by the FM and voice filter envelopes.
fn envelope(enabled: bool, decay: f64, sustain: f64, release: f64) -> SpecGroup {
    SpecGroup::new()
        .with_leaf("enabled", ParamLeaf::boolean(enabled))
        .with_leaf("attack", ParamLeaf::number(0.0, 10.0, 0.01))
        .with_leaf("decay", ParamLeaf::number(0.0, 10.0, decay))
        .with_leaf("sustain", ParamLeaf::number(0.0, 1.0, sustain))
        .with_leaf("release", ParamLeaf::number(0.0, 10.0, release))
}

/// Multi-wave oscillator.
fn osc_spec() -> SpecGroup {
    SpecGroup::new()
        .with_leaf("enabled", ParamLeaf::boolean(true))
        .with_leaf("frequency", ParamLeaf::number(20.0, 20000.0, 440.0))
        .with_leaf("detune", ParamLeaf::number(-1200.0, 1200.0, 0.0))
        .with_leaf("inharmonicity", ParamLeaf::number(0.0, 1.0, 0.0))
        .with_leaf("useInharmonicity", ParamLeaf::boolean(false))
        .with_leaf("stereoSpread", ParamLeaf::number(0.0, 1.0, 0.0))
        .with_group(
            "waves",
            SpecGroup::new()
                .with_leaf("sine", ParamLeaf::number(0.0, 1.0, 1.0))
                .with_leaf("triangle", ParamLeaf::number(0.0, 1.0, 0.0))
                .with_leaf("square", ParamLeaf::number(0.0, 1.0, 0.0))
                .with_leaf("saw", ParamLeaf::number(0.0, 1.0, 0.0)),
        )
}

/// Amplitude envelope with post-release tail.
fn amp_env_spec() -> SpecGroup {
    SpecGroup::new()
        .with_leaf("enabled", ParamLeaf::boolean(true))
        .with_leaf("attack", ParamLeaf::number(0.0, 10.0, 0.01))
        .with_leaf("decay", ParamLeaf::number(0.0, 10.0, 0.2))
        .with_leaf("sustain", ParamLeaf::number(0.0, 1.0, 0.5))
        .with_leaf("release", ParamLeaf::number(0.0, 10.0, 0.3))
        .with_leaf("tail", ParamLeaf::number(0.0, 5.0, 1.0))
        .with_leaf("clickSafe", ParamLeaf::boolean(true))
}

fn pitch_env_spec() -> SpecGroup {
    SpecGroup::new()
        .with_leaf("enabled", ParamLeaf::boolean(false))
        .with_leaf("mode", ParamLeaf::choice(&["relative", "absolute"], "relative"))
        .with_leaf("start", ParamLeaf::number(0.0, 20000.0, 440.0))
        .with_leaf("end", ParamLeaf::number(0.0, 20000.0, 440.0))
        .with_leaf("time", ParamLeaf::number(0.0, 10.0, 0.1))
        .with_leaf("expo", ParamLeaf::boolean(true))
}

/// Frequency modulation: modulator waveform, ratio or absolute tuning,
/// index or depth amount, and its own envelope.
fn fm_spec() -> SpecGroup {
    SpecGroup::new()
        .with_leaf("enabled", ParamLeaf::boolean(false))
        .with_leaf(
            "waveform",
            ParamLeaf::choice(&["sine", "triangle", "square", "saw"], "sine"),
        )
        .with_leaf("mode", ParamLeaf::choice(&["ratio", "absolute"], "ratio"))
        .with_leaf("ratio", ParamLeaf::number(0.1, 20.0, 2.0))
        .with_leaf("frequency", ParamLeaf::number(20.0, 20000.0, 600.0))
        .with_leaf("amountMode", ParamLeaf::choice(&["index", "depth"], "index"))
        .with_leaf("amount", ParamLeaf::number(0.0, 2000.0, 300.0))
        .with_group("env", envelope(false, 0.25, 0.3, 0.6))
}

fn vibrato_spec() -> SpecGroup {
    SpecGroup::new()
        .with_leaf("enabled", ParamLeaf::boolean(false))
        .with_leaf(
            "waveform",
            ParamLeaf::choice(&["sine", "triangle", "square"], "sine"),
        )
        .with_leaf("rate", ParamLeaf::number(0.1, 20.0, 5.0))
        // cents
        .with_leaf("depth", ParamLeaf::number(0.0, 200.0, 20.0))
        .with_leaf("delay", ParamLeaf::number(0.0, 5.0, 0.0))
        .with_leaf("fade", ParamLeaf::number(0.0, 5.0, 0.2))
}

fn voice_filter_spec() -> SpecGroup {
    SpecGroup::new()
        .with_leaf("enabled", ParamLeaf::boolean(true))
        .with_leaf("cutoff", ParamLeaf::number(20.0, 20000.0, 1000.0))
        .with_leaf("resonance", ParamLeaf::number(0.0, 1.0, 0.2))
        .with_leaf("envAmount", ParamLeaf::number(0.0, 1.0, 0.5))
        .with_group("env", envelope(true, 0.2, 0.5, 0.3))
}

fn global_filter_spec() -> SpecGroup {
    SpecGroup::new()
        .with_leaf("enabled", ParamLeaf::boolean(true))
        .with_leaf(
            "type",
            ParamLeaf::choice(&["peaking", "lowshelf", "highshelf", "bandpass"], "peaking"),
        )
        .with_leaf("frequency", ParamLeaf::number(20.0, 20000.0, 2000.0))
        .with_leaf("q", ParamLeaf::number(0.1, 20.0, 1.0))
        .with_leaf("gain", ParamLeaf::number(-24.0, 24.0, 0.0))
}

fn fx_unit(types: &[&str], default: &str) -> SpecGroup {
    SpecGroup::new()
        .with_leaf("enabled", ParamLeaf::boolean(false))
        .with_leaf("type", ParamLeaf::choice(types, default))
        .with_leaf("amount", ParamLeaf::number(0.0, 1.0, 0.0))
}

fn fx_spec() -> SpecGroup {
    SpecGroup::new()
        .with_group("noise", fx_unit(&["white", "pink", "brown"], "white"))
        .with_group("reverb", fx_unit(&["hall", "room", "plate"], "hall"))
        .with_group("drive", fx_unit(&["soft", "hard", "tube", "fuzz"], "soft"))
        .with_group(
            "width",
            SpecGroup::new()
                .with_leaf("enabled", ParamLeaf::boolean(true))
                .with_leaf("amount", ParamLeaf::number(0.0, 1.0, 1.0)),
        )
}

/// Fixed signal chain links.
fn routing_spec() -> SpecGroup {
    SpecGroup::new()
        .with_leaf("oscToAmpEnv", ParamLeaf::boolean(true))
        .with_leaf("ampEnvToVoiceFilter", ParamLeaf::boolean(true))
        .with_leaf("voiceFilterToGlobalFilter", ParamLeaf::boolean(true))
        .with_leaf("globalFilterToFx", ParamLeaf::boolean(true))
        .with_leaf("fxToMaster", ParamLeaf::boolean(true))
}

fn global_spec() -> SpecGroup {
    SpecGroup::new()
        .with_leaf("tuning", ParamLeaf::number(400.0, 480.0, 440.0))
        .with_leaf("glide", ParamLeaf::number(0.0, 10.0, 0.0))
}

/// Sound-producing modules, in signal order.
fn sound_modules() -> Vec<(&'static str, SpecGroup)> {
    vec![
        ("osc", osc_spec()),
        ("ampEnv", amp_env_spec()),
        ("pitchEnv", pitch_env_spec()),
        ("fm", fm_spec()),
        ("vibrato", vibrato_spec()),
        ("voiceFilter", voice_filter_spec()),
        ("globalFilter", global_filter_spec()),
        ("fx", fx_spec()),
    ]
}

/// The engine schema for [`ENGINE_VERSION`].
pub fn engine_spec() -> &'static SpecGroup {
    static SPEC: OnceLock<SpecGroup> = OnceLock::new();
    SPEC.get_or_init(|| {
        sound_modules()
            .into_iter()
            .fold(SpecGroup::new(), |spec, (name, module)| {
                spec.with_group(name, module)
            })
            .with_group("routing", routing_spec())
            .with_group("global", global_spec())
    })
}

/// The engine schema for [`LEGACY_ENGINE_VERSION`].
///
/// Same parameters as [`engine_spec`], with the sound-producing modules
/// nested under [`MODULES_KEY`].
pub fn legacy_engine_spec() -> &'static SpecGroup {
    static SPEC: OnceLock<SpecGroup> = OnceLock::new();
    SPEC.get_or_init(|| {
        let modules = sound_modules()
            .into_iter()
            .fold(SpecGroup::new(), |spec, (name, module)| {
                spec.with_group(name, module)
            });
        SpecGroup::new()
            .with_group(MODULES_KEY, modules)
            .with_group("routing", routing_spec())
            .with_group("global", global_spec())
    })
}

/// The schema for a known engine version.
pub fn schema_for_version(version: &str) -> Option<&'static SpecGroup> {
    match version {
        ENGINE_VERSION => Some(engine_spec()),
        LEGACY_ENGINE_VERSION => Some(legacy_engine_spec()),
        _ => None,
    }
}

/// Every engine version with a built-in schema, newest first.
pub fn known_versions() -> &'static [&'static str] {
    &[ENGINE_VERSION, LEGACY_ENGINE_VERSION]
}

/// The application settings schema.
pub fn settings_spec() -> &'static SpecGroup {
    static SPEC: OnceLock<SpecGroup> = OnceLock::new();
    SPEC.get_or_init(|| {
        SpecGroup::new()
            .with_group(
                "ui",
                SpecGroup::new()
                    .with_leaf("theme", ParamLeaf::choice(&["dark", "light", "system"], "dark"))
                    .with_leaf("uiScale", ParamLeaf::number(0.5, 2.0, 1.0))
                    .with_group(
                        "waveVisualization",
                        SpecGroup::new()
                            .with_leaf(
                                "style",
                                ParamLeaf::choice(&["default", "minimal", "bars", "line"], "default"),
                            )
                            .with_leaf("smoothing", ParamLeaf::number(0.0, 1.0, 0.5))
                            .with_leaf("color", ParamLeaf::text("#00ffcc")),
                    )
                    .with_leaf("panelVisibility", ParamLeaf::object())
                    .with_group(
                        "settingsPanel",
                        SpecGroup::new()
                            .with_leaf("width", ParamLeaf::number(200.0, 2000.0, 420.0))
                            .with_leaf("height", ParamLeaf::number(200.0, 2000.0, 520.0))
                            .with_leaf("defaultX", ParamLeaf::number(0.0, 10000.0, 120.0))
                            .with_leaf("defaultY", ParamLeaf::number(0.0, 10000.0, 80.0))
                            .with_leaf("rememberPosition", ParamLeaf::boolean(true))
                            .with_leaf("rememberSize", ParamLeaf::boolean(true))
                            .with_leaf("backdrop", ParamLeaf::boolean(true)),
                    ),
            )
            .with_group(
                "workflow",
                SpecGroup::new()
                    .with_leaf("defaultPreset", ParamLeaf::text("factory"))
                    .with_leaf("autosave", ParamLeaf::boolean(true))
                    .with_leaf("recentPresets", ParamLeaf::string_list(&[])),
            )
            .with_group(
                "engine",
                SpecGroup::new()
                    .with_leaf("oversampling", ParamLeaf::choice(&["off", "2x", "4x"], "off"))
                    .with_leaf("polyphonyLimit", ParamLeaf::number(1.0, 64.0, 16.0))
                    .with_leaf(
                        "tuningSystem",
                        ParamLeaf::choice(&["A440", "stretched", "custom"], "A440"),
                    )
                    .with_leaf("pitchBendRange", ParamLeaf::number(1.0, 48.0, 2.0))
                    .with_leaf("mpeEnabled", ParamLeaf::boolean(false))
                    .with_leaf("aftertouchMode", ParamLeaf::choice(&["poly", "channel"], "channel"))
                    .with_leaf(
                        "velocityCurve",
                        ParamLeaf::choice(&["linear", "soft", "hard", "custom"], "linear"),
                    ),
            )
            .with_group(
                "midi",
                SpecGroup::new().with_leaf("preferredDevices", ParamLeaf::string_list(&[])),
            )
            .with_group(
                "diagnostics",
                SpecGroup::new()
                    .with_leaf("diagnosticWindow", ParamLeaf::boolean(false))
                    .with_leaf("diagnosticVerbosity", ParamLeaf::number(1.0, 5.0, 1.0))
                    .with_group(
                        "debugTrace",
                        SpecGroup::new()
                            .with_leaf("enabled", ParamLeaf::boolean(false))
                            .with_leaf("level", ParamLeaf::number(1.0, 5.0, 1.0))
                            .with_leaf(
                                "typeFilters",
                                ParamLeaf::list_of(
                                    &["info", "warn", "error", "critical"],
                                    &["info", "warn", "error"],
                                ),
                            ),
                    ),
            )
    })
}
