//! Preset demo: defaults, parameter edits, delta presets, and factory presets.
//!
//! Run with: cargo run -p soundlab-config --example preset_demo

use serde_json::json;
use soundlab_config::{
    BuiltinDefaults, DefaultsProvider, LEGACY_ENGINE_VERSION, ParamPath, PresetCodec,
    PresetMetadata, default_engine_state, factory_preset_names, get_param, load_factory_preset,
    set_param, validate_engine_state,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let codec = PresetCodec::new(BuiltinDefaults::new()?);

    // --- Defaults ---
    println!("=== Default State ===\n");

    let defaults = default_engine_state()?;
    println!("Engine version: {}", defaults.version);
    for (module, params) in &defaults.params {
        let count = params.as_object().map_or(0, |p| p.len());
        println!("  {module:<14} {count} entries");
    }

    // --- Editing ---
    println!("\n=== Editing a Working Copy ===\n");

    let mut state = (*defaults).clone();
    let edits = [
        ("fm.enabled", json!(true)),
        ("fm.ratio", json!(3.5)),
        ("ampEnv.release", json!(2.5)),
        ("fx.reverb.enabled", json!(true)),
        ("fx.reverb.type", json!("plate")),
    ];
    for (path, value) in edits {
        let path: ParamPath = path.parse()?;
        set_param(&mut state, &path, value)?;
        println!("  {path} = {}", get_param(&state, &path).unwrap_or(&json!(null)));
    }

    let rejected: ParamPath = "global.tuning".parse()?;
    if let Err(e) = set_param(&mut state, &rejected, json!(500)) {
        println!("  rejected: {e}");
    }

    // --- Saving ---
    println!("\n=== Delta Preset ===\n");

    let metadata = PresetMetadata::new("Demo Bell", "preset_demo").with_tags(["bell", "demo"]);
    let text = codec.export(&state, &metadata)?;
    println!("{text}");

    let loaded = codec.import(&text)?;
    println!(
        "\nReloaded '{}': identical = {}, findings = {}",
        loaded.metadata.name.as_deref().unwrap_or("?"),
        loaded.engine_state == state,
        validate_engine_state(&loaded.engine_state).len()
    );

    // --- Legacy layout ---
    println!("\n=== Legacy Layout ({LEGACY_ENGINE_VERSION}) ===\n");

    let legacy = codec.provider().defaults(LEGACY_ENGINE_VERSION)?;
    let top_level: Vec<&String> = legacy.params.keys().collect();
    println!("Defaults top level: {top_level:?}");

    let lead = load_factory_preset(&codec, "legacy_lead")?;
    println!(
        "legacy_lead saw level: {}",
        lead.engine_state.params["modules"]["osc"]["waves"]["saw"]
    );

    // --- Factory presets ---
    println!("\n=== Factory Presets ===\n");

    for name in factory_preset_names() {
        let preset = load_factory_preset(&codec, name)?;
        println!(
            "  {:<12} {:<12} engine {}",
            name,
            preset.metadata.name.as_deref().unwrap_or(""),
            preset.engine_state.version
        );
    }

    Ok(())
}
