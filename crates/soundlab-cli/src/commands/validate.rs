//! Validate a preset file.
//!
//! Runs the strict preset check on the document, then loads it and checks
//! the merged state against its version's schema. Any finding fails the
//! command.

use std::path::PathBuf;

use clap::Args;
use serde_json::Value;
use soundlab_config::{BuiltinDefaults, PresetCodec, validate_engine_state, validate_preset};

use super::common::read_text;

#[derive(Args)]
pub struct ValidateArgs {
    /// Path to the preset JSON file
    file: PathBuf,
}

pub fn run(args: ValidateArgs) -> anyhow::Result<()> {
    let text = read_text(&args.file)?;
    let doc: Value = serde_json::from_str(&text)
        .map_err(|e| anyhow::anyhow!("'{}' is not valid JSON: {e}", args.file.display()))?;

    let codec = PresetCodec::new(BuiltinDefaults::new()?);

    let errors = validate_preset(&doc, codec.provider());
    if !errors.is_empty() {
        println!("Preset errors in {}:", args.file.display());
        for error in &errors {
            println!("  - {error}");
        }
        anyhow::bail!("{} preset error(s)", errors.len());
    }

    let loaded = codec.load(&doc)?;
    let errors = validate_engine_state(&loaded.engine_state);
    if !errors.is_empty() {
        println!("Parameter errors in {}:", args.file.display());
        for error in &errors {
            println!("  - {error}");
        }
        anyhow::bail!("{} parameter error(s)", errors.len());
    }

    println!(
        "{}: valid (engine {})",
        args.file.display(),
        loaded.engine_state.version
    );
    Ok(())
}
