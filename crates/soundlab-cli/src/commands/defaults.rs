//! Print the default engine state for a version.

use clap::Args;
use soundlab_config::{BuiltinDefaults, DefaultsProvider, ENGINE_VERSION};

#[derive(Args)]
pub struct DefaultsArgs {
    /// Engine version to print defaults for
    #[arg(long, value_name = "VERSION", default_value = ENGINE_VERSION)]
    engine_version: String,

    /// Print compact JSON instead of indented JSON
    #[arg(long)]
    compact: bool,
}

pub fn run(args: DefaultsArgs) -> anyhow::Result<()> {
    let provider = BuiltinDefaults::new()?;
    let state = provider.defaults(&args.engine_version).map_err(|e| {
        anyhow::anyhow!("{e}. Known versions: {}", provider.versions().join(", "))
    })?;

    let text = if args.compact {
        serde_json::to_string(&*state)?
    } else {
        serde_json::to_string_pretty(&*state)?
    };
    println!("{text}");
    Ok(())
}
