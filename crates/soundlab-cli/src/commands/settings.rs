//! Show and change application settings.

use clap::{Args, Subcommand};
use soundlab_config::{
    ParamPath, SettingsStore, TomlSettingsBackend, settings_path, validate_settings,
};

use super::common::parse_value;

#[derive(Args)]
pub struct SettingsArgs {
    #[command(subcommand)]
    command: SettingsCommand,
}

#[derive(Subcommand)]
enum SettingsCommand {
    /// Print the current settings (defaults filled in)
    Show {
        /// Only print the value at this dotted path
        path: Option<String>,
    },

    /// Change a single setting
    Set {
        /// Dotted setting path, e.g. ui.theme
        path: String,

        /// New value (JSON, or a plain string)
        value: String,
    },

    /// Restore every setting to its default
    Reset,
}

pub fn run(args: SettingsArgs) -> anyhow::Result<()> {
    let file = settings_path();
    let mut store = SettingsStore::open(TomlSettingsBackend::new(&file))?;

    match args.command {
        SettingsCommand::Show { path } => match path {
            Some(path) => {
                let path: ParamPath = path.parse()?;
                let value = store
                    .value(&path)
                    .ok_or_else(|| anyhow::anyhow!("No setting at '{path}'."))?;
                println!("{}", serde_json::to_string_pretty(value)?);
            }
            None => {
                println!("{}", serde_json::to_string_pretty(store.get())?);
                let findings = validate_settings(store.get());
                if !findings.is_empty() {
                    eprintln!("Warnings:");
                    for finding in findings {
                        eprintln!("  - {finding}");
                    }
                }
            }
        },
        SettingsCommand::Set { path, value } => {
            let path: ParamPath = path.parse()?;
            let value = parse_value(&value);
            store.update_setting(&path, value)?;
            println!("Set {path} in {}", file.display());
        }
        SettingsCommand::Reset => {
            store.reset()?;
            println!("Settings reset to defaults in {}", file.display());
        }
    }

    Ok(())
}
