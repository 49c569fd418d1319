//! SoundLab CLI - inspect engine defaults, validate presets, and manage presets and settings.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "soundlab")]
#[command(author, version, about = "SoundLab preset and settings CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the default engine state
    Defaults(commands::defaults::DefaultsArgs),

    /// Validate a preset file
    Validate(commands::validate::ValidateArgs),

    /// Show engine versions and their modules
    Info(commands::info::InfoArgs),

    /// List and manage presets
    Presets(commands::presets::PresetsArgs),

    /// Show and change application settings
    Settings(commands::settings::SettingsArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Defaults(args) => commands::defaults::run(args),
        Commands::Validate(args) => commands::validate::run(args),
        Commands::Info(args) => commands::info::run(args),
        Commands::Presets(args) => commands::presets::run(args),
        Commands::Settings(args) => commands::settings::run(args),
    }
}
