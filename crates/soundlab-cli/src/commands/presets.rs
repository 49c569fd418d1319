//! Preset management commands.
//!
//! Provides commands to list, show, import, export, and manage presets.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Subcommand};
use serde_json::Value;
use soundlab_config::{
    PresetMetadata, factory_presets, is_factory_preset, paths::preset_name_from_path,
    user_config_dir, user_presets_dir, validate_engine_state,
};

use super::common::{PresetSource, UserLibrary, load_preset, read_text, user_library};

#[derive(Args)]
pub struct PresetsArgs {
    #[command(subcommand)]
    command: PresetsCommand,
}

#[derive(Subcommand)]
enum PresetsCommand {
    /// List available presets (factory and user)
    List {
        /// Show only factory presets
        #[arg(long)]
        factory: bool,

        /// Show only user presets
        #[arg(long)]
        user: bool,
    },

    /// Show details of a preset
    Show {
        /// Preset name or path
        name: String,
    },

    /// Import a preset file into user presets
    Import {
        /// Path to the preset JSON file
        file: PathBuf,

        /// Id to store the preset under (defaults to the file name)
        #[arg(long)]
        id: Option<String>,

        /// Overwrite if preset already exists
        #[arg(long)]
        force: bool,
    },

    /// Write a preset as JSON
    Export {
        /// Preset name or path
        name: String,

        /// Output file (prints to stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write compact JSON instead of indented JSON
        #[arg(long)]
        compact: bool,
    },

    /// Delete a user preset
    Delete {
        /// Preset name to delete
        name: String,

        /// Don't ask for confirmation
        #[arg(long)]
        force: bool,
    },

    /// Copy a preset to user presets for customization
    Copy {
        /// Source preset name or path
        source: String,

        /// New preset name (optional, uses source name if not specified)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Show preset directories
    Paths,
}

pub fn run(args: PresetsArgs) -> anyhow::Result<()> {
    let mut library = user_library()?;
    match args.command {
        PresetsCommand::List { factory, user } => list_presets(&library, factory, user),
        PresetsCommand::Show { name } => show_preset(&library, &name),
        PresetsCommand::Import { file, id, force } => {
            import_preset(&mut library, &file, id.as_deref(), force)
        }
        PresetsCommand::Export {
            name,
            output,
            compact,
        } => export_preset(&library, &name, output.as_deref(), compact),
        PresetsCommand::Delete { name, force } => delete_preset(&mut library, &name, force),
        PresetsCommand::Copy { source, name } => copy_preset(&mut library, &source, name.as_deref()),
        PresetsCommand::Paths => show_paths(),
    }
}

fn list_presets(library: &UserLibrary, factory_only: bool, user_only: bool) -> anyhow::Result<()> {
    let show_factory = !user_only;
    let show_user = !factory_only;

    if show_factory {
        println!("Factory Presets:");
        println!("================");
        for (name, doc) in factory_presets() {
            let desc = doc.get("description").and_then(Value::as_str).unwrap_or("");
            println!("  {:20} - {}", name, desc);
        }
        println!();
    }

    if show_user {
        println!("User Presets:");
        println!("=============");
        let records = library.list()?;
        if records.is_empty() {
            println!("  (none)");
            println!();
            println!("  Add a preset with: soundlab presets import <file>\n");
        } else {
            for record in records {
                match (record.name, record.author) {
                    (Some(name), Some(author)) => {
                        println!("  {:20} - {} (by {})", record.id, name, author)
                    }
                    (Some(name), None) => println!("  {:20} - {}", record.id, name),
                    _ => println!("  {:20} - (error loading)", record.id),
                }
            }
        }
        println!();
    }

    Ok(())
}

fn show_preset(library: &UserLibrary, name: &str) -> anyhow::Result<()> {
    let (source, loaded) = load_preset(library, name)?;
    let meta = &loaded.metadata;
    let title = meta.name.as_deref().unwrap_or(name);

    println!("Preset: {title}");
    println!("{}", "=".repeat(8 + title.len()));
    println!();

    let source = match source {
        PresetSource::Factory => "factory",
        PresetSource::User => "user",
        PresetSource::File => "file",
    };
    println!("Source:         {source}");
    if let Some(author) = &meta.author {
        println!("Author:         {author}");
    }
    if let Some(desc) = &meta.description {
        println!("Description:    {desc}");
    }
    if let Some(tags) = &meta.tags {
        println!("Tags:           {}", tags.join(", "));
    }
    println!("Engine version: {}", meta.engine_version);
    println!();

    let doc = library.codec().to_document(&loaded.engine_state, meta)?;
    let changed: Vec<&String> = doc
        .keys()
        .filter(|key| soundlab_config::metadata_type(key).is_none())
        .collect();
    println!("Changed modules ({}):", changed.len());
    for module in changed {
        println!("  {module:16} {}", doc[module.as_str()]);
    }

    let findings = validate_engine_state(&loaded.engine_state);
    if !findings.is_empty() {
        println!();
        println!("Warnings:");
        for finding in findings {
            println!("  - {finding}");
        }
    }

    Ok(())
}

fn import_preset(
    library: &mut UserLibrary,
    file: &Path,
    id: Option<&str>,
    force: bool,
) -> anyhow::Result<()> {
    let id = match id {
        Some(id) => id.to_string(),
        None => preset_name_from_path(file)
            .ok_or_else(|| anyhow::anyhow!("Cannot derive a preset id from '{}'.", file.display()))?,
    };

    if library.contains(&id)? && !force {
        anyhow::bail!("Preset '{}' already exists. Use --force to overwrite.", id);
    }

    let text = read_text(file)?;
    let loaded = library
        .put_document(&id, &text)
        .with_context(|| format!("'{}' is not a valid preset", file.display()))?;

    println!(
        "Imported '{}' as user preset '{}'",
        loaded.metadata.name.as_deref().unwrap_or(&id),
        id
    );
    Ok(())
}

fn export_preset(
    library: &UserLibrary,
    name: &str,
    output: Option<&Path>,
    compact: bool,
) -> anyhow::Result<()> {
    let (_, loaded) = load_preset(library, name)?;
    let text = library
        .codec()
        .save(&loaded.engine_state, &loaded.metadata, !compact)?;

    match output {
        Some(path) => {
            std::fs::write(path, format!("{text}\n"))
                .with_context(|| format!("failed to write '{}'", path.display()))?;
            eprintln!("Exported '{}' to {}", name, path.display());
        }
        None => println!("{text}"),
    }
    Ok(())
}

fn delete_preset(library: &mut UserLibrary, name: &str, force: bool) -> anyhow::Result<()> {
    if !library.contains(name)? {
        if is_factory_preset(name) {
            anyhow::bail!("Cannot delete factory preset '{}'. Factory presets are built-in.", name);
        }
        anyhow::bail!("User preset '{}' not found.", name);
    }

    if !force {
        anyhow::bail!("Use --force to confirm deletion of preset '{}'.", name);
    }

    library.delete(name)?;
    println!("Deleted preset '{}'.", name);
    Ok(())
}

fn copy_preset(library: &mut UserLibrary, source: &str, new_name: Option<&str>) -> anyhow::Result<()> {
    let (_, loaded) = load_preset(library, source)?;
    let target = match new_name {
        Some(name) => name.to_string(),
        None => preset_name_from_path(Path::new(source)).unwrap_or_else(|| source.to_string()),
    };
    let target = target.as_str();

    if library.contains(target)? {
        anyhow::bail!(
            "Preset '{}' already exists. Choose a different name with --name.",
            target
        );
    }

    let mut metadata: PresetMetadata = loaded.metadata;
    if let Some(name) = new_name {
        metadata.name = Some(name.to_string());
    }
    metadata.description = metadata.description.map(|desc| format!("{desc} (copy)"));

    library.save(target, &loaded.engine_state, &metadata)?;

    println!("Copied preset '{}' to user preset '{}'", source, target);
    println!("Path: {}", user_presets_dir().join(format!("{target}.json")).display());
    Ok(())
}

fn show_paths() -> anyhow::Result<()> {
    println!("Preset Directories:");
    println!("===================");
    println!();
    println!("User presets:   {}", user_presets_dir().display());
    println!("Config dir:     {}", user_config_dir().display());
    Ok(())
}
