//! Display engine versions and their parameter modules.

use clap::Args;
use soundlab_config::{
    ENGINE_VERSION, PRESET_FORMAT_VERSION, SpecGroup, SpecNode, known_versions,
    schema_for_version, settings_path, user_presets_dir,
};

/// Show engine schema information.
#[derive(Args)]
pub struct InfoArgs {
    /// Also list every parameter path
    #[arg(long)]
    params: bool,
}

/// Run the info command.
pub fn run(args: InfoArgs) -> anyhow::Result<()> {
    println!("Current engine:  {ENGINE_VERSION}");
    println!("Preset format:   {PRESET_FORMAT_VERSION}");
    println!("User presets:    {}", user_presets_dir().display());
    println!("Settings file:   {}", settings_path().display());
    println!();

    for version in known_versions() {
        let Some(spec) = schema_for_version(version) else {
            continue;
        };
        println!("Engine {version}:");
        for (module, node) in spec.iter() {
            println!("  {:16} {:>3} parameters", module, count_leaves(node));
        }
        if args.params {
            println!();
            for path in leaf_paths(spec, "") {
                println!("    {path}");
            }
        }
        println!();
    }

    Ok(())
}

fn count_leaves(node: &SpecNode) -> usize {
    match node {
        SpecNode::Leaf(_) => 1,
        SpecNode::Group(group) => group.iter().map(|(_, child)| count_leaves(child)).sum(),
    }
}

fn leaf_paths(group: &SpecGroup, prefix: &str) -> Vec<String> {
    let mut paths = Vec::new();
    for (key, node) in group.iter() {
        let path = if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{prefix}.{key}")
        };
        match node {
            SpecNode::Leaf(leaf) => paths.push(format!("{path} ({})", leaf.kind())),
            SpecNode::Group(inner) => paths.extend(leaf_paths(inner, &path)),
        }
    }
    paths
}
