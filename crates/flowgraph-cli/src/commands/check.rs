//! Validate a patch file and summarize it.

use clap::Args;

use super::common::load_patch;

/// Validate a patch file.
#[derive(Args)]
pub struct CheckArgs {
    /// Path to the patch TOML file
    pub patch: std::path::PathBuf,
}

/// Run the check command.
pub fn run(args: CheckArgs) -> anyhow::Result<()> {
    let patch = load_patch(&args.patch)?;

    let sinks = patch
        .routes()
        .into_iter()
        .map(|(sink, _)| sink)
        .collect::<std::collections::BTreeSet<_>>()
        .len();

    println!("Patch:       {}", patch.name);
    if let Some(description) = &patch.description {
        println!("Description: {description}");
    }
    println!("Block Size:  {}", patch.block_size);
    println!(
        "Connections: {} into {} inlet{}",
        patch.connections.len(),
        sinks,
        if sinks == 1 { "" } else { "s" }
    );
    println!("Always-on:   {}", patch.always_on.len());
    println!("Tables:      {}", patch.tables.len());
    println!("OK");

    Ok(())
}
