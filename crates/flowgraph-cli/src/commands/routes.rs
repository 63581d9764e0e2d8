//! Print the routing table declared by a patch.

use clap::Args;
use flowgraph_core::{EventRecord, InstrumentTemplate, Router, Voice, VoiceId};

use super::common::load_patch;

/// Print which outlets feed each inlet.
#[derive(Args)]
pub struct RoutesArgs {
    /// Path to the patch TOML file
    pub patch: std::path::PathBuf,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Run the routes command.
pub fn run(args: RoutesArgs) -> anyhow::Result<()> {
    let patch = load_patch(&args.patch)?;

    let router = Router::new();
    let header = Voice::new(VoiceId(0), InstrumentTemplate::numbered(0));
    patch.apply(&router, &header, &mut Vec::<EventRecord>::new())?;
    let connections = router.snapshot().connections;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&connections)?);
        return Ok(());
    }

    if connections.is_empty() {
        println!("No connections declared.");
        return Ok(());
    }

    let width = connections
        .iter()
        .map(|c| c.sink.as_str().len())
        .max()
        .unwrap_or(0);
    for connection in &connections {
        let sources: Vec<&str> = connection.sources.iter().map(|s| s.as_str()).collect();
        println!(
            "{:<width$}  <-  {}",
            connection.sink.as_str(),
            sources.join(", ")
        );
    }

    Ok(())
}
