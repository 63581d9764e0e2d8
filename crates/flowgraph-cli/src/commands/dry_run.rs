//! Run the header phase of a patch without an engine.
//!
//! Connections are declared on a fresh router, always-on notes are captured in
//! memory instead of being scheduled, and tables are "built" by handing out
//! sequential numbers. The result shows what an engine would start with.

use clap::Args;
use flowgraph_core::{
    EventRecord, HostError, InstrumentTemplate, Router, TableHandle, TableKey, Voice, VoiceId,
};

use super::common::load_patch;

/// Dry-run a patch's header phase.
#[derive(Args)]
pub struct DryRunArgs {
    /// Path to the patch TOML file
    pub patch: std::path::PathBuf,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// First table number handed out
    #[arg(long, default_value_t = 101)]
    pub first_table: u32,
}

/// Run the dry-run command.
pub fn run(args: DryRunArgs) -> anyhow::Result<()> {
    let patch = load_patch(&args.patch)?;

    let router = Router::new();
    let header = Voice::new(VoiceId(0), InstrumentTemplate::numbered(0));
    let mut events: Vec<EventRecord> = Vec::new();
    patch.apply(&router, &header, &mut events)?;

    let mut next = args.first_table;
    let mut generator = |_: &TableKey| -> Result<TableHandle, HostError> {
        let handle = TableHandle(next);
        next = next
            .checked_add(1)
            .ok_or_else(|| HostError::from("table numbers exhausted"))?;
        Ok(handle)
    };
    let tables = patch.build_tables(&router, &mut generator)?;
    let snapshot = router.snapshot();

    if args.json {
        let report = serde_json::json!({
            "patch": patch.name,
            "block_size": patch.block_size,
            "events": events,
            "tables": tables,
            "router": snapshot,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Patch: {}", patch.name);
    println!();
    println!("Always-on events ({}):", events.len());
    for event in &events {
        let params: Vec<String> = event.params.iter().map(|p| p.to_string()).collect();
        println!(
            "  i {} start={} dur={} [{}]",
            event.instrument,
            event.start,
            if event.is_indefinite() {
                "held".to_string()
            } else {
                event.duration.to_string()
            },
            params.join(", ")
        );
    }

    println!();
    println!("Tables ({} requested, {} built):", tables.len(), snapshot.tables.len());
    for table in &snapshot.tables {
        let fields: Vec<String> = table.key.fields().iter().map(|f| f.to_string()).collect();
        println!("  {} <- [{}]", table.handle, fields.join(", "));
    }

    println!();
    println!("Routes ({}):", snapshot.connections.len());
    for connection in &snapshot.connections {
        let sources: Vec<&str> = connection.sources.iter().map(|s| s.as_str()).collect();
        println!("  {} <- {}", connection.sink, sources.join(", "));
    }

    Ok(())
}
