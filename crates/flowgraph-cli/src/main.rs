//! Flowgraph CLI - inspect and dry-run routing patches.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "flowgraph")]
#[command(author, version, about = "Flowgraph patch tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and validate a patch file
    Check(commands::check::CheckArgs),

    /// Print the sink-to-sources routing table of a patch
    Routes(commands::routes::RoutesArgs),

    /// Run a patch's header phase against an empty router
    DryRun(commands::dry_run::DryRunArgs),
}

fn main() -> anyhow::Result<()> {
    // Diagnostics go to stderr so stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check(args) => commands::check::run(args),
        Commands::Routes(args) => commands::routes::run(args),
        Commands::DryRun(args) => commands::dry_run::run(args),
    }
}
