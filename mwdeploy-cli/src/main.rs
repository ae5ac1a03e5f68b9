//! mwdeploy: MediaWiki deployment orchestrator.
//!
//! # Usage
//!
//! ```text
//! mwdeploy deploy --servers <s1,s2|all> [--upgrade-extensions a,b] [--upgrade-skins a,b]
//!                 [--upgrade-vendor] [--upgrade-world] [--l10n [--lang xx,yy]]
//!                 [--ignore-time] [--force] [--dry-run] [--json] [--local-host <name>]
//! mwdeploy inventory [--json]
//! ```

mod commands;
mod host;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use commands::{deploy::DeployArgs, inventory::InventoryArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "mwdeploy",
    version,
    about = "Deploy MediaWiki code from staging to production servers",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Options accepted by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Topology file (default: $MWDEPLOY_CONFIG, /etc/mwdeploy/topology.yaml,
    /// then the user config directory).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level, including every command line.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Update staging and push code to the selected servers.
    Deploy(DeployArgs),

    /// List the extensions and skins available in staging.
    Inventory(InventoryArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);
    match cli.command {
        Commands::Deploy(args) => args.run(&cli.global),
        Commands::Inventory(args) => args.run(&cli.global),
    }
}

/// Logs go to stderr; stdout is reserved for reports.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
