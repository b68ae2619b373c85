//! wgmesh CLI - Main Entry Point
//!
//! Operator interface for the mesh orchestrator: create hubs, attach
//! peers, deploy configuration to remote hosts, and refresh connectivity
//! state from the running daemon.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use wgmesh_common::{Database, SecretBox};
use wgmesh_mesh::{MeshConfig, MeshOrchestrator, MeshStore};

mod commands;
mod output;

use commands::{hub, peer};

/// wgmesh - WireGuard hub-and-spoke mesh orchestrator
#[derive(Parser)]
#[command(name = "wgmesh")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Database path (defaults to the configured store)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Master passphrase sealing private keys at rest
    #[arg(long, env = "WGMESH_MASTER_KEY", hide_env_values = true, global = true)]
    master_key: Option<String>,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage hubs
    #[command(subcommand)]
    Hub(hub::HubCommands),

    /// Manage peers
    #[command(subcommand)]
    Peer(peer::PeerCommands),

    /// Show version information
    Version,
}

/// Shared command context
pub struct Context {
    pub orchestrator: MeshOrchestrator,
}

impl Context {
    fn new(cli: &Cli) -> anyhow::Result<Self> {
        let settings = MeshConfig::load(&MeshConfig::default_path())?;

        let master_key = cli.master_key.clone().ok_or_else(|| {
            anyhow::anyhow!("master key required: set WGMESH_MASTER_KEY or pass --master-key")
        })?;
        let secrets = SecretBox::from_passphrase(&master_key);

        let db_path = cli.db.clone().unwrap_or_else(|| settings.db_path());
        let db = Database::open(db_path)?;
        let store = MeshStore::new(db);
        store.init_schema()?;

        Ok(Self {
            orchestrator: MeshOrchestrator::new(store, secrets, settings),
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    match &cli.command {
        Commands::Hub(cmd) => {
            let ctx = Context::new(&cli)?;
            hub::execute(cmd, &ctx, cli.format).await?;
        }
        Commands::Peer(cmd) => {
            let ctx = Context::new(&cli)?;
            peer::execute(cmd, &ctx, cli.format).await?;
        }
        Commands::Version => {
            println!("wgmesh {}", wgmesh_common::VERSION);
        }
    }

    Ok(())
}
