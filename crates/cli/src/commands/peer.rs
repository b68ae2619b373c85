//! Peer management commands

use crate::commands::hub::find_hub;
use crate::output::{self, format_epoch, OutputFormat, TableDisplay};
use crate::Context;
use clap::{Args, Subcommand};
use colored::Colorize;
use serde::Serialize;
use wgmesh_mesh::{CreatePeerRequest, PeerLinkState, PeerRecord};

#[derive(Subcommand)]
pub enum PeerCommands {
    /// Attach a new peer to a hub
    Add(AddArgs),

    /// List a hub's peers
    List { hub: String },

    /// Re-include a peer in configuration rendering
    Enable { hub: String, name: String },

    /// Exclude a peer from configuration rendering without deleting it
    Disable { hub: String, name: String },

    /// Delete a peer (redeploys an active hub)
    Remove { hub: String, name: String },

    /// Render the peer's client configuration file
    Config { hub: String, name: String },
}

#[derive(Args)]
pub struct AddArgs {
    /// Owning hub name
    pub hub: String,

    /// Peer name
    pub name: String,

    /// Routes the peer may use, comma-joined CIDRs (defaults to the hub CIDR)
    #[arg(long)]
    pub allowed_ips: Option<String>,
}

#[derive(Serialize)]
struct PeerRow {
    name: String,
    address: String,
    allowed_ips: String,
    active: bool,
    link_state: PeerLinkState,
    last_handshake_at: Option<i64>,
}

impl From<&PeerRecord> for PeerRow {
    fn from(peer: &PeerRecord) -> Self {
        Self {
            name: peer.name.clone(),
            address: peer.address.clone(),
            allowed_ips: peer.allowed_ips.clone(),
            active: peer.is_active,
            link_state: peer.link_state,
            last_handshake_at: peer.last_handshake_at,
        }
    }
}

impl TableDisplay for PeerRow {
    fn headers() -> Vec<&'static str> {
        vec!["NAME", "ADDRESS", "ALLOWED IPS", "ACTIVE", "LINK", "LAST HANDSHAKE"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.address.clone(),
            self.allowed_ips.clone(),
            if self.active { "yes" } else { "no" }.to_string(),
            colorize_link(self.link_state),
            format_epoch(self.last_handshake_at),
        ]
    }
}

fn colorize_link(state: PeerLinkState) -> String {
    let text = state.to_string();
    match state {
        PeerLinkState::Connected => text.as_str().green().to_string(),
        PeerLinkState::Disconnected => text.as_str().yellow().to_string(),
        PeerLinkState::Error => text.as_str().red().to_string(),
    }
}

fn find_peer(ctx: &Context, hub_name: &str, name: &str) -> anyhow::Result<PeerRecord> {
    let hub = find_hub(ctx, hub_name)?;
    ctx.orchestrator
        .store()
        .get_peer_by_name(hub.id, name)?
        .ok_or_else(|| anyhow::anyhow!("peer '{}' not found on hub '{}'", name, hub_name))
}

pub async fn execute(cmd: &PeerCommands, ctx: &Context, format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        PeerCommands::Add(args) => {
            let hub = find_hub(ctx, &args.hub)?;
            let peer = ctx
                .orchestrator
                .create_peer(
                    hub.id,
                    CreatePeerRequest {
                        name: args.name.clone(),
                        allowed_ips: args.allowed_ips.clone(),
                    },
                )
                .await?;
            output::print_item(&PeerRow::from(&peer), format);
        }
        PeerCommands::List { hub } => {
            let hub = find_hub(ctx, hub)?;
            let peers = ctx.orchestrator.store().list_peers(hub.id)?;
            let rows: Vec<PeerRow> = peers.iter().map(PeerRow::from).collect();
            output::print_list(&rows, format);
        }
        PeerCommands::Enable { hub, name } => {
            let peer = find_peer(ctx, hub, name)?;
            ctx.orchestrator.set_peer_active(peer.id, true).await?;
            println!("Peer '{}' enabled.", name);
        }
        PeerCommands::Disable { hub, name } => {
            let peer = find_peer(ctx, hub, name)?;
            ctx.orchestrator.set_peer_active(peer.id, false).await?;
            println!("Peer '{}' disabled.", name);
        }
        PeerCommands::Remove { hub, name } => {
            let peer = find_peer(ctx, hub, name)?;
            ctx.orchestrator.remove_peer(peer.id).await?;
            println!("Peer '{}' removed.", name);
        }
        PeerCommands::Config { hub, name } => {
            let peer = find_peer(ctx, hub, name)?;
            print!("{}", ctx.orchestrator.peer_config(peer.id)?);
        }
    }
    Ok(())
}
