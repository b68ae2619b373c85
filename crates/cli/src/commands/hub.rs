//! Hub management commands

use crate::output::{self, format_epoch, OutputFormat, TableDisplay};
use crate::Context;
use clap::{Args, Subcommand};
use colored::Colorize;
use serde::Serialize;
use wgmesh_mesh::{CreateHubRequest, HubRecord, HubStatus, SshTarget};

#[derive(Subcommand)]
pub enum HubCommands {
    /// Create a new hub (status starts as draft)
    Create(CreateArgs),

    /// List all hubs
    List,

    /// Show one hub
    Show { name: String },

    /// Deploy the hub configuration to its remote host
    Deploy { name: String },

    /// Refresh peer connectivity from the running daemon
    Refresh { name: String },

    /// Render the hub configuration file
    Config { name: String },

    /// Set or replace the hub's SSH target
    SetSsh(SetSshArgs),
}

#[derive(Args)]
pub struct CreateArgs {
    /// Unique hub name
    pub name: String,

    /// Mesh CIDR block, e.g. 10.100.0.0/24
    #[arg(long)]
    pub cidr: String,

    /// The hub's own address inside the block
    #[arg(long)]
    pub address: String,

    /// WireGuard listen port
    #[arg(long, default_value_t = 51820)]
    pub listen_port: u16,

    /// host:port peers dial
    #[arg(long)]
    pub endpoint: String,

    #[arg(long)]
    pub description: Option<String>,

    /// SSH host for deployment (optional at creation)
    #[arg(long)]
    pub ssh_host: Option<String>,

    #[arg(long, default_value_t = 22)]
    pub ssh_port: u16,

    #[arg(long, default_value = "root")]
    pub ssh_user: String,

    #[arg(long)]
    pub ssh_identity: Option<String>,
}

#[derive(Args)]
pub struct SetSshArgs {
    pub name: String,

    #[arg(long)]
    pub host: String,

    #[arg(long, default_value_t = 22)]
    pub port: u16,

    #[arg(long, default_value = "root")]
    pub user: String,

    #[arg(long)]
    pub identity: Option<String>,
}

#[derive(Serialize)]
struct HubRow {
    name: String,
    cidr: String,
    address: String,
    listen_port: u16,
    endpoint: String,
    status: HubStatus,
    last_error: Option<String>,
}

impl From<&HubRecord> for HubRow {
    fn from(hub: &HubRecord) -> Self {
        Self {
            name: hub.name.clone(),
            cidr: hub.cidr.clone(),
            address: hub.address.clone(),
            listen_port: hub.listen_port,
            endpoint: hub.endpoint.clone(),
            status: hub.status,
            last_error: hub.last_error.clone(),
        }
    }
}

impl TableDisplay for HubRow {
    fn headers() -> Vec<&'static str> {
        vec!["NAME", "CIDR", "ADDRESS", "PORT", "ENDPOINT", "STATUS"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.cidr.clone(),
            self.address.clone(),
            self.listen_port.to_string(),
            self.endpoint.clone(),
            colorize_status(self.status),
        ]
    }
}

fn colorize_status(status: HubStatus) -> String {
    let text = status.to_string();
    match status {
        HubStatus::Draft => text.as_str().yellow().to_string(),
        HubStatus::Active => text.as_str().green().to_string(),
        HubStatus::Error => text.as_str().red().to_string(),
    }
}

pub(crate) fn find_hub(ctx: &Context, name: &str) -> anyhow::Result<HubRecord> {
    ctx.orchestrator
        .store()
        .get_hub_by_name(name)?
        .ok_or_else(|| anyhow::anyhow!("hub '{}' not found", name))
}

pub async fn execute(cmd: &HubCommands, ctx: &Context, format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        HubCommands::Create(args) => {
            let ssh = args.ssh_host.as_ref().map(|host| SshTarget {
                host: host.clone(),
                port: args.ssh_port,
                user: args.ssh_user.clone(),
                identity_file: args.ssh_identity.clone(),
            });
            let hub = ctx
                .orchestrator
                .create_hub(CreateHubRequest {
                    name: args.name.clone(),
                    description: args.description.clone(),
                    cidr: args.cidr.clone(),
                    address: args.address.clone(),
                    listen_port: args.listen_port,
                    endpoint: args.endpoint.clone(),
                    ssh,
                })
                .await?;
            output::print_item(&HubRow::from(&hub), format);
        }
        HubCommands::List => {
            let hubs = ctx.orchestrator.store().list_hubs()?;
            let rows: Vec<HubRow> = hubs.iter().map(HubRow::from).collect();
            output::print_list(&rows, format);
        }
        HubCommands::Show { name } => {
            let hub = find_hub(ctx, name)?;
            output::print_item(&HubRow::from(&hub), format);
        }
        HubCommands::Deploy { name } => {
            let hub = find_hub(ctx, name)?;
            ctx.orchestrator.deploy_hub(hub.id).await?;
            println!("Hub '{}' deployed.", name);
        }
        HubCommands::Refresh { name } => {
            let hub = find_hub(ctx, name)?;
            let refresh = ctx.orchestrator.refresh_status(hub.id).await?;
            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&refresh)?);
                }
                _ => {
                    for peer in &refresh.peers {
                        println!(
                            "{}: {} (last handshake {})",
                            peer.name,
                            peer.link_state,
                            format_epoch(peer.last_handshake_at)
                        );
                    }
                    if refresh.peers.is_empty() {
                        println!("No peer state reported ({:?}).", refresh.probe);
                    }
                }
            }
        }
        HubCommands::Config { name } => {
            let hub = find_hub(ctx, name)?;
            print!("{}", ctx.orchestrator.hub_config(hub.id)?);
        }
        HubCommands::SetSsh(args) => {
            let hub = find_hub(ctx, &args.name)?;
            let target = SshTarget {
                host: args.host.clone(),
                port: args.port,
                user: args.user.clone(),
                identity_file: args.identity.clone(),
            };
            ctx.orchestrator
                .store()
                .update_hub_ssh(hub.id, Some(&target))?;
            println!("Hub '{}' SSH target updated.", args.name);
        }
    }
    Ok(())
}
