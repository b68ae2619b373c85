//! Hub and peer data model

use ipnetwork::IpNetwork;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use uuid::Uuid;
use wgmesh_common::{Error, Result};

/// Hub lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HubStatus {
    Draft,
    Active,
    Error,
}

impl Default for HubStatus {
    fn default() -> Self {
        Self::Draft
    }
}

impl std::fmt::Display for HubStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Active => write!(f, "active"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for HubStatus {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "active" => Ok(Self::Active),
            "error" => Ok(Self::Error),
            _ => Err(format!("unknown hub status: {}", s)),
        }
    }
}

/// Peer connectivity state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeerLinkState {
    Disconnected,
    Connected,
    Error,
}

impl Default for PeerLinkState {
    fn default() -> Self {
        Self::Disconnected
    }
}

impl std::fmt::Display for PeerLinkState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connected => write!(f, "connected"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for PeerLinkState {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "disconnected" => Ok(Self::Disconnected),
            "connected" => Ok(Self::Connected),
            "error" => Ok(Self::Error),
            _ => Err(format!("unknown peer link state: {}", s)),
        }
    }
}

/// How to reach a hub administratively over SSH
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SshTarget {
    pub host: String,
    #[serde(default = "default_ssh_port")]
    pub port: u16,
    #[serde(default = "default_ssh_user")]
    pub user: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity_file: Option<String>,
}

fn default_ssh_port() -> u16 {
    22
}

fn default_ssh_user() -> String {
    "root".to_string()
}

impl SshTarget {
    pub fn destination(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }
}

/// One VPN concentrator endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubRecord {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// CIDR block for the whole mesh
    pub cidr: String,
    /// The hub's own address inside the block
    pub address: String,
    pub listen_port: u16,
    pub public_key: String,
    /// Sealed ciphertext; plaintext exists only transiently at render time
    #[serde(skip)]
    pub private_key_sealed: Vec<u8>,
    /// host:port peers dial
    pub endpoint: String,
    pub ssh: Option<SshTarget>,
    pub status: HubStatus,
    pub last_error: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl HubRecord {
    /// Parsed CIDR block
    pub fn network(&self) -> Result<IpNetwork> {
        self.cidr
            .parse()
            .map_err(|_| Error::InvalidAddress(format!("bad CIDR '{}'", self.cidr)))
    }

    /// Parsed own address
    pub fn ip(&self) -> Result<IpAddr> {
        self.address
            .parse()
            .map_err(|_| Error::InvalidAddress(format!("bad address '{}'", self.address)))
    }

    /// WireGuard interface name derived from the hub name.
    ///
    /// Lowercased, non-alphanumerics collapsed to single dashes, truncated
    /// to the 15-byte IFNAMSIZ limit.
    pub fn iface(&self) -> String {
        let mut out = String::from("wg-");
        let mut dash = true; // suppress a leading dash after the prefix
        for c in self.name.chars() {
            if c.is_ascii_alphanumeric() {
                out.push(c.to_ascii_lowercase());
                dash = false;
            } else if !dash {
                out.push('-');
                dash = true;
            }
            if out.len() >= 15 {
                break;
            }
        }
        out.truncate(15);
        out.trim_end_matches('-').to_string()
    }

    /// Path of the rendered configuration on the remote host
    pub fn config_path(&self, config_dir: &str) -> String {
        format!("{}/{}.conf", config_dir.trim_end_matches('/'), self.iface())
    }
}

/// One VPN client attached to a hub
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerRecord {
    pub id: Uuid,
    pub hub_id: Uuid,
    pub name: String,
    /// Allocated address, unique among the hub's active peers
    pub address: String,
    /// Comma-joined CIDR list the peer may route through the tunnel
    pub allowed_ips: String,
    pub public_key: String,
    #[serde(skip)]
    pub private_key_sealed: Vec<u8>,
    /// Inactive peers keep their record but drop out of rendering and deployment
    pub is_active: bool,
    pub link_state: PeerLinkState,
    pub last_handshake_at: Option<i64>,
    pub created_at: i64,
}

impl PeerRecord {
    pub fn ip(&self) -> Result<IpAddr> {
        self.address
            .parse()
            .map_err(|_| Error::InvalidAddress(format!("bad address '{}'", self.address)))
    }
}
