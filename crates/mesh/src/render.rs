//! Configuration rendering for hubs and peers
//!
//! Rendering is a pure function of the records passed in: same inputs,
//! byte-identical output. Peer stanzas appear in insertion order so repeated
//! renders of unchanged state can be diffed.

use crate::model::{HubRecord, PeerRecord};
use std::fmt::Write;
use wgmesh_common::Result;

/// Default keep-alive interval, keeps NAT mappings open between handshakes
pub const DEFAULT_KEEPALIVE_SECS: u16 = 25;

/// Host-route prefix length for an address (/32 or /128)
fn host_prefix(address: &str) -> u8 {
    if address.contains(':') {
        128
    } else {
        32
    }
}

/// Render the hub's own configuration file.
///
/// One `[Peer]` stanza per active peer; inactive peers never appear.
pub fn render_hub_config(
    hub: &HubRecord,
    hub_private_key: &str,
    peers: &[PeerRecord],
) -> Result<String> {
    let prefix = hub.network()?.prefix();

    let mut out = String::new();
    writeln!(out, "[Interface]").ok();
    writeln!(out, "PrivateKey = {}", hub_private_key).ok();
    writeln!(out, "Address = {}/{}", hub.address, prefix).ok();
    writeln!(out, "ListenPort = {}", hub.listen_port).ok();
    writeln!(
        out,
        "PostUp = iptables -A FORWARD -i %i -j ACCEPT; iptables -t nat -A POSTROUTING -o eth0 -j MASQUERADE"
    )
    .ok();
    writeln!(
        out,
        "PostDown = iptables -D FORWARD -i %i -j ACCEPT; iptables -t nat -D POSTROUTING -o eth0 -j MASQUERADE"
    )
    .ok();

    for peer in peers.iter().filter(|p| p.is_active) {
        writeln!(out).ok();
        writeln!(out, "[Peer]").ok();
        writeln!(out, "# {}", peer.name).ok();
        writeln!(out, "PublicKey = {}", peer.public_key).ok();
        writeln!(
            out,
            "AllowedIPs = {}/{}",
            peer.address,
            host_prefix(&peer.address)
        )
        .ok();
    }

    Ok(out)
}

/// Render a peer's client configuration file
pub fn render_peer_config(
    peer: &PeerRecord,
    peer_private_key: &str,
    hub: &HubRecord,
    dns: Option<&str>,
    keepalive_secs: u16,
) -> String {
    let mut out = String::new();
    writeln!(out, "[Interface]").ok();
    writeln!(out, "PrivateKey = {}", peer_private_key).ok();
    writeln!(
        out,
        "Address = {}/{}",
        peer.address,
        host_prefix(&peer.address)
    )
    .ok();
    if let Some(dns) = dns {
        writeln!(out, "DNS = {}", dns).ok();
    }

    writeln!(out).ok();
    writeln!(out, "[Peer]").ok();
    writeln!(out, "PublicKey = {}", hub.public_key).ok();
    writeln!(out, "Endpoint = {}", hub.endpoint).ok();
    writeln!(out, "AllowedIPs = {}", peer.allowed_ips).ok();
    writeln!(out, "PersistentKeepalive = {}", keepalive_secs).ok();

    out
}
