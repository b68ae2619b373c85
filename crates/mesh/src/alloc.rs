//! Address allocation out of a hub's CIDR block
//!
//! Ascending scan over host offsets; the first free address wins. The scan
//! is deterministic for a given used set so freed addresses are reused at
//! the lowest free offset and manual assignment stays predictable.

use ipnetwork::IpNetwork;
use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use wgmesh_common::{Error, Result};

/// Return the next free address in `cidr`.
///
/// The used set must contain the addresses of the hub's active peers; the
/// hub's own address is excluded separately. Network and broadcast
/// addresses are never handed out.
pub fn next_available_address(
    cidr: &IpNetwork,
    hub_addr: IpAddr,
    used: &HashSet<IpAddr>,
) -> Result<IpAddr> {
    match cidr {
        IpNetwork::V4(net) => {
            let base = u64::from(u32::from(net.network()));
            let span = 1u64 << (32 - net.prefix());
            // Offsets 0 (network) and span-1 (broadcast) are excluded
            for offset in 1..span.saturating_sub(1) {
                let candidate = IpAddr::V4(Ipv4Addr::from((base + offset) as u32));
                if candidate != hub_addr && !used.contains(&candidate) {
                    return Ok(candidate);
                }
            }
        }
        IpNetwork::V6(net) => {
            let base = u128::from(net.network());
            let host_bits = 128 - net.prefix();
            let last = if host_bits >= 128 {
                u128::MAX
            } else {
                (1u128 << host_bits) - 1
            };
            for offset in 1..last {
                let candidate = IpAddr::V6(Ipv6Addr::from(base + offset));
                if candidate != hub_addr && !used.contains(&candidate) {
                    return Ok(candidate);
                }
            }
        }
    }
    Err(Error::AddressSpaceExhausted {
        cidr: cidr.to_string(),
    })
}
