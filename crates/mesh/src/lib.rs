//! wgmesh orchestrator core
//!
//! Manages a hub-and-spoke WireGuard mesh:
//! - Key pair generation and sealed-at-rest private keys
//! - Address allocation out of each hub's CIDR block
//! - Hub and peer configuration rendering
//! - Remote deployment over SSH
//! - Connectivity reconciliation against live `wg show` output
//!
//! The [`MeshOrchestrator`] façade is the only mutation path for hub and
//! peer records; the surrounding admin surface calls it and consumes the
//! typed results.

pub mod alloc;
pub mod config;
pub mod keys;
pub mod model;
pub mod orchestrator;
pub mod remote;
pub mod render;
pub mod status;
pub mod store;

pub use config::MeshConfig;
pub use keys::WgKeyPair;
pub use model::{HubRecord, HubStatus, PeerLinkState, PeerRecord, SshTarget};
pub use orchestrator::{
    CreateHubRequest, CreatePeerRequest, MeshOrchestrator, PeerLinkReport, ProbeStatus,
    StatusRefresh,
};
pub use remote::{CommandOutput, CommandRunner, SshRunner};
pub use store::MeshStore;
