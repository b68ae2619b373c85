//! Orchestration façade
//!
//! The four mesh operations — create hub, create peer, deploy, refresh —
//! plus the peer lifecycle helpers the admin surface drives. All record
//! mutation goes through here so key generation and address allocation
//! rules cannot be bypassed.
//!
//! Per-hub serialization: peer creation and deployment for one hub run
//! under that hub's async mutex; operations on different hubs proceed
//! concurrently. A second deployment request for a hub waits for the
//! first and then re-runs the idempotent step sequence.

use crate::alloc::next_available_address;
use crate::config::MeshConfig;
use crate::keys::WgKeyPair;
use crate::model::{HubRecord, HubStatus, PeerLinkState, PeerRecord, SshTarget};
use crate::remote::{deploy_steps, run_steps, CommandRunner, SshRunner};
use crate::render::{render_hub_config, render_peer_config};
use crate::status::{parse_wg_show, reconcile_link};
use crate::store::{now_epoch_secs, MeshStore};
use dashmap::DashMap;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;
use wgmesh_common::{Error, Result, SecretBox};

/// Builds a command runner for a hub's SSH target
pub type RunnerFactory = Arc<dyn Fn(&SshTarget) -> Arc<dyn CommandRunner> + Send + Sync>;

/// Attempts at allocate-and-insert before giving up; collisions only
/// happen when another process races the same hub
const ALLOC_ATTEMPTS: usize = 5;

#[derive(Debug, Clone)]
pub struct CreateHubRequest {
    pub name: String,
    pub description: Option<String>,
    pub cidr: String,
    pub address: String,
    pub listen_port: u16,
    pub endpoint: String,
    pub ssh: Option<SshTarget>,
}

#[derive(Debug, Clone)]
pub struct CreatePeerRequest {
    pub name: String,
    /// Defaults to the hub's CIDR when unset
    pub allowed_ips: Option<String>,
}

/// Whether the hub's daemon was actually queried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    /// No remote target configured; nothing was queried
    Unknown,
    /// Daemon answered the status query
    Live,
}

#[derive(Debug, Clone, Serialize)]
pub struct PeerLinkReport {
    pub peer_id: Uuid,
    pub name: String,
    pub link_state: PeerLinkState,
    pub last_handshake_at: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusRefresh {
    pub probe: ProbeStatus,
    pub peers: Vec<PeerLinkReport>,
}

/// Entry point for all mesh operations
pub struct MeshOrchestrator {
    store: MeshStore,
    secrets: SecretBox,
    settings: MeshConfig,
    runners: RunnerFactory,
    hub_locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl MeshOrchestrator {
    /// Orchestrator with the production SSH runner
    pub fn new(store: MeshStore, secrets: SecretBox, settings: MeshConfig) -> Self {
        let timeout = Duration::from_secs(settings.ssh_command_timeout_secs);
        let runners: RunnerFactory = Arc::new(move |target: &SshTarget| {
            Arc::new(SshRunner::new(target.clone()).with_timeout(timeout)) as Arc<dyn CommandRunner>
        });
        Self::with_runner_factory(store, secrets, settings, runners)
    }

    /// Orchestrator with an injected runner factory (tests, other transports)
    pub fn with_runner_factory(
        store: MeshStore,
        secrets: SecretBox,
        settings: MeshConfig,
        runners: RunnerFactory,
    ) -> Self {
        Self {
            store,
            secrets,
            settings,
            runners,
            hub_locks: DashMap::new(),
        }
    }

    pub fn store(&self) -> &MeshStore {
        &self.store
    }

    fn lock_for(&self, hub_id: Uuid) -> Arc<Mutex<()>> {
        self.hub_locks
            .entry(hub_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn require_hub(&self, hub_id: Uuid) -> Result<HubRecord> {
        self.store.get_hub(hub_id)?.ok_or_else(|| Error::NotFound {
            kind: "hub".to_string(),
            id: hub_id.to_string(),
        })
    }

    fn require_peer(&self, peer_id: Uuid) -> Result<PeerRecord> {
        self.store.get_peer(peer_id)?.ok_or_else(|| Error::NotFound {
            kind: "peer".to_string(),
            id: peer_id.to_string(),
        })
    }

    // ========================================================================
    // Create operations
    // ========================================================================

    /// Create a hub in `draft` state with a fresh key pair
    pub async fn create_hub(&self, req: CreateHubRequest) -> Result<HubRecord> {
        let network: ipnetwork::IpNetwork = req
            .cidr
            .parse()
            .map_err(|_| Error::InvalidAddress(format!("bad CIDR '{}'", req.cidr)))?;
        let address: std::net::IpAddr = req
            .address
            .parse()
            .map_err(|_| Error::InvalidAddress(format!("bad address '{}'", req.address)))?;
        if !network.contains(address) {
            return Err(Error::InvalidAddress(format!(
                "hub address {} is outside {}",
                address, network
            )));
        }
        if req.endpoint.is_empty() {
            return Err(Error::InvalidConfig("hub endpoint is required".to_string()));
        }

        let keypair = WgKeyPair::generate()?;
        let sealed = self.secrets.seal(keypair.private_key.as_bytes())?;

        let now = now_epoch_secs();
        let hub = HubRecord {
            id: Uuid::new_v4(),
            name: req.name,
            description: req.description,
            cidr: network.to_string(),
            address: address.to_string(),
            listen_port: req.listen_port,
            public_key: keypair.public_key,
            private_key_sealed: sealed,
            endpoint: req.endpoint,
            ssh: req.ssh,
            status: HubStatus::Draft,
            last_error: None,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_hub(&hub)?;

        info!(hub = %hub.name, cidr = %hub.cidr, "created hub");
        Ok(hub)
    }

    /// Create a peer under the hub's lock: allocation and insert are one
    /// atomic unit, so concurrent creations never share an address.
    pub async fn create_peer(&self, hub_id: Uuid, req: CreatePeerRequest) -> Result<PeerRecord> {
        let hub = self.require_hub(hub_id)?;
        let network = hub.network()?;
        let hub_addr = hub.ip()?;

        let lock = self.lock_for(hub_id);
        let _guard = lock.lock().await;

        // The lock serializes in-process callers; the partial unique index
        // backs this up across processes, so retry on a lost race.
        for attempt in 0..ALLOC_ATTEMPTS {
            let used = self.store.used_addresses(hub_id)?;
            let address = next_available_address(&network, hub_addr, &used)?;

            let keypair = WgKeyPair::generate()?;
            let sealed = self.secrets.seal(keypair.private_key.as_bytes())?;

            let peer = PeerRecord {
                id: Uuid::new_v4(),
                hub_id,
                name: req.name.clone(),
                address: address.to_string(),
                allowed_ips: req.allowed_ips.clone().unwrap_or_else(|| hub.cidr.clone()),
                public_key: keypair.public_key,
                private_key_sealed: sealed,
                is_active: true,
                link_state: PeerLinkState::Disconnected,
                last_handshake_at: None,
                created_at: now_epoch_secs(),
            };

            match self.store.insert_peer(&peer) {
                Ok(()) => {
                    info!(hub = %hub.name, peer = %peer.name, address = %peer.address, "created peer");
                    return Ok(peer);
                }
                Err(Error::AlreadyExists { .. }) if attempt + 1 < ALLOC_ATTEMPTS => {
                    warn!(hub = %hub.name, address = %peer.address, "address race lost, retrying");
                }
                Err(e) => return Err(e),
            }
        }
        Err(Error::Internal(format!(
            "could not allocate an address in {} after {} attempts",
            hub.cidr, ALLOC_ATTEMPTS
        )))
    }

    // ========================================================================
    // Deployment
    // ========================================================================

    /// Render and push the hub configuration, then (re)start the interface.
    ///
    /// The full step sequence is idempotent; redeploying an unchanged hub
    /// converges to the same running state. The hub only transitions to
    /// `active` after the final step succeeds, so a cancelled or failed
    /// deployment never reports a healthy hub.
    pub async fn deploy_hub(&self, hub_id: Uuid) -> Result<()> {
        let hub = self.require_hub(hub_id)?;
        let ssh = hub.ssh.clone().ok_or_else(|| {
            Error::InvalidConfig(format!("hub '{}' has no remote target", hub.name))
        })?;

        let lock = self.lock_for(hub_id);
        let _guard = lock.lock().await;

        let peers = self.store.list_active_peers(hub_id)?;
        let steps = {
            // Decrypt-on-use: the plaintext key lives only inside this block
            let private_key = self.secrets.open_string(&hub.private_key_sealed)?;
            let config_text = render_hub_config(&hub, &private_key, &peers)?;
            deploy_steps(&hub, &self.settings.config_dir, &config_text)
        };

        let runner = (self.runners)(&ssh);
        info!(hub = %hub.name, peers = peers.len(), "deploying hub configuration");

        match run_steps(runner.as_ref(), &steps).await {
            Ok(()) => {
                self.store
                    .update_hub_status(hub_id, HubStatus::Active, None)?;
                info!(hub = %hub.name, "hub deployed");
                Ok(())
            }
            Err(e) => {
                warn!(hub = %hub.name, error = %e, "deployment failed");
                self.store
                    .update_hub_status(hub_id, HubStatus::Error, Some(&e.to_string()))?;
                Err(e)
            }
        }
    }

    // ========================================================================
    // Status refresh
    // ========================================================================

    /// Query the hub's daemon and reconcile peer connectivity.
    ///
    /// A hub without a remote target yields an `Unknown` probe and no
    /// changes. An unreachable hub yields `Error::Unreachable` and peer
    /// statuses are left untouched: a failed query is no information, not
    /// evidence of disconnection.
    pub async fn refresh_status(&self, hub_id: Uuid) -> Result<StatusRefresh> {
        let hub = self.require_hub(hub_id)?;
        let Some(ssh) = hub.ssh.clone() else {
            return Ok(StatusRefresh {
                probe: ProbeStatus::Unknown,
                peers: Vec::new(),
            });
        };

        let runner = (self.runners)(&ssh);
        let output = runner
            .run(&format!("wg show {}", hub.iface()))
            .await
            .map_err(|e| match e {
                Error::Unreachable(_) => e,
                Error::Timeout { seconds } => {
                    Error::Unreachable(format!("status query timed out after {}s", seconds))
                }
                other => other,
            })?;
        if !output.success() {
            return Err(Error::Unreachable(format!(
                "status query failed: {}",
                output.combined()
            )));
        }

        let now = now_epoch_secs();
        let reports = parse_wg_show(&output.stdout, now);
        let by_key: HashMap<&str, &crate::status::PeerReport> = reports
            .iter()
            .map(|r| (r.public_key.as_str(), r))
            .collect();

        let mut peer_reports = Vec::new();
        for peer in self.store.list_peers(hub_id)? {
            let report = by_key.get(peer.public_key.as_str()).copied();
            let (state, handshake_at) =
                reconcile_link(report, now, self.settings.handshake_freshness_secs);
            self.store.update_peer_link(peer.id, state, handshake_at)?;
            peer_reports.push(PeerLinkReport {
                peer_id: peer.id,
                name: peer.name,
                link_state: state,
                last_handshake_at: handshake_at.or(peer.last_handshake_at),
            });
        }

        info!(hub = %hub.name, peers = peer_reports.len(), "refreshed peer status");
        Ok(StatusRefresh {
            probe: ProbeStatus::Live,
            peers: peer_reports,
        })
    }

    // ========================================================================
    // Peer lifecycle
    // ========================================================================

    /// Toggle a peer in or out of configuration rendering without
    /// deleting its record
    pub async fn set_peer_active(&self, peer_id: Uuid, active: bool) -> Result<()> {
        let peer = self.require_peer(peer_id)?;
        self.store.set_peer_active(peer_id, active)?;
        info!(peer = %peer.name, active, "peer activation changed");
        Ok(())
    }

    /// Hard-delete a peer. An active hub is redeployed so the removed
    /// peer also disappears from the running configuration.
    pub async fn remove_peer(&self, peer_id: Uuid) -> Result<()> {
        let peer = self.require_peer(peer_id)?;
        let hub = self.require_hub(peer.hub_id)?;

        self.store.delete_peer(peer_id)?;
        info!(hub = %hub.name, peer = %peer.name, "peer removed");

        if hub.status == HubStatus::Active && hub.ssh.is_some() {
            self.deploy_hub(hub.id).await?;
        }
        Ok(())
    }

    // ========================================================================
    // Rendering for operators
    // ========================================================================

    /// Render the hub configuration (decrypt-on-use)
    pub fn hub_config(&self, hub_id: Uuid) -> Result<String> {
        let hub = self.require_hub(hub_id)?;
        let peers = self.store.list_active_peers(hub_id)?;
        let private_key = self.secrets.open_string(&hub.private_key_sealed)?;
        render_hub_config(&hub, &private_key, &peers)
    }

    /// Render a peer's client configuration (decrypt-on-use)
    pub fn peer_config(&self, peer_id: Uuid) -> Result<String> {
        let peer = self.require_peer(peer_id)?;
        let hub = self.require_hub(peer.hub_id)?;
        let private_key = self.secrets.open_string(&peer.private_key_sealed)?;
        Ok(render_peer_config(
            &peer,
            &private_key,
            &hub,
            self.settings.dns.as_deref(),
            self.settings.keepalive_secs,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::remote::CommandOutput;
    use wgmesh_common::Database;

    /// Scripted runner: succeeds by default, optionally failing commands
    /// that contain a marker or answering `wg show` with canned output.
    struct FakeRunner {
        fail_containing: Option<&'static str>,
        unreachable: bool,
        wg_show: Option<String>,
        commands: std::sync::Mutex<Vec<String>>,
    }

    impl FakeRunner {
        fn ok() -> Arc<Self> {
            Arc::new(Self {
                fail_containing: None,
                unreachable: false,
                wg_show: None,
                commands: std::sync::Mutex::new(Vec::new()),
            })
        }

        fn failing(marker: &'static str) -> Arc<Self> {
            Arc::new(Self {
                fail_containing: Some(marker),
                unreachable: false,
                wg_show: None,
                commands: std::sync::Mutex::new(Vec::new()),
            })
        }

        fn unreachable() -> Arc<Self> {
            Arc::new(Self {
                fail_containing: None,
                unreachable: true,
                wg_show: None,
                commands: std::sync::Mutex::new(Vec::new()),
            })
        }

        fn with_wg_show(output: &str) -> Arc<Self> {
            Arc::new(Self {
                fail_containing: None,
                unreachable: false,
                wg_show: Some(output.to_string()),
                commands: std::sync::Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl CommandRunner for FakeRunner {
        async fn run(&self, command: &str) -> Result<CommandOutput> {
            self.commands.lock().unwrap().push(command.to_string());
            if self.unreachable {
                return Err(Error::Unreachable("no route to host".to_string()));
            }
            if self.fail_containing.map_or(false, |m| command.contains(m)) {
                return Ok(CommandOutput {
                    status: 1,
                    stdout: String::new(),
                    stderr: "unit failed".to_string(),
                });
            }
            let stdout = match (&self.wg_show, command.starts_with("wg show")) {
                (Some(out), true) => out.clone(),
                _ => String::new(),
            };
            Ok(CommandOutput {
                status: 0,
                stdout,
                stderr: String::new(),
            })
        }
    }

    fn orchestrator(runner: Arc<FakeRunner>) -> MeshOrchestrator {
        let db = Database::open_memory().unwrap();
        let store = MeshStore::new(db);
        store.init_schema().unwrap();
        let factory: RunnerFactory = Arc::new(move |_| runner.clone() as Arc<dyn CommandRunner>);
        MeshOrchestrator::with_runner_factory(
            store,
            SecretBox::from_passphrase("test"),
            MeshConfig::default(),
            factory,
        )
    }

    fn hub_request(ssh: bool) -> CreateHubRequest {
        CreateHubRequest {
            name: "hq".to_string(),
            description: None,
            cidr: "10.100.0.0/24".to_string(),
            address: "10.100.0.1".to_string(),
            listen_port: 51820,
            endpoint: "vpn.example.com:51820".to_string(),
            ssh: ssh.then(|| SshTarget {
                host: "203.0.113.9".to_string(),
                port: 22,
                user: "root".to_string(),
                identity_file: None,
            }),
        }
    }

    #[tokio::test]
    async fn test_create_hub_starts_draft() {
        let orch = orchestrator(FakeRunner::ok());
        let hub = orch.create_hub(hub_request(false)).await.unwrap();
        assert_eq!(hub.status, HubStatus::Draft);
        assert_eq!(hub.public_key.len(), 44);
        assert!(!hub.private_key_sealed.is_empty());
    }

    #[tokio::test]
    async fn test_create_hub_rejects_address_outside_cidr() {
        let orch = orchestrator(FakeRunner::ok());
        let mut req = hub_request(false);
        req.address = "192.168.1.1".to_string();
        assert!(matches!(
            orch.create_hub(req).await.unwrap_err(),
            Error::InvalidAddress(_)
        ));
    }

    #[tokio::test]
    async fn test_peer_addresses_ascend() {
        let orch = orchestrator(FakeRunner::ok());
        let hub = orch.create_hub(hub_request(false)).await.unwrap();

        for expected in ["10.100.0.2", "10.100.0.3", "10.100.0.4"] {
            let peer = orch
                .create_peer(
                    hub.id,
                    CreatePeerRequest {
                        name: format!("peer-{}", expected),
                        allowed_ips: None,
                    },
                )
                .await
                .unwrap();
            assert_eq!(peer.address, expected);
            assert_eq!(peer.allowed_ips, "10.100.0.0/24");
        }
    }

    #[tokio::test]
    async fn test_concurrent_peer_creation_yields_distinct_addresses() {
        let orch = Arc::new(orchestrator(FakeRunner::ok()));
        let hub = orch.create_hub(hub_request(false)).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..8 {
            let orch = orch.clone();
            handles.push(tokio::spawn(async move {
                orch.create_peer(
                    hub.id,
                    CreatePeerRequest {
                        name: format!("peer-{}", i),
                        allowed_ips: None,
                    },
                )
                .await
                .unwrap()
                .address
            }));
        }

        let mut addresses = std::collections::HashSet::new();
        for handle in handles {
            assert!(addresses.insert(handle.await.unwrap()));
        }
        assert_eq!(addresses.len(), 8);
        assert!(!addresses.contains("10.100.0.1"));
    }

    #[tokio::test]
    async fn test_deploy_without_remote_target_is_config_error() {
        let orch = orchestrator(FakeRunner::ok());
        let hub = orch.create_hub(hub_request(false)).await.unwrap();

        let err = orch.deploy_hub(hub.id).await.unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));

        // no remote call was attempted, status untouched
        let hub = orch.store().get_hub(hub.id).unwrap().unwrap();
        assert_eq!(hub.status, HubStatus::Draft);
    }

    #[tokio::test]
    async fn test_deploy_success_marks_active() {
        let runner = FakeRunner::ok();
        let orch = orchestrator(runner.clone());
        let hub = orch.create_hub(hub_request(true)).await.unwrap();

        orch.deploy_hub(hub.id).await.unwrap();

        let hub = orch.store().get_hub(hub.id).unwrap().unwrap();
        assert_eq!(hub.status, HubStatus::Active);
        assert!(hub.last_error.is_none());
        assert_eq!(runner.commands.lock().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_deploy_failure_marks_error_never_active() {
        let orch = orchestrator(FakeRunner::failing("systemctl restart"));
        let hub = orch.create_hub(hub_request(true)).await.unwrap();

        let err = orch.deploy_hub(hub.id).await.unwrap_err();
        assert!(matches!(err, Error::Deployment { .. }));

        let hub = orch.store().get_hub(hub.id).unwrap().unwrap();
        assert_eq!(hub.status, HubStatus::Error);
        assert!(hub.last_error.is_some());
    }

    #[tokio::test]
    async fn test_refresh_without_target_is_unknown() {
        let orch = orchestrator(FakeRunner::ok());
        let hub = orch.create_hub(hub_request(false)).await.unwrap();

        let refresh = orch.refresh_status(hub.id).await.unwrap();
        assert_eq!(refresh.probe, ProbeStatus::Unknown);
        assert!(refresh.peers.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_unreachable_leaves_statuses_untouched() {
        let orch = orchestrator(FakeRunner::unreachable());
        let hub = orch.create_hub(hub_request(true)).await.unwrap();
        let peer = orch
            .create_peer(
                hub.id,
                CreatePeerRequest {
                    name: "laptop".to_string(),
                    allowed_ips: None,
                },
            )
            .await
            .unwrap();
        orch.store()
            .update_peer_link(peer.id, PeerLinkState::Connected, Some(1_700_000_000))
            .unwrap();

        let err = orch.refresh_status(hub.id).await.unwrap_err();
        assert!(matches!(err, Error::Unreachable(_)));

        let peer = orch.store().get_peer(peer.id).unwrap().unwrap();
        assert_eq!(peer.link_state, PeerLinkState::Connected);
        assert_eq!(peer.last_handshake_at, Some(1_700_000_000));
    }

    #[tokio::test]
    async fn test_refresh_reconciles_fresh_and_absent_peers() {
        let orch = orchestrator(FakeRunner::ok());
        let hub = orch.create_hub(hub_request(true)).await.unwrap();
        let laptop = orch
            .create_peer(
                hub.id,
                CreatePeerRequest {
                    name: "laptop".to_string(),
                    allowed_ips: None,
                },
            )
            .await
            .unwrap();
        let phone = orch
            .create_peer(
                hub.id,
                CreatePeerRequest {
                    name: "phone".to_string(),
                    allowed_ips: None,
                },
            )
            .await
            .unwrap();

        // laptop handshook 2 minutes ago; phone is absent from the output
        let wg_show = format!(
            "peer: {}\n  endpoint: 203.0.113.5:40412\n  latest handshake: 2 minutes ago\n",
            laptop.public_key
        );
        let runner = FakeRunner::with_wg_show(&wg_show);
        let factory: RunnerFactory = {
            let runner = runner.clone();
            Arc::new(move |_| runner.clone() as Arc<dyn CommandRunner>)
        };
        let orch = MeshOrchestrator::with_runner_factory(
            orch.store.clone(),
            SecretBox::from_passphrase("test"),
            MeshConfig::default(),
            factory,
        );

        let refresh = orch.refresh_status(hub.id).await.unwrap();
        assert_eq!(refresh.probe, ProbeStatus::Live);

        let laptop = orch.store().get_peer(laptop.id).unwrap().unwrap();
        assert_eq!(laptop.link_state, PeerLinkState::Connected);
        assert!(laptop.last_handshake_at.is_some());

        let phone = orch.store().get_peer(phone.id).unwrap().unwrap();
        assert_eq!(phone.link_state, PeerLinkState::Disconnected);
        assert!(phone.last_handshake_at.is_none());
    }

    #[tokio::test]
    async fn test_remove_peer_from_active_hub_redeploys() {
        let runner = FakeRunner::ok();
        let orch = orchestrator(runner.clone());
        let hub = orch.create_hub(hub_request(true)).await.unwrap();
        let peer = orch
            .create_peer(
                hub.id,
                CreatePeerRequest {
                    name: "laptop".to_string(),
                    allowed_ips: None,
                },
            )
            .await
            .unwrap();

        orch.deploy_hub(hub.id).await.unwrap();
        let before = runner.commands.lock().unwrap().len();

        orch.remove_peer(peer.id).await.unwrap();
        let after = runner.commands.lock().unwrap().len();
        assert_eq!(after - before, 5); // full redeploy ran

        assert!(orch.store().get_peer(peer.id).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_hub_config_round_trips_sealed_key() {
        let orch = orchestrator(FakeRunner::ok());
        let hub = orch.create_hub(hub_request(false)).await.unwrap();

        let config = orch.hub_config(hub.id).unwrap();
        assert!(config.contains("[Interface]"));
        assert!(config.contains("Address = 10.100.0.1/24"));
        // rendered key is the sealed one, decrypted
        let private_line = config
            .lines()
            .find(|l| l.starts_with("PrivateKey = "))
            .unwrap();
        let key = private_line.trim_start_matches("PrivateKey = ");
        let rebuilt = WgKeyPair::from_private_key(key).unwrap();
        assert_eq!(rebuilt.public_key, hub.public_key);
    }
}
