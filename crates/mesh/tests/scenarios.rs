//! End-to-end orchestration scenarios against an in-memory database
//! and a scripted command runner.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use wgmesh_common::{Database, Error, Result, SecretBox};
use wgmesh_mesh::{
    CommandOutput, CommandRunner, CreateHubRequest, CreatePeerRequest, HubStatus, MeshConfig,
    MeshOrchestrator, MeshStore, PeerLinkState, ProbeStatus, SshTarget,
};

/// Runner answering every command with success; `wg show` gets canned output
struct ScriptedRunner {
    wg_show: Mutex<String>,
    commands: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            wg_show: Mutex::new(String::new()),
            commands: Mutex::new(Vec::new()),
        })
    }

    fn set_wg_show(&self, output: String) {
        *self.wg_show.lock().unwrap() = output;
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, command: &str) -> Result<CommandOutput> {
        self.commands.lock().unwrap().push(command.to_string());
        let stdout = if command.starts_with("wg show") {
            self.wg_show.lock().unwrap().clone()
        } else {
            String::new()
        };
        Ok(CommandOutput {
            status: 0,
            stdout,
            stderr: String::new(),
        })
    }
}

fn orchestrator(runner: Arc<ScriptedRunner>) -> MeshOrchestrator {
    let db = Database::open_memory().unwrap();
    let store = MeshStore::new(db);
    store.init_schema().unwrap();
    MeshOrchestrator::with_runner_factory(
        store,
        SecretBox::from_passphrase("scenario tests"),
        MeshConfig::default(),
        Arc::new(move |_| runner.clone() as Arc<dyn CommandRunner>),
    )
}

fn hub_request(with_ssh: bool) -> CreateHubRequest {
    CreateHubRequest {
        name: "hq".to_string(),
        description: Some("primary concentrator".to_string()),
        cidr: "10.100.0.0/24".to_string(),
        address: "10.100.0.1".to_string(),
        listen_port: 51820,
        endpoint: "vpn.example.com:51820".to_string(),
        ssh: with_ssh.then(|| SshTarget {
            host: "203.0.113.9".to_string(),
            port: 22,
            user: "root".to_string(),
            identity_file: None,
        }),
    }
}

async fn add_peer(orch: &MeshOrchestrator, hub_id: uuid::Uuid, name: &str) -> wgmesh_mesh::PeerRecord {
    orch.create_peer(
        hub_id,
        CreatePeerRequest {
            name: name.to_string(),
            allowed_ips: None,
        },
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn scenario_hub_lifecycle_and_deactivation() {
    let orch = orchestrator(ScriptedRunner::new());

    let hub = orch.create_hub(hub_request(false)).await.unwrap();
    assert_eq!(hub.status, HubStatus::Draft);

    let p1 = add_peer(&orch, hub.id, "laptop").await;
    let p2 = add_peer(&orch, hub.id, "phone").await;
    let p3 = add_peer(&orch, hub.id, "tablet").await;
    assert_eq!(p1.address, "10.100.0.2");
    assert_eq!(p2.address, "10.100.0.3");
    assert_eq!(p3.address, "10.100.0.4");

    orch.set_peer_active(p2.id, false).await.unwrap();

    let config = orch.hub_config(hub.id).unwrap();
    assert!(config.contains(&p1.public_key));
    assert!(!config.contains(&p2.public_key));
    assert!(config.contains(&p3.public_key));
}

#[tokio::test]
async fn scenario_deploy_without_target_fails_cleanly() {
    let runner = ScriptedRunner::new();
    let orch = orchestrator(runner.clone());

    let hub = orch.create_hub(hub_request(false)).await.unwrap();
    let err = orch.deploy_hub(hub.id).await.unwrap_err();
    assert!(matches!(err, Error::InvalidConfig(_)));

    let hub = orch.store().get_hub(hub.id).unwrap().unwrap();
    assert_eq!(hub.status, HubStatus::Draft);
    assert!(runner.commands.lock().unwrap().is_empty());
}

#[tokio::test]
async fn scenario_refresh_marks_fresh_connected_and_absent_disconnected() {
    let runner = ScriptedRunner::new();
    let orch = orchestrator(runner.clone());

    let hub = orch.create_hub(hub_request(true)).await.unwrap();
    let p1 = add_peer(&orch, hub.id, "laptop").await;
    let _p2 = add_peer(&orch, hub.id, "phone").await;
    let p3 = add_peer(&orch, hub.id, "tablet").await;

    runner.set_wg_show(format!(
        "interface: wg-hq\n  listening port: 51820\n\n\
         peer: {}\n  endpoint: 203.0.113.5:40412\n  allowed ips: 10.100.0.2/32\n  \
         latest handshake: 2 minutes ago\n  transfer: 1.21 MiB received, 4.37 MiB sent\n",
        p1.public_key
    ));

    let refresh = orch.refresh_status(hub.id).await.unwrap();
    assert_eq!(refresh.probe, ProbeStatus::Live);

    let p1 = orch.store().get_peer(p1.id).unwrap().unwrap();
    assert_eq!(p1.link_state, PeerLinkState::Connected);
    assert!(p1.last_handshake_at.is_some());

    let p3 = orch.store().get_peer(p3.id).unwrap().unwrap();
    assert_eq!(p3.link_state, PeerLinkState::Disconnected);
    assert!(p3.last_handshake_at.is_none());
}

#[tokio::test]
async fn scenario_deploy_then_redeploy_is_idempotent() {
    let runner = ScriptedRunner::new();
    let orch = orchestrator(runner.clone());

    let hub = orch.create_hub(hub_request(true)).await.unwrap();
    add_peer(&orch, hub.id, "laptop").await;

    orch.deploy_hub(hub.id).await.unwrap();
    let first: Vec<String> = runner.commands.lock().unwrap().clone();

    orch.deploy_hub(hub.id).await.unwrap();
    let second: Vec<String> = runner.commands.lock().unwrap()[first.len()..].to_vec();

    // unchanged state renders the same configuration, so the same steps run
    assert_eq!(first, second);

    let hub = orch.store().get_hub(hub.id).unwrap().unwrap();
    assert_eq!(hub.status, HubStatus::Active);
}
