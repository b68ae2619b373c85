//! Remote command execution and deployment steps
//!
//! The orchestrator never talks to a transport directly: it issues commands
//! through the [`CommandRunner`] trait. The production implementation shells
//! out to `ssh`; tests substitute a scripted runner.

use crate::model::{HubRecord, SshTarget};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;
use wgmesh_common::{Error, Result};

/// Default per-command timeout for remote operations
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 30;

/// Outcome of one remote command
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == 0
    }

    /// Combined output for error reporting
    pub fn combined(&self) -> String {
        let mut s = self.stdout.trim().to_string();
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            if !s.is_empty() {
                s.push('\n');
            }
            s.push_str(stderr);
        }
        s
    }
}

/// Run one command on the hub's host and report its outcome
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &str) -> Result<CommandOutput>;
}

/// `CommandRunner` over the system `ssh` binary
pub struct SshRunner {
    target: SshTarget,
    command_timeout: Duration,
}

impl SshRunner {
    pub fn new(target: SshTarget) -> Self {
        Self {
            target,
            command_timeout: Duration::from_secs(DEFAULT_COMMAND_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }
}

#[async_trait]
impl CommandRunner for SshRunner {
    async fn run(&self, command: &str) -> Result<CommandOutput> {
        let mut c = Command::new("ssh");
        c.args([
            "-o",
            "BatchMode=yes",
            "-o",
            "StrictHostKeyChecking=accept-new",
            "-o",
            "LogLevel=ERROR",
            "-o",
            "ConnectTimeout=10",
        ]);
        if let Some(identity) = &self.target.identity_file {
            c.args(["-i", identity]);
        }
        c.args(["-p", &self.target.port.to_string()]);
        c.arg(self.target.destination());
        c.arg(command);
        c.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let output = tokio::time::timeout(self.command_timeout, c.output())
            .await
            .map_err(|_| Error::Timeout {
                seconds: self.command_timeout.as_secs(),
            })?
            .map_err(|e| Error::Unreachable(format!("ssh spawn failed: {}", e)))?;

        Ok(CommandOutput {
            status: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// One named step of a deployment sequence
pub struct DeployStep {
    pub name: &'static str,
    pub command: String,
}

/// Build the ordered deployment sequence for a hub.
///
/// `config_text` contains the decrypted private key; step commands are
/// never logged verbatim for that reason.
pub fn deploy_steps(hub: &HubRecord, config_dir: &str, config_text: &str) -> Vec<DeployStep> {
    let iface = hub.iface();
    let path = hub.config_path(config_dir);
    vec![
        DeployStep {
            name: "ensure-config-dir",
            command: format!("mkdir -p {}", config_dir),
        },
        DeployStep {
            name: "write-config",
            command: format!(
                "cat > {} <<'WGMESH_EOF'\n{}\nWGMESH_EOF",
                path,
                config_text.trim_end()
            ),
        },
        DeployStep {
            name: "restrict-permissions",
            command: format!("chmod 600 {}", path),
        },
        DeployStep {
            name: "enable-on-boot",
            command: format!("systemctl enable wg-quick@{}", iface),
        },
        DeployStep {
            name: "restart-interface",
            command: format!("systemctl restart wg-quick@{}", iface),
        },
    ]
}

/// Execute steps in order, stopping at the first failure.
///
/// The failing step's name and combined output travel in the error so the
/// operator can see exactly which remote command broke.
pub async fn run_steps(runner: &dyn CommandRunner, steps: &[DeployStep]) -> Result<()> {
    for step in steps {
        debug!(step = step.name, "running deployment step");
        let output = runner.run(&step.command).await.map_err(|e| match e {
            Error::Unreachable(msg) => Error::Deployment {
                step: step.name.to_string(),
                output: msg,
            },
            Error::Timeout { seconds } => Error::Deployment {
                step: step.name.to_string(),
                output: format!("timed out after {}s", seconds),
            },
            other => other,
        })?;
        if !output.success() {
            return Err(Error::Deployment {
                step: step.name.to_string(),
                output: output.combined(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HubStatus;
    use std::sync::Mutex;
    use uuid::Uuid;

    struct ScriptedRunner {
        commands: Mutex<Vec<String>>,
        fail_on: Option<&'static str>,
    }

    impl ScriptedRunner {
        fn new(fail_on: Option<&'static str>) -> Self {
            Self {
                commands: Mutex::new(Vec::new()),
                fail_on,
            }
        }
    }

    #[async_trait]
    impl CommandRunner for ScriptedRunner {
        async fn run(&self, command: &str) -> Result<CommandOutput> {
            self.commands.lock().unwrap().push(command.to_string());
            let fail = self.fail_on.map_or(false, |f| command.contains(f));
            Ok(CommandOutput {
                status: if fail { 1 } else { 0 },
                stdout: String::new(),
                stderr: if fail { "boom".to_string() } else { String::new() },
            })
        }
    }

    fn hub() -> HubRecord {
        HubRecord {
            id: Uuid::new_v4(),
            name: "hq".to_string(),
            description: None,
            cidr: "10.100.0.0/24".to_string(),
            address: "10.100.0.1".to_string(),
            listen_port: 51820,
            public_key: "PUB=".to_string(),
            private_key_sealed: Vec::new(),
            endpoint: "vpn.example.com:51820".to_string(),
            ssh: None,
            status: HubStatus::Draft,
            last_error: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_step_sequence() {
        let steps = deploy_steps(&hub(), "/etc/wireguard", "[Interface]\n");
        let names: Vec<&str> = steps.iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            vec![
                "ensure-config-dir",
                "write-config",
                "restrict-permissions",
                "enable-on-boot",
                "restart-interface",
            ]
        );
        assert!(steps[1].command.contains("/etc/wireguard/wg-hq.conf"));
        assert!(steps[3].command.contains("wg-quick@wg-hq"));
    }

    #[tokio::test]
    async fn test_run_steps_all_succeed() {
        let runner = ScriptedRunner::new(None);
        let steps = deploy_steps(&hub(), "/etc/wireguard", "cfg");
        run_steps(&runner, &steps).await.unwrap();
        assert_eq!(runner.commands.lock().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_run_steps_stops_at_first_failure() {
        let runner = ScriptedRunner::new(Some("chmod"));
        let steps = deploy_steps(&hub(), "/etc/wireguard", "cfg");
        let err = run_steps(&runner, &steps).await.unwrap_err();

        match err {
            Error::Deployment { step, output } => {
                assert_eq!(step, "restrict-permissions");
                assert_eq!(output, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
        // enable/restart never ran
        assert_eq!(runner.commands.lock().unwrap().len(), 3);
    }
}
