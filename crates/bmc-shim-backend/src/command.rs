//! Shell command backend
//!
//! Each power action runs its configured command through `sh -lc`. A
//! non-zero exit status is a failure. The child is killed if the calling
//! request goes away before it exits.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::backend::{HealthCheck, PowerBackend};
use crate::error::{BackendError, Result};
use crate::types::{BackendKind, CommandConfig};

/// Backend that shells out for power on/off
#[derive(Debug)]
pub struct CommandBackend {
    config: CommandConfig,
}

impl CommandBackend {
    /// Create a new command backend; both commands are required
    pub fn new(config: CommandConfig) -> Result<Self> {
        if config.on_cmd.trim().is_empty() || config.off_cmd.trim().is_empty() {
            return Err(BackendError::InvalidConfig(
                "command backend requires both --on-cmd and --off-cmd".to_string(),
            ));
        }
        Ok(Self { config })
    }

    pub fn on_cmd(&self) -> &str {
        &self.config.on_cmd
    }

    pub fn off_cmd(&self) -> &str {
        &self.config.off_cmd
    }

    async fn execute(&self, command: &str) -> Result<()> {
        debug!(command, "running power command");

        let output = Command::new("sh")
            .arg("-lc")
            .arg(command)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| BackendError::CommandFailed(format!("failed to spawn `{command}`: {e}")))?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        if stderr.is_empty() {
            Err(BackendError::CommandFailed(format!(
                "`{command}` exited with {}",
                output.status
            )))
        } else {
            Err(BackendError::CommandFailed(format!(
                "`{command}` exited with {}: {stderr}",
                output.status
            )))
        }
    }
}

#[async_trait]
impl PowerBackend for CommandBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Command
    }

    async fn power_on(&self) -> Result<()> {
        info!(backend = "command", "PowerOn");
        self.execute(&self.config.on_cmd).await
    }

    async fn power_off(&self) -> Result<()> {
        info!(backend = "command", "PowerOff");
        self.execute(&self.config.off_cmd).await
    }

    fn as_health_check(&self) -> Option<&dyn HealthCheck> {
        Some(self)
    }
}

// Nothing to probe without side effects, so always healthy.
#[async_trait]
impl HealthCheck for CommandBackend {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
