//! Serve command
//!
//! Turns command-line flags into a system registry and runs the Redfish
//! server until Ctrl+C or SIGTERM.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use bmc_shim_backend::{
    BackendKind, CommandBackend, CommandConfig, HomeAssistantBackend, HomeAssistantConfig,
    NoopBackend, PowerBackend,
};
use bmc_shim_server::{Credentials, ServerConfig, SystemRegistry};
use clap::Args;
use tracing::{info, warn};

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to listen on (e.g. :8080)
    #[arg(long, env = "BMC_SHIM_LISTEN", default_value = bmc_shim_server::config::DEFAULT_LISTEN)]
    pub listen: String,

    /// Basic auth username
    #[arg(long, env = "BMC_SHIM_USER", default_value = "")]
    pub user: String,

    /// Basic auth password
    #[arg(long, env = "BMC_SHIM_PASS", default_value = "", hide_env_values = true)]
    pub pass: String,

    /// Redfish system id in single-system mode
    #[arg(long, default_value = "1")]
    pub system_id: String,

    /// Backend kind: noop, command or homeassistant
    #[arg(long, default_value_t = BackendKind::Noop)]
    pub backend: BackendKind,

    /// Shell command for power on (backend=command)
    #[arg(long, default_value = "")]
    pub on_cmd: String,

    /// Shell command for power off (backend=command)
    #[arg(long, default_value = "")]
    pub off_cmd: String,

    /// Home Assistant base URL (backend=homeassistant)
    #[arg(long, env = "BMC_SHIM_HA_URL", default_value = "")]
    pub ha_url: String,

    /// Home Assistant long-lived access token (backend=homeassistant)
    #[arg(long, env = "BMC_SHIM_HA_TOKEN", default_value = "", hide_env_values = true)]
    pub ha_token: String,

    /// Home Assistant switch entity_id (backend=homeassistant)
    #[arg(long, env = "BMC_SHIM_HA_ENTITY", default_value = "")]
    pub ha_entity: String,

    /// Comma-separated id=entity_id pairs for multiple systems (backend=homeassistant)
    #[arg(long, env = "BMC_SHIM_HA_SYSTEMS", default_value = "")]
    pub systems: String,

    /// Seconds between the off and on halves of a restart
    #[arg(long, env = "BMC_SHIM_RESTART_DELAY_SECS", default_value_t = 2)]
    pub restart_delay_secs: u64,
}

impl ServeArgs {
    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.user, &self.pass)
    }

    /// Build the registry for the selected backend
    pub fn build_registry(&self) -> Result<SystemRegistry> {
        let mut registry = SystemRegistry::new();

        match self.backend {
            BackendKind::Noop => {
                registry.insert(&self.system_id, Arc::new(NoopBackend::new()))?;
            }
            BackendKind::Command => {
                let backend = CommandBackend::new(CommandConfig::new(&self.on_cmd, &self.off_cmd))
                    .context("backend init")?;
                registry.insert(&self.system_id, Arc::new(backend))?;
            }
            BackendKind::HomeAssistant => {
                let base = HomeAssistantConfig::new(&self.ha_url, &self.ha_token, &self.ha_entity);

                if self.systems.trim().is_empty() {
                    let backend = HomeAssistantBackend::new(base).context("backend init")?;
                    registry.insert(&self.system_id, Arc::new(backend))?;
                } else {
                    for (id, entity) in parse_systems(&self.systems)? {
                        let backend = HomeAssistantBackend::new(base.for_entity(&entity))
                            .with_context(|| format!("backend init ({id})"))?;
                        let backend: Arc<dyn PowerBackend> = Arc::new(backend);
                        registry.insert(id, backend)?;
                    }
                }
            }
        }

        Ok(registry)
    }

    pub fn into_config(self) -> Result<ServerConfig> {
        let systems = self.build_registry()?;
        Ok(ServerConfig::new(&self.listen, systems)
            .with_credentials(self.credentials())
            .with_restart_delay(Duration::from_secs(self.restart_delay_secs)))
    }
}

/// Parse `id=entity,id=entity`; blank entries are skipped, both sides trimmed
pub fn parse_systems(raw: &str) -> Result<Vec<(String, String)>> {
    let mut systems = Vec::new();

    for entry in raw.split(',').map(str::trim) {
        if entry.is_empty() {
            continue;
        }
        let Some((id, entity)) = entry.split_once('=') else {
            bail!("invalid systems entry: {entry:?} (expected id=entity)");
        };
        systems.push((id.trim().to_string(), entity.trim().to_string()));
    }

    if systems.is_empty() {
        bail!("no valid systems parsed from --systems");
    }
    Ok(systems)
}

pub async fn run_serve(args: ServeArgs) -> Result<()> {
    if args.user.is_empty() || args.pass.is_empty() {
        warn!("no basic auth configured; use --user/--pass or BMC_SHIM_USER/BMC_SHIM_PASS");
    }

    let backend = args.backend;
    let config = args.into_config()?;
    info!(
        backend = %backend,
        systems = config.systems.len(),
        restart_delay = ?config.restart_delay,
        "configuration loaded"
    );

    bmc_shim_server::run(config, shutdown_signal()).await
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
                info!("Received SIGTERM");
            }
            Err(e) => {
                warn!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutting down");
}
