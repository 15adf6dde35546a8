//! `ComputerSystem.Reset` handling
//!
//! Maps a `ResetType` keyword to backend calls. The cached power state is
//! written only after the whole sequence succeeded.
//!
//! | ResetType                             | calls                      | cached |
//! |---------------------------------------|----------------------------|--------|
//! | `On`                                  | power_on                   | On     |
//! | `ForceOff`, `GracefulShutdown`, `Off` | power_off                  | Off    |
//! | `ForceRestart`, `GracefulRestart`     | power_off, delay, power_on | On     |
//!
//! Restarts run on their own task: a client that hangs up mid-restart does
//! not leave the system off halfway through the sequence.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use bmc_shim_backend::{BackendError, PowerBackend, PowerState};
use thiserror::Error;
use tokio::task::JoinError;
use tracing::{debug, info};

use crate::cache::SystemCache;

/// Reset types listed in `ResetType@Redfish.AllowableValues`
pub const ADVERTISED_RESET_TYPES: [&str; 4] = ["On", "ForceOff", "GracefulShutdown", "ForceRestart"];

/// Accepted `ResetType` values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetType {
    On,
    ForceOff,
    GracefulShutdown,
    Off,
    ForceRestart,
    GracefulRestart,
}

impl ResetType {
    pub fn as_str(self) -> &'static str {
        match self {
            ResetType::On => "On",
            ResetType::ForceOff => "ForceOff",
            ResetType::GracefulShutdown => "GracefulShutdown",
            ResetType::Off => "Off",
            ResetType::ForceRestart => "ForceRestart",
            ResetType::GracefulRestart => "GracefulRestart",
        }
    }

    fn transition(self) -> Transition {
        match self {
            ResetType::On => Transition::PowerOn,
            ResetType::ForceOff | ResetType::GracefulShutdown | ResetType::Off => {
                Transition::PowerOff
            }
            ResetType::ForceRestart | ResetType::GracefulRestart => Transition::Restart,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unsupported ResetType")]
pub struct UnsupportedResetType(pub String);

impl FromStr for ResetType {
    type Err = UnsupportedResetType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "On" => Ok(ResetType::On),
            "ForceOff" => Ok(ResetType::ForceOff),
            "GracefulShutdown" => Ok(ResetType::GracefulShutdown),
            "Off" => Ok(ResetType::Off),
            "ForceRestart" => Ok(ResetType::ForceRestart),
            "GracefulRestart" => Ok(ResetType::GracefulRestart),
            other => Err(UnsupportedResetType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Transition {
    PowerOn,
    PowerOff,
    Restart,
}

#[derive(Debug, Error)]
pub enum ResetError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("restart sequence aborted: {0}")]
    Aborted(#[from] JoinError),
}

/// Runs reset sequences against backends and keeps the cache in step
#[derive(Debug, Clone)]
pub struct ResetExecutor {
    cache: Arc<SystemCache>,
    settle_delay: Duration,
}

impl ResetExecutor {
    pub fn new(cache: Arc<SystemCache>, settle_delay: Duration) -> Self {
        Self {
            cache,
            settle_delay,
        }
    }

    /// Apply `reset` to system `id`, returning the state now cached for it
    pub async fn apply(
        &self,
        id: &str,
        backend: Arc<dyn PowerBackend>,
        reset: ResetType,
    ) -> Result<PowerState, ResetError> {
        info!(system = id, reset_type = reset.as_str(), "applying reset");

        match reset.transition() {
            Transition::PowerOn => {
                backend.power_on().await?;
                self.cache.record_power(id, PowerState::On).await;
                Ok(PowerState::On)
            }
            Transition::PowerOff => {
                backend.power_off().await?;
                self.cache.record_power(id, PowerState::Off).await;
                Ok(PowerState::Off)
            }
            Transition::Restart => {
                let cache = Arc::clone(&self.cache);
                let id = id.to_string();
                let delay = self.settle_delay;
                let sequence =
                    tokio::spawn(async move { restart(&id, backend.as_ref(), &cache, delay).await });
                Ok(sequence.await??)
            }
        }
    }
}

async fn restart(
    id: &str,
    backend: &dyn PowerBackend,
    cache: &SystemCache,
    delay: Duration,
) -> Result<PowerState, BackendError> {
    backend.power_off().await?;
    debug!(system = id, ?delay, "powered off, waiting before power on");
    tokio::time::sleep(delay).await;
    backend.power_on().await?;
    cache.record_power(id, PowerState::On).await;
    Ok(PowerState::On)
}
