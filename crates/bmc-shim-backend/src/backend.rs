//! Backend trait and optional capabilities
//!
//! Every backend can power a system on and off. Live state, a display name
//! and a health check are optional: a backend opts in by returning itself
//! from the matching `as_*` accessor, and callers fall back to their own
//! defaults when the accessor returns `None`.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{BackendKind, PowerState};

/// Trait for power-control backends
#[async_trait]
pub trait PowerBackend: Send + Sync + std::fmt::Debug {
    /// Which variant this is
    fn kind(&self) -> BackendKind;

    /// Power on the system
    async fn power_on(&self) -> Result<()>;

    /// Power off the system
    async fn power_off(&self) -> Result<()>;

    /// Live power state, if the backend can report it
    fn as_state_query(&self) -> Option<&dyn PowerStateQuery> {
        None
    }

    /// Friendly name, if the backend can supply one
    fn as_name_provider(&self) -> Option<&dyn NameProvider> {
        None
    }

    /// Health check, if the backend has one
    fn as_health_check(&self) -> Option<&dyn HealthCheck> {
        None
    }

    /// Check if the backend supports a specific capability
    fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::PowerOn | Capability::PowerOff => true,
            Capability::CurrentState => self.as_state_query().is_some(),
            Capability::DisplayName => self.as_name_provider().is_some(),
            Capability::Ping => self.as_health_check().is_some(),
        }
    }
}

/// Reports the current power state of the system behind a backend
#[async_trait]
pub trait PowerStateQuery: Send + Sync {
    async fn current_state(&self) -> Result<PowerState>;
}

/// Supplies a friendly display name for the system
#[async_trait]
pub trait NameProvider: Send + Sync {
    /// An empty string means "no name"; callers substitute their own.
    async fn display_name(&self) -> Result<String>;
}

/// Reports whether the backend is usable
#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn ping(&self) -> Result<()>;
}

/// Backend capabilities for capability checking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Power on
    PowerOn,
    /// Power off
    PowerOff,
    /// Report live power state
    CurrentState,
    /// Report a display name
    DisplayName,
    /// Health check
    Ping,
}
