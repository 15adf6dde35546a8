//! bmc-shim power backends
//!
//! This crate provides the pluggable power-control side of bmc-shim: the
//! [`PowerBackend`] trait, its optional capabilities, and three variants.
//!
//! # Variants
//!
//! - **noop**: logs the request and always succeeds
//! - **command**: runs a shell command for power on and another for power off
//! - **homeassistant**: toggles a Home Assistant switch entity, and reports its
//!   live state and friendly name
//!
//! # Example
//!
//! ```
//! use bmc_shim_backend::{Capability, NoopBackend, PowerBackend};
//!
//! # async fn example() -> bmc_shim_backend::Result<()> {
//! let backend = NoopBackend::new();
//!
//! // Optional capabilities are discovered at call time
//! assert!(backend.supports(Capability::PowerOn));
//! assert!(!backend.supports(Capability::CurrentState));
//!
//! backend.power_on().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Command Example
//!
//! ```no_run
//! use bmc_shim_backend::{CommandBackend, CommandConfig, PowerBackend};
//!
//! # async fn example() -> bmc_shim_backend::Result<()> {
//! let backend = CommandBackend::new(CommandConfig::new(
//!     "curl -s http://pdu.local/outlet/3/on",
//!     "curl -s http://pdu.local/outlet/3/off",
//! ))?;
//!
//! backend.power_off().await?;
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod command;
pub mod error;
pub mod homeassistant;
pub mod noop;
pub mod types;

pub use backend::{Capability, HealthCheck, NameProvider, PowerBackend, PowerStateQuery};
pub use command::CommandBackend;
pub use error::{BackendError, Result};
pub use homeassistant::HomeAssistantBackend;
pub use noop::NoopBackend;
pub use types::{BackendKind, CommandConfig, HomeAssistantConfig, PowerState};
