//! Backend that only logs

use async_trait::async_trait;
use tracing::info;

use crate::backend::PowerBackend;
use crate::error::Result;
use crate::types::BackendKind;

/// Logs every request and always succeeds
///
/// Has no state query, so the server reports whatever it last set.
#[derive(Debug, Default)]
pub struct NoopBackend;

impl NoopBackend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PowerBackend for NoopBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Noop
    }

    async fn power_on(&self) -> Result<()> {
        info!(backend = "noop", "PowerOn");
        Ok(())
    }

    async fn power_off(&self) -> Result<()> {
        info!(backend = "noop", "PowerOff");
        Ok(())
    }
}
