//! Last-known power state and boot override per system
//!
//! One lock covers both maps. Critical sections never span a backend call.

use std::collections::HashMap;

use bmc_shim_backend::PowerState;
use tokio::sync::RwLock;

use crate::boot::{BootOverride, BootPatch};

#[derive(Debug, Default)]
struct CacheMaps {
    power: HashMap<String, PowerState>,
    boot: HashMap<String, BootOverride>,
}

/// Runtime-mutable state for the registered systems; nothing is persisted
#[derive(Debug, Default)]
pub struct SystemCache {
    maps: RwLock<CacheMaps>,
}

impl SystemCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last power state set through this service; off until told otherwise
    pub async fn last_known(&self, id: &str) -> PowerState {
        self.maps
            .read()
            .await
            .power
            .get(id)
            .copied()
            .unwrap_or_default()
    }

    pub async fn record_power(&self, id: &str, state: PowerState) {
        self.maps.write().await.power.insert(id.to_string(), state);
    }

    /// Stored boot override, `None` if never set
    pub async fn boot_override(&self, id: &str) -> Option<BootOverride> {
        self.maps.read().await.boot.get(id).copied()
    }

    /// Apply a patch on top of the stored (or default) override
    pub async fn update_boot_override(&self, id: &str, patch: &BootPatch) -> BootOverride {
        let mut maps = self.maps.write().await;
        let boot = maps.boot.entry(id.to_string()).or_default();
        boot.apply(patch);
        *boot
    }
}
