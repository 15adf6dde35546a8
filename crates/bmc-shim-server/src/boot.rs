//! Cosmetic boot override
//!
//! Stored and reported so provisioning tools see the value they set; never
//! passed to a backend.

use serde::{Deserialize, Serialize};

/// `BootSourceOverrideTarget`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BootTarget {
    #[default]
    None,
    Pxe,
    Hdd,
}

impl BootTarget {
    /// Values advertised in `BootSourceOverrideTarget@Redfish.AllowableValues`
    pub const ALLOWABLE: [BootTarget; 3] = [BootTarget::None, BootTarget::Pxe, BootTarget::Hdd];
}

/// `BootSourceOverrideEnabled`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BootEnabled {
    #[default]
    Disabled,
    Once,
    Continuous,
}

/// Per-system boot override
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BootOverride {
    #[serde(rename = "BootSourceOverrideTarget")]
    pub target: BootTarget,
    #[serde(rename = "BootSourceOverrideEnabled")]
    pub enabled: BootEnabled,
}

/// `Boot` block of a PATCH body; omitted fields keep their current value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BootPatch {
    #[serde(rename = "BootSourceOverrideTarget", default)]
    pub target: Option<BootTarget>,
    #[serde(rename = "BootSourceOverrideEnabled", default)]
    pub enabled: Option<BootEnabled>,
}

impl BootOverride {
    pub fn apply(&mut self, patch: &BootPatch) {
        if let Some(target) = patch.target {
            self.target = target;
        }
        if let Some(enabled) = patch.enabled {
            self.enabled = enabled;
        }
    }
}
