//! Common types for backend operations

use std::str::FromStr;

use crate::error::BackendError;

/// Power state of a system
///
/// Only two states are modelled; a backend that cannot tell is expected to
/// return an error and let the caller fall back to its own bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PowerState {
    /// System is powered on
    On,
    /// System is powered off
    #[default]
    Off,
}

impl PowerState {
    pub fn is_on(self) -> bool {
        self == PowerState::On
    }

    /// Value used for the Redfish `PowerState` property
    pub fn as_redfish(self) -> &'static str {
        match self {
            PowerState::On => "On",
            PowerState::Off => "Off",
        }
    }
}

impl From<bool> for PowerState {
    fn from(on: bool) -> Self {
        if on { PowerState::On } else { PowerState::Off }
    }
}

impl std::fmt::Display for PowerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PowerState::On => write!(f, "on"),
            PowerState::Off => write!(f, "off"),
        }
    }
}

/// Backend variant selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Logs the request and always succeeds
    Noop,
    /// Runs a shell command per power action
    Command,
    /// Drives a Home Assistant switch entity
    HomeAssistant,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Noop => write!(f, "noop"),
            BackendKind::Command => write!(f, "command"),
            BackendKind::HomeAssistant => write!(f, "homeassistant"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = BackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "noop" => Ok(BackendKind::Noop),
            "command" => Ok(BackendKind::Command),
            "homeassistant" => Ok(BackendKind::HomeAssistant),
            other => Err(BackendError::InvalidConfig(format!(
                "unknown backend: {other}"
            ))),
        }
    }
}

/// Shell command backend configuration
#[derive(Debug, Clone)]
pub struct CommandConfig {
    /// Command executed for power on
    pub on_cmd: String,
    /// Command executed for power off
    pub off_cmd: String,
}

impl CommandConfig {
    pub fn new(on_cmd: impl Into<String>, off_cmd: impl Into<String>) -> Self {
        Self {
            on_cmd: on_cmd.into(),
            off_cmd: off_cmd.into(),
        }
    }
}

/// Home Assistant backend configuration
#[derive(Debug, Clone)]
pub struct HomeAssistantConfig {
    /// Base URL (e.g., http://homeassistant.local:8123)
    pub base_url: String,
    /// Long-lived access token
    pub token: String,
    /// Switch entity, e.g. `switch.rack_node_1`
    pub entity_id: String,
}

impl HomeAssistantConfig {
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        entity_id: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            entity_id: entity_id.into(),
        }
    }

    /// Same service and token, different entity
    pub fn for_entity(&self, entity_id: impl Into<String>) -> Self {
        Self {
            base_url: self.base_url.clone(),
            token: self.token.clone(),
            entity_id: entity_id.into(),
        }
    }
}
