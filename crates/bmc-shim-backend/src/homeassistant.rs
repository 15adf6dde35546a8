//! Home Assistant switch backend
//!
//! Drives a `switch.*` entity through the Home Assistant REST API:
//! `POST /api/services/switch/turn_on|turn_off` to change state and
//! `GET /api/states/<entity>` to read it back together with the entity's
//! friendly name.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, info};

use crate::backend::{NameProvider, PowerBackend, PowerStateQuery};
use crate::error::{BackendError, Result};
use crate::types::{BackendKind, HomeAssistantConfig, PowerState};

/// Timeout applied to every Home Assistant request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

const SWITCH_DOMAIN: &str = "switch";

/// Entity state as returned by `/api/states/<entity>`
#[derive(Debug, Deserialize)]
struct EntityState {
    state: String,
    #[serde(default)]
    attributes: HashMap<String, serde_json::Value>,
}

impl EntityState {
    fn friendly_name(&self) -> String {
        self.attributes
            .get("friendly_name")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string()
    }
}

/// Home Assistant REST API backend
#[derive(Debug)]
pub struct HomeAssistantBackend {
    base_url: String,
    token: String,
    entity_id: String,
    client: Client,
}

impl HomeAssistantBackend {
    /// Create a new backend; URL, token and entity are all required
    pub fn new(config: HomeAssistantConfig) -> Result<Self> {
        if config.base_url.is_empty() || config.token.is_empty() || config.entity_id.is_empty() {
            return Err(BackendError::InvalidConfig(
                "homeassistant backend requires baseURL, token, and entityID".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| BackendError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token,
            entity_id: config.entity_id,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn service_url(&self, domain: &str, service: &str) -> String {
        format!("{}/api/services/{}/{}", self.base_url, domain, service)
    }

    fn state_url(&self) -> String {
        format!("{}/api/states/{}", self.base_url, self.entity_id)
    }

    async fn call_service(&self, domain: &str, service: &str) -> Result<()> {
        let response = self
            .client
            .post(self.service_url(domain, service))
            .bearer_auth(&self.token)
            .json(&serde_json::json!({ "entity_id": self.entity_id }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::HttpStatus {
                operation: format!("service {domain}.{service}"),
                status: status.as_u16(),
            });
        }

        debug!(entity = %self.entity_id, domain, service, "service call accepted");
        Ok(())
    }

    async fn fetch_state(&self) -> Result<EntityState> {
        let response = self
            .client
            .get(self.state_url())
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(BackendError::HttpStatus {
                operation: "state".to_string(),
                status: response.status().as_u16(),
            });
        }

        Ok(response.json::<EntityState>().await?)
    }
}

#[async_trait]
impl PowerBackend for HomeAssistantBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::HomeAssistant
    }

    async fn power_on(&self) -> Result<()> {
        info!(backend = "homeassistant", entity = %self.entity_id, "PowerOn");
        self.call_service(SWITCH_DOMAIN, "turn_on").await
    }

    async fn power_off(&self) -> Result<()> {
        info!(backend = "homeassistant", entity = %self.entity_id, "PowerOff");
        self.call_service(SWITCH_DOMAIN, "turn_off").await
    }

    fn as_state_query(&self) -> Option<&dyn PowerStateQuery> {
        Some(self)
    }

    fn as_name_provider(&self) -> Option<&dyn NameProvider> {
        Some(self)
    }
}

#[async_trait]
impl PowerStateQuery for HomeAssistantBackend {
    async fn current_state(&self) -> Result<PowerState> {
        let entity = self.fetch_state().await?;
        Ok(entity.state.eq_ignore_ascii_case("on").into())
    }
}

#[async_trait]
impl NameProvider for HomeAssistantBackend {
    async fn display_name(&self) -> Result<String> {
        Ok(self.fetch_state().await?.friendly_name())
    }
}
