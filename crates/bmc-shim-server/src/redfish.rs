//! Redfish resource handlers
//!
//! Service root, the Systems collection, a single ComputerSystem and its
//! `ComputerSystem.Reset` action.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::boot::{BootPatch, BootTarget};
use crate::error::ApiError;
use crate::power::{display_name, observed_power_state};
use crate::reset::{ResetType, ADVERTISED_RESET_TYPES};
use crate::AppState;

pub const SERVICE_ROOT_PATH: &str = "/redfish/v1/";
pub const SYSTEMS_PATH: &str = "/redfish/v1/Systems";
pub const RESET_ACTION_SUFFIX: &str = "/Actions/ComputerSystem.Reset";
const MANAGER_PATH: &str = "/redfish/v1/Managers/1";

pub fn system_path(id: &str) -> String {
    format!("{SYSTEMS_PATH}/{id}")
}

pub fn reset_action_path(id: &str) -> String {
    format!("{}{RESET_ACTION_SUFFIX}", system_path(id))
}

#[derive(Debug, Deserialize)]
struct ResetRequest {
    #[serde(rename = "ResetType", alias = "resetType", default)]
    reset_type: String,
}

#[derive(Debug, Deserialize)]
struct SystemPatch {
    #[serde(rename = "Boot", default)]
    boot: Option<BootPatch>,
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

pub async fn service_root() -> Json<Value> {
    Json(json!({
        "@odata.type": "#ServiceRoot.v1_0_0.ServiceRoot",
        "@odata.id": SERVICE_ROOT_PATH,
        "Id": "RootService",
        "Name": "BMC Shim ServiceRoot",
        "Systems": { "@odata.id": SYSTEMS_PATH },
    }))
}

pub async fn systems_collection(State(state): State<AppState>) -> Json<Value> {
    let members: Vec<Value> = state
        .registry
        .ids()
        .map(|id| json!({ "@odata.id": system_path(id) }))
        .collect();
    let count = members.len();

    Json(json!({
        "@odata.id": SYSTEMS_PATH,
        "Members": members,
        "Members@odata.count": count,
        "Name": "Systems Collection",
    }))
}

pub async fn get_system(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let backend = state.registry.get(&id).ok_or(ApiError::NotFound)?;

    let power = observed_power_state(&id, backend.as_ref(), &state.cache).await;
    let name = display_name(&id, backend.as_ref()).await;
    // Defaults are rendered, not stored
    let boot = state.cache.boot_override(&id).await.unwrap_or_default();

    Ok(Json(json!({
        "@odata.id": system_path(&id),
        "Id": &id,
        "Name": name,
        "PowerState": power.as_redfish(),
        "Boot": {
            "BootSourceOverrideTarget": boot.target,
            "BootSourceOverrideEnabled": boot.enabled,
            "BootSourceOverrideTarget@Redfish.AllowableValues": BootTarget::ALLOWABLE,
        },
        "Links": {
            "ManagedBy": [{ "@odata.id": MANAGER_PATH }],
        },
        "Actions": {
            "#ComputerSystem.Reset": {
                "target": reset_action_path(&id),
                "ResetType@Redfish.AllowableValues": ADVERTISED_RESET_TYPES,
            },
        },
    })))
}

pub async fn patch_system(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    if !state.registry.contains(&id) {
        return Err(ApiError::NotFound);
    }
    let patch: SystemPatch = serde_json::from_slice(&body).map_err(ApiError::MalformedBody)?;

    if let Some(boot) = patch.boot {
        let stored = state.cache.update_boot_override(&id, &boot).await;
        info!(
            system = %id,
            target = ?stored.target,
            enabled = ?stored.enabled,
            "boot override updated"
        );
    }

    Ok(StatusCode::NO_CONTENT)
}

pub async fn reset_system(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let backend = state.registry.get(&id).ok_or(ApiError::NotFound)?;
    let request: ResetRequest =
        serde_json::from_slice(&body).map_err(ApiError::MalformedBody)?;
    let reset: ResetType = request.reset_type.parse()?;

    if let Err(e) = state.reset.apply(&id, backend, reset).await {
        warn!(system = %id, reset_type = reset.as_str(), error = %e, "reset failed");
        return Err(e.into());
    }

    Ok(Json(json!({ "status": "ok" })))
}
