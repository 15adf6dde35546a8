//! Liveness and readiness probes

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use tracing::{debug, warn};

use crate::registry::SystemRegistry;
use crate::AppState;

/// Readiness policy for backends that have no health check.
///
/// They count as healthy, so a single such backend makes the service ready
/// no matter how the others are doing.
pub const MISSING_HEALTH_CHECK_IS_HEALTHY: bool = true;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    NotReady,
}

/// Ready if any backend is usable; an empty registry is ready
pub async fn check_readiness(registry: &SystemRegistry) -> Readiness {
    if registry.is_empty() {
        return Readiness::Ready;
    }

    for (id, backend) in registry.iter() {
        match backend.as_health_check() {
            None => {
                if MISSING_HEALTH_CHECK_IS_HEALTHY {
                    debug!(system = id, "backend has no health check, assuming healthy");
                    return Readiness::Ready;
                }
            }
            Some(check) => match check.ping().await {
                Ok(()) => return Readiness::Ready,
                Err(e) => warn!(system = id, error = %e, "backend health check failed"),
            },
        }
    }

    Readiness::NotReady
}

pub async fn livez() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    match check_readiness(&state.registry).await {
        Readiness::Ready => (StatusCode::OK, "ok"),
        Readiness::NotReady => (StatusCode::SERVICE_UNAVAILABLE, "all backends failed"),
    }
}
