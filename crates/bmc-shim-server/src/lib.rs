//! bmc-shim HTTP server
//!
//! Serves a small subset of the Redfish `ComputerSystem` API and turns reset
//! actions into calls on the backend registered for each system.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    extract::MatchedPath,
    http::{Request, StatusCode},
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{info, Level};

pub mod auth;
pub mod boot;
pub mod cache;
pub mod config;
pub mod error;
pub mod health;
pub mod power;
pub mod redfish;
pub mod registry;
pub mod reset;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use config::{Credentials, ServerConfig};
pub use registry::{RegistryError, SystemRegistry};

use crate::cache::SystemCache;
use crate::reset::ResetExecutor;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SystemRegistry>,
    pub cache: Arc<SystemCache>,
    pub credentials: Arc<Credentials>,
    pub reset: ResetExecutor,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let cache = Arc::new(SystemCache::new());
        let request_timeout = config.effective_request_timeout();
        Self {
            registry: Arc::new(config.systems),
            reset: ResetExecutor::new(Arc::clone(&cache), config.restart_delay),
            cache,
            credentials: Arc::new(config.credentials),
            request_timeout,
        }
    }
}

/// Full application router: Redfish routes, probes, auth, tracing, timeout
pub fn build_router(state: AppState) -> Router {
    let request_timeout = state.request_timeout;

    Router::new()
        .route("/redfish/v1", get(redfish::service_root))
        .route("/redfish/v1/", get(redfish::service_root))
        .route("/redfish/v1/Systems", get(redfish::systems_collection))
        .route(
            "/redfish/v1/Systems/{id}",
            get(redfish::get_system).patch(redfish::patch_system),
        )
        .route(
            "/redfish/v1/Systems/{id}/",
            get(redfish::get_system).patch(redfish::patch_system),
        )
        .route(
            "/redfish/v1/Systems/{id}/Actions/ComputerSystem.Reset",
            post(redfish::reset_system),
        )
        .route("/livez", get(health::livez))
        .route("/readyz", get(health::readyz))
        .fallback(redfish::not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_basic_auth,
        ))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<axum::body::Body>| {
                    let matched_path = request
                        .extensions()
                        .get::<MatchedPath>()
                        .map(MatchedPath::as_str)
                        .unwrap_or(request.uri().path());

                    tracing::info_span!(
                        "http-request",
                        method = %request.method(),
                        uri = %request.uri(),
                        matched_path = matched_path,
                    )
                })
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(tower_http::LatencyUnit::Millis),
                ),
        )
        .with_state(state)
}

/// Bind the configured address and serve until `shutdown` resolves
pub async fn run<F>(config: ServerConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let bind_addr = config.bind_addr();
    let state = AppState::new(config);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    let local_addr = listener.local_addr().context("failed to read local address")?;

    let ids: Vec<String> = state.registry.ids().map(str::to_string).collect();
    info!(listen = %local_addr, systems = ?ids, "bmc-shim listening (HTTP)");

    let app = build_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("server error")?;

    info!("shutdown complete");
    Ok(())
}
