//! HTTP Basic authentication gate
//!
//! Discovery and health endpoints stay open so provisioning tools can find
//! the service and orchestrators can probe it.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::warn;

use crate::error::ApiError;
use crate::AppState;

/// Value of the `WWW-Authenticate` challenge
pub const CHALLENGE: &str = "Basic realm=redfish";

const EXEMPT_PATHS: [&str; 4] = ["/redfish/v1", "/redfish/v1/", "/livez", "/readyz"];

pub fn is_exempt(path: &str) -> bool {
    EXEMPT_PATHS.contains(&path)
}

/// Username and password from an `Authorization: Basic ...` header
pub fn parse_basic_auth(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

pub async fn require_basic_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if is_exempt(request.uri().path()) || state.credentials.is_disabled() {
        return next.run(request).await;
    }

    match parse_basic_auth(request.headers()) {
        Some((username, password)) if state.credentials.matches(&username, &password) => {
            next.run(request).await
        }
        presented => {
            warn!(
                path = %request.uri().path(),
                credentials_present = presented.is_some(),
                "rejected unauthenticated request"
            );
            ApiError::Unauthorized.into_response()
        }
    }
}
