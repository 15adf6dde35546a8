//! Request-level errors and their HTTP rendering

use axum::{
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{debug, error};

use crate::auth::CHALLENGE;
use crate::reset::{ResetError, UnsupportedResetType};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("404 page not found")]
    NotFound,

    #[error("bad request")]
    MalformedBody(#[source] serde_json::Error),

    #[error(transparent)]
    UnsupportedResetType(#[from] UnsupportedResetType),

    #[error(transparent)]
    Reset(#[from] ResetError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::MalformedBody(_) | ApiError::UnsupportedResetType(_) => {
                StatusCode::BAD_REQUEST
            }
            // Backend failures are the caller's to retry, not ours
            ApiError::Reset(ResetError::Backend(_)) => StatusCode::BAD_REQUEST,
            ApiError::Reset(ResetError::Aborted(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        } else {
            debug!(status = %status, error = ?self, "request rejected");
        }

        let mut response = (status, self.to_string()).into_response();
        if matches!(self, ApiError::Unauthorized) {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static(CHALLENGE));
        }
        response
    }
}
