use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Failures talking to the upstream custody source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("upstream request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("upstream timed out after {0}s")]
    Timeout(u64),

    #[error("upstream returned HTTP {status}")]
    Status { status: u16, url: String },

    #[error("upstream declared JSON but the body did not parse: {0}")]
    MalformedJson(#[source] serde_json::Error),
}

/// Everything a request can fail with. An extraction miss is not here.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid id {0:?}: expected a 36-character hexadecimal identifier")]
    InvalidId(String),

    #[error(transparent)]
    Source(#[from] SourceError),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidId(_) => StatusCode::BAD_REQUEST,
            AppError::Source(SourceError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Source(SourceError::Client(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Source(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidId(_) => "invalid_id",
            AppError::Source(SourceError::Client(_)) => "client_setup",
            AppError::Source(SourceError::Request(_)) => "upstream_unavailable",
            AppError::Source(SourceError::Timeout(_)) => "upstream_timeout",
            AppError::Source(SourceError::Status { .. }) => "upstream_status",
            AppError::Source(SourceError::MalformedJson(_)) => "malformed_payload",
        }
    }

    fn body(&self) -> ErrorBody {
        let (message, detail) = match self {
            AppError::InvalidId(_) => (self.to_string(), None),
            AppError::Source(SourceError::Status { status, url }) => (
                "Failed to retrieve custody history from the upstream source".to_string(),
                Some(format!("HTTP {} from {}", status, url)),
            ),
            AppError::Source(e) => (
                "Failed to retrieve custody history from the upstream source".to_string(),
                Some(e.to_string()),
            ),
        };
        ErrorBody {
            error: self.code(),
            message,
            detail,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(code = self.code(), error = %self, "request failed");
        } else {
            warn!(code = self.code(), error = %self, "request rejected");
        }
        (status, Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_status_codes() {
        assert_eq!(AppError::InvalidId("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::from(SourceError::Timeout(20)).status(),
            StatusCode::GATEWAY_TIMEOUT
        );
        let upstream = AppError::from(SourceError::Status {
            status: 503,
            url: "http://upstream/x".into(),
        });
        assert_eq!(upstream.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(upstream.body().detail.as_deref(), Some("HTTP 503 from http://upstream/x"));
    }

    #[test]
    fn malformed_payload_is_bad_gateway() {
        let parse_err = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
        let err = AppError::from(SourceError::MalformedJson(parse_err));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.code(), "malformed_payload");
    }
}
