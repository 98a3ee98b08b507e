use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Request-level error taxonomy. Every variant renders as JSON with a
/// `message` field and a fixed status code.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad input: missing title, missing blog source, disallowed file
    /// extension. No side effects have been performed.
    #[error("{0}")]
    Validation(String),

    /// Missing, malformed, or expired bearer token.
    #[error("{0}")]
    Unauthorized(String),

    /// Unknown content or admin id.
    #[error("{0}")]
    NotFound(String),

    /// Extraction or storage failure; the request is aborted.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(%status, "request failed: {self}");
        } else {
            tracing::debug!(%status, "request rejected: {self}");
        }
        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_taxonomy() {
        assert_eq!(
            ApiError::validation("no title").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::unauthorized("no token").status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::not_found("gone").status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::internal("disk full").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
