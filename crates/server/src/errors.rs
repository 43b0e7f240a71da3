use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use models::ModelError;
use service::auth::AuthError;
use service::backend::StoreError;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::{debug, error};

/// Error response rendered as `{"error": <title>, "message": <detail>}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub message: String,
}

impl JsonApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let title = self.status.canonical_reason().unwrap_or("Error");
        if self.status.is_server_error() {
            error!(status = self.status.as_u16(), message = %self.message, "request failed");
        } else {
            debug!(status = self.status.as_u16(), message = %self.message, "request rejected");
        }
        let body = serde_json::json!({ "error": title, "message": self.message });
        (self.status, Json(body)).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        let status = match &e {
            ServiceError::Validation(_) | ServiceError::Model(ModelError::Validation(_)) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Model(ModelError::Decode(_)) => StatusCode::BAD_GATEWAY,
            ServiceError::Store(StoreError::Transport(_) | StoreError::Status { .. } | StoreError::Decode(_)) => {
                StatusCode::BAD_GATEWAY
            }
            ServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = match e {
            ServiceError::Validation(m) | ServiceError::NotFound(m) => m,
            ServiceError::Model(ModelError::Validation(m)) => m,
            other => other.to_string(),
        };
        Self::new(status, message)
    }
}

impl From<AuthError> for JsonApiError {
    fn from(e: AuthError) -> Self {
        let status = match &e {
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AuthError::Provider(_) => StatusCode::BAD_GATEWAY,
            AuthError::HashError(_) | AuthError::TokenError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = match e {
            AuthError::Validation(m) | AuthError::Unauthorized(m) => m,
            other => other.to_string(),
        };
        Self::new(status, message)
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("runtime check failed: {0}")]
    Runtime(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_service_errors_to_statuses() {
        let cases = [
            (ServiceError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (ServiceError::Model(ModelError::Validation("title is required".into())), StatusCode::BAD_REQUEST),
            (ServiceError::not_found("service abc"), StatusCode::NOT_FOUND),
            (ServiceError::Store(StoreError::Transport("refused".into())), StatusCode::BAD_GATEWAY),
            (ServiceError::Store(StoreError::Io("disk full".into())), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(JsonApiError::from(err).status, status);
        }
    }

    #[test]
    fn unauthorized_keeps_provider_message() {
        let e = JsonApiError::from(AuthError::Unauthorized("Invalid login credentials".into()));
        assert_eq!(e.status, StatusCode::UNAUTHORIZED);
        assert_eq!(e.message, "Invalid login credentials");
    }
}
