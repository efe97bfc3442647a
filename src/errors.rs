//! Domain error taxonomy shared by services and HTTP handlers.
//!
//! Three caller-facing categories plus the auth pair:
//!
//! - `NotFound`: a referenced entity id does not exist
//! - `InvalidArgument`: a caller-supplied value violates a precondition
//! - `InvalidState`: the operation is well-formed but would violate a
//!   domain invariant (negative resulting stock, receiving an unlinked
//!   grocery line)
//!
//! None of these are retried internally; they are caller or data errors.
//! Persistence failures propagate as `Database` and surface as a generic
//! internal error.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KitchenError {
    /// Referenced entity does not exist
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// Caller-supplied value violates a precondition
    #[error("{0}")]
    InvalidArgument(String),

    /// Operation would violate a domain invariant
    #[error("{0}")]
    InvalidState(String),

    /// Missing or invalid credentials
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but not allowed
    #[error("{0}")]
    Forbidden(String),

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Unexpected internal failure
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type KitchenResult<T> = Result<T, KitchenError>;

impl KitchenError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        KitchenError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        KitchenError::InvalidArgument(message.into())
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        KitchenError::InvalidState(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        KitchenError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        KitchenError::Forbidden(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        KitchenError::Internal(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, KitchenError::NotFound { .. })
    }

    /// Check if this is a client error (400-series)
    pub fn is_client_error(&self) -> bool {
        !matches!(self, KitchenError::Database(_) | KitchenError::Internal(_))
    }

    /// Stable error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            KitchenError::NotFound { .. } => "NOT_FOUND",
            KitchenError::InvalidArgument(_) => "INVALID_ARGUMENT",
            KitchenError::InvalidState(_) => "INVALID_STATE",
            KitchenError::Unauthorized(_) => "UNAUTHORIZED",
            KitchenError::Forbidden(_) => "FORBIDDEN",
            KitchenError::Database(_) => "DATABASE_ERROR",
            KitchenError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            KitchenError::NotFound { .. } => StatusCode::NOT_FOUND,
            KitchenError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            KitchenError::InvalidState(_) => StatusCode::CONFLICT,
            KitchenError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            KitchenError::Forbidden(_) => StatusCode::FORBIDDEN,
            KitchenError::Database(_) | KitchenError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for KitchenError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internal failures are logged with detail but surfaced generically.
        let message = match &self {
            KitchenError::Database(_) | KitchenError::Internal(_) => {
                tracing::error!("{}", self);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": message,
            "code": self.error_code(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = KitchenError::not_found("Recipe", 42);
        assert_eq!(err.to_string(), "Recipe 42 not found");
        assert!(err.is_not_found());
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_invalid_state_maps_to_conflict() {
        let err = KitchenError::invalid_state("Resulting quantity cannot be negative");
        assert!(err.is_client_error());
        assert_eq!(err.error_code(), "INVALID_STATE");
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_invalid_argument_is_client_error() {
        let err = KitchenError::invalid_argument("Yield amount must be greater than 0");
        assert!(err.is_client_error());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_database_error_is_internal() {
        let err = KitchenError::Database(sea_orm::DbErr::Custom("boom".to_string()));
        assert!(!err.is_client_error());
        assert_eq!(err.error_code(), "DATABASE_ERROR");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
