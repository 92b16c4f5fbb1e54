//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers return `Result<T, AppError>`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::address::AddressResolutionError;
use crate::carrier::CarrierError;
use crate::payload::PayloadBuildError;
use crate::rates::ShippingError;

/// Application-level error type for the checkout service.
#[derive(Debug, Error)]
pub enum AppError {
    /// The destination or shop address could not be resolved.
    #[error("Address error: {0}")]
    Address(#[from] AddressResolutionError),

    /// The cart could not be turned into parcels.
    #[error("Payload error: {0}")]
    Payload(#[from] PayloadBuildError),

    /// Carrier API operation failed.
    #[error("Carrier error: {0}")]
    Carrier(#[from] CarrierError),

    /// Session store read or write failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ShippingError> for AppError {
    fn from(err: ShippingError) -> Self {
        match err {
            ShippingError::Address(e) => Self::Address(e),
            ShippingError::Payload(e) => Self::Payload(e),
            ShippingError::Encode(e) => Self::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(
            self,
            Self::Session(_) | Self::Internal(_) | Self::Carrier(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Carrier(CarrierError::InvalidRequest { .. }) => StatusCode::BAD_REQUEST,
            Self::Carrier(_) => StatusCode::BAD_GATEWAY,
            Self::Address(_) | Self::Payload(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Session(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Carrier(_) => "Carrier service error".to_string(),
            Self::Address(e) => e.to_string(),
            Self::Payload(e) => e.to_string(),
            _ => self.to_string(),
        };

        (status, Json(json!({ "success": false, "message": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("label".to_string());
        assert_eq!(err.to_string(), "Not found: label");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status(AppError::Payload(PayloadBuildError::EmptyPackage)),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status(AppError::Carrier(CarrierError::Signing("x".to_string()))),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_address_errors_surface_to_the_client() {
        let err: AppError = ShippingError::Address(AddressResolutionError::UnknownRegion {
            country: "ZA".to_string(),
            region: "XX".to_string(),
        })
        .into();
        assert!(matches!(err, AppError::Address(_)));
    }
}
