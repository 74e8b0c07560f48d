//! API error handling
//!
//! The one place where library errors become status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use processor::DispatchError;
use stripe::{ClientError, VerificationError};
use tracing::{error, warn};

/// API error type that converts to HTTP responses
#[derive(Debug)]
pub enum ApiError {
    /// Stripe refused or failed to create a checkout session
    Checkout(ClientError),
    /// Webhook delivery did not authenticate
    Verification(VerificationError),
    /// Verified event could not be fulfilled
    Dispatch(DispatchError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Checkout(e) => {
                error!("Checkout session creation failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.message()).into_response()
            }
            ApiError::Verification(e) => {
                warn!("Rejected webhook: {}", e);
                StatusCode::BAD_REQUEST.into_response()
            }
            ApiError::Dispatch(e) => {
                error!("Failed to handle webhook: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
