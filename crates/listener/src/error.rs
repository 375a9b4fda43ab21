//! Error types for the webhook receiver.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Reasons a delivery is rejected before it reaches the provisioning handler.
///
/// Failures of the handler itself are not represented here: they are logged
/// and the delivery is acknowledged.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// The X-Hub-Signature-256 header is missing.
    #[error("missing signature header")]
    MissingSignature,

    /// The signature header is not `sha256=<hex>`.
    #[error("invalid signature format: {0}")]
    InvalidSignatureFormat(String),

    /// The HMAC does not match the body.
    #[error("invalid signature")]
    InvalidSignature,

    /// The X-GitHub-Delivery header is missing.
    #[error("missing delivery ID header")]
    MissingDeliveryId,

    /// The X-GitHub-Event header is missing.
    #[error("missing event type header")]
    MissingEventType,

    /// The request payload could not be parsed.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

impl WebhookError {
    /// Returns the HTTP status code for this error.
    ///
    /// - Missing/invalid signature: 401 Unauthorized
    /// - Missing headers or unparseable payload: 400 Bad Request
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingSignature | Self::InvalidSignature | Self::InvalidSignatureFormat(_) => {
                StatusCode::UNAUTHORIZED
            }
            Self::MissingDeliveryId | Self::MissingEventType | Self::InvalidPayload(_) => {
                StatusCode::BAD_REQUEST
            }
        }
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        // Bodies stay generic so nothing about the secret or the parser leaks.
        let status = self.status_code();
        let body = match &self {
            Self::MissingSignature => "Missing signature",
            Self::InvalidSignatureFormat(_) => "Invalid signature format",
            Self::InvalidSignature => "Invalid signature",
            Self::MissingDeliveryId => "Missing delivery ID",
            Self::MissingEventType => "Missing event type",
            Self::InvalidPayload(_) => "Invalid payload",
        };

        (status, body).into_response()
    }
}
