//! Error taxonomy and translation.
//!
//! Every failure inside the gateway is a [`GatewayError`]. Translation to the
//! transport-neutral [`ErrorOutcome`] happens in exactly one place,
//! [`GatewayError::outcome`]. The HTTP rendering lives here and the gRPC
//! rendering lives in [`crate::grpc::error`]. Both only map an
//! [`ErrorKind`] onto their own status space.

use crate::capability::TierDenial;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Message used for every provider outage, whether reported by the provider
/// (`-999`) or observed locally as a timeout or connection failure.
pub const UNAVAILABLE_MESSAGE: &str = "Kaspi Pay service is temporarily unavailable";

const INTERNAL_MESSAGE: &str = "Internal server error";

/// Business error reported by the provider through a non-zero envelope status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("upstream error {code}: {message}")]
pub struct UpstreamError {
    pub code: i64,
    pub message: String,
}

impl UpstreamError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Failure talking to the provider that is not a business outcome.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {path} timed out")]
    Timeout {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {path} failed")]
    Network {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("could not decode response from {path} (HTTP {status})")]
    Decode {
        path: String,
        status: u16,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Feature unavailable: {0}")]
    FeatureUnavailable(TierDenial),

    #[error("Capability denied: {0}")]
    CapabilityDenied(TierDenial),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Transport-neutral error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    InvalidInput,
    PreconditionFailed,
    PermissionDenied,
    Unauthenticated,
    Unavailable,
    Internal,
    Unknown,
}

/// Result of translating an error, before rendering for a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorOutcome {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorOutcome {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Known provider codes with their category and client-facing message.
///
/// The provider's own wording is never shown for these codes.
pub const UPSTREAM_CODES: &[(i64, ErrorKind, &str)] = &[
    (-1501, ErrorKind::NotFound, "Device not found"),
    (-1502, ErrorKind::PreconditionFailed, "Device is not active"),
    (
        -1503,
        ErrorKind::Conflict,
        "Device is already registered to another trade point",
    ),
    (-1601, ErrorKind::NotFound, "Purchase not found"),
    (
        -14000002,
        ErrorKind::PreconditionFailed,
        "No active trade points are available",
    ),
    (-99000001, ErrorKind::NotFound, "Purchase not found"),
    (-99000002, ErrorKind::NotFound, "Trade point not found"),
    (-99000003, ErrorKind::PermissionDenied, "Trade point is disabled"),
    (
        -99000005,
        ErrorKind::InvalidInput,
        "Refund amount exceeds the purchase amount",
    ),
    (-99000006, ErrorKind::Internal, "Refund could not be processed"),
    (
        -99000011,
        ErrorKind::PreconditionFailed,
        "Purchase cannot be refunded in its current state",
    ),
    (
        -99000020,
        ErrorKind::PreconditionFailed,
        "Partial refund is not available for this purchase",
    ),
    (
        990000018,
        ErrorKind::PreconditionFailed,
        "Insufficient funds to perform the refund",
    ),
    (
        990000026,
        ErrorKind::PreconditionFailed,
        "Operation is not available for this trade point",
    ),
    (990000028, ErrorKind::InvalidInput, "Invalid request parameters"),
    (
        990000033,
        ErrorKind::PreconditionFailed,
        "Refund period for this purchase has expired",
    ),
    (-999, ErrorKind::Unavailable, UNAVAILABLE_MESSAGE),
    (
        -10000,
        ErrorKind::Unauthenticated,
        "Client certificate is missing or invalid",
    ),
];

/// Translate a provider error. Unknown codes keep the raw provider message.
pub fn translate_upstream(err: &UpstreamError) -> ErrorOutcome {
    match UPSTREAM_CODES.iter().find(|(code, _, _)| *code == err.code) {
        Some((_, kind, message)) => ErrorOutcome::new(*kind, *message),
        None => ErrorOutcome::new(
            ErrorKind::Unknown,
            format!("Unexpected error from payment system: {}", err.message),
        ),
    }
}

impl GatewayError {
    /// Translate into the transport-neutral outcome.
    pub fn outcome(&self) -> ErrorOutcome {
        match self {
            GatewayError::Upstream(err) => translate_upstream(err),
            GatewayError::Transport(TransportError::Timeout { .. })
            | GatewayError::Transport(TransportError::Network { .. }) => {
                ErrorOutcome::new(ErrorKind::Unavailable, UNAVAILABLE_MESSAGE)
            }
            GatewayError::Transport(TransportError::Decode { .. }) => {
                ErrorOutcome::new(ErrorKind::Internal, INTERNAL_MESSAGE)
            }
            GatewayError::Validation(errors) => ErrorOutcome::new(
                ErrorKind::InvalidInput,
                format!("Invalid request: {}", describe_validation(errors)),
            ),
            GatewayError::InvalidInput(message) => {
                ErrorOutcome::new(ErrorKind::InvalidInput, message.clone())
            }
            GatewayError::FeatureUnavailable(denial) | GatewayError::CapabilityDenied(denial) => {
                ErrorOutcome::new(ErrorKind::PermissionDenied, denial.to_string())
            }
            GatewayError::Conflict(message) => {
                ErrorOutcome::new(ErrorKind::Conflict, message.clone())
            }
            GatewayError::Internal(_) => ErrorOutcome::new(ErrorKind::Internal, INTERNAL_MESSAGE),
        }
    }

    /// Log internal detail that never reaches clients.
    pub(crate) fn log_hidden_detail(&self) {
        match self {
            GatewayError::Internal(err) => tracing::error!(error = ?err, "Internal error"),
            GatewayError::Transport(err) => {
                tracing::error!(error = ?err, "Upstream transport failure")
            }
            _ => {}
        }
    }
}

/// `field: reason` pairs sorted by field name.
fn describe_validation(errors: &validator::ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter()
                .map(|e| {
                    let reason = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string());
                    format!("{}: {}", field, reason)
                })
                .collect::<Vec<_>>()
        })
        .collect();
    parts.sort();
    parts.join("; ")
}

impl ErrorKind {
    pub fn http_status(&self) -> StatusCode {
        match self {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::PreconditionFailed => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::PermissionDenied => StatusCode::FORBIDDEN,
            ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::Internal | ErrorKind::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Body of every successful HTTP response.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

/// Body of every failed HTTP response.
#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub success: bool,
    pub error: String,
}

impl IntoResponse for ErrorOutcome {
    fn into_response(self) -> Response {
        (
            self.kind.http_status(),
            Json(ApiErrorBody {
                success: false,
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        self.log_hidden_detail();
        self.outcome().into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::CapabilityTier;
    use http_body_util::BodyExt;

    #[test]
    fn every_table_code_translates_to_its_kind() {
        let expected = [
            (-1501, ErrorKind::NotFound),
            (-1502, ErrorKind::PreconditionFailed),
            (-1503, ErrorKind::Conflict),
            (-1601, ErrorKind::NotFound),
            (-14000002, ErrorKind::PreconditionFailed),
            (-99000001, ErrorKind::NotFound),
            (-99000002, ErrorKind::NotFound),
            (-99000003, ErrorKind::PermissionDenied),
            (-99000005, ErrorKind::InvalidInput),
            (-99000006, ErrorKind::Internal),
            (-99000011, ErrorKind::PreconditionFailed),
            (-99000020, ErrorKind::PreconditionFailed),
            (990000018, ErrorKind::PreconditionFailed),
            (990000026, ErrorKind::PreconditionFailed),
            (990000028, ErrorKind::InvalidInput),
            (990000033, ErrorKind::PreconditionFailed),
            (-999, ErrorKind::Unavailable),
            (-10000, ErrorKind::Unauthenticated),
        ];

        assert_eq!(expected.len(), UPSTREAM_CODES.len());
        for (code, kind) in expected {
            let outcome = translate_upstream(&UpstreamError::new(code, "anything"));
            assert_eq!(outcome.kind, kind, "code {code}");
            assert!(!outcome.message.contains("anything"), "code {code} leaked raw message");
        }
    }

    #[test]
    fn known_code_uses_curated_message() {
        let outcome = translate_upstream(&UpstreamError::new(-1501, "Device with ID 42 missing"));
        assert_eq!(outcome, ErrorOutcome::new(ErrorKind::NotFound, "Device not found"));

        let outcome = translate_upstream(&UpstreamError::new(-999, "down"));
        assert_eq!(
            outcome,
            ErrorOutcome::new(
                ErrorKind::Unavailable,
                "Kaspi Pay service is temporarily unavailable"
            )
        );
    }

    #[test]
    fn unknown_code_keeps_upstream_message() {
        let outcome = translate_upstream(&UpstreamError::new(-31337, "mystery"));
        assert_eq!(outcome.kind, ErrorKind::Unknown);
        assert_eq!(outcome.message, "Unexpected error from payment system: mystery");
    }

    #[test]
    fn positive_codes_outside_table_are_unknown() {
        let outcome = translate_upstream(&UpstreamError::new(42, "odd"));
        assert_eq!(outcome.kind, ErrorKind::Unknown);
    }

    #[test]
    fn denials_are_permission_denied() {
        let denial = TierDenial {
            operation: "op".to_string(),
            required: Some(CapabilityTier::Enhanced),
            configured: CapabilityTier::Basic,
        };
        assert_eq!(
            GatewayError::FeatureUnavailable(denial.clone()).outcome().kind,
            ErrorKind::PermissionDenied
        );
        assert_eq!(
            GatewayError::CapabilityDenied(denial).outcome().kind,
            ErrorKind::PermissionDenied
        );
    }

    #[test]
    fn internal_detail_is_hidden() {
        let outcome = GatewayError::Internal(anyhow::anyhow!("mongo exploded")).outcome();
        assert_eq!(outcome, ErrorOutcome::new(ErrorKind::Internal, "Internal server error"));
    }

    #[test]
    fn kinds_map_to_http_status() {
        assert_eq!(ErrorKind::NotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorKind::Conflict.http_status(), StatusCode::CONFLICT);
        assert_eq!(ErrorKind::InvalidInput.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorKind::PreconditionFailed.http_status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(ErrorKind::PermissionDenied.http_status(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorKind::Unauthenticated.http_status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ErrorKind::Unavailable.http_status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ErrorKind::Unknown.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn http_rendering_uses_failure_envelope() {
        let response = GatewayError::Upstream(UpstreamError::new(-1501, "Device not found"))
            .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "success": false, "error": "Device not found" })
        );
    }
}
