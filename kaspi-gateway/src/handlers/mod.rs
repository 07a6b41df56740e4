//! HTTP handlers.
//!
//! Each handler decodes its input, calls [`PaymentGateway`](crate::services::PaymentGateway)
//! and wraps the result in the `{"success": true, "data": ...}` envelope.
//! Errors render through [`GatewayError`](kaspi_core::GatewayError).

pub mod devices;
pub mod enhanced;
pub mod payments;
pub mod refunds;
pub mod utility;

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::services::get_metrics;

pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "kaspi-gateway",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

pub async fn readiness_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ready" })))
}

pub async fn metrics_endpoint() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        get_metrics(),
    )
}
