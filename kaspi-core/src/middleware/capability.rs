//! Capability gate for HTTP routes.
//!
//! Each gated route carries the operation identifier it serves:
//!
//! ```ignore
//! .route(
//!     "/devices/register",
//!     post(register_device).route_layer(from_fn_with_state(
//!         gate.guard(operations::REGISTER_DEVICE),
//!         capability_middleware,
//!     )),
//! )
//! ```

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::capability::CapabilityGate;
use crate::error::GatewayError;

/// The gate paired with the operation a route serves.
#[derive(Clone)]
pub struct OperationGuard {
    gate: CapabilityGate,
    operation: &'static str,
}

impl CapabilityGate {
    pub fn guard(&self, operation: &'static str) -> OperationGuard {
        OperationGuard {
            gate: self.clone(),
            operation,
        }
    }
}

pub async fn capability_middleware(
    State(guard): State<OperationGuard>,
    req: Request,
    next: Next,
) -> Response {
    if let Err(denial) = guard.gate.check(guard.operation) {
        tracing::warn!(
            operation = guard.operation,
            configured_tier = %denial.configured,
            path = %req.uri().path(),
            "HTTP request rejected by capability gate"
        );
        return GatewayError::CapabilityDenied(denial).into_response();
    }

    next.run(req).await
}
