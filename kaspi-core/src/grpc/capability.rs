//! Capability gate for the gRPC server.
//!
//! tonic interceptors only see metadata, not the method being called, so the
//! gate runs as a tower layer over the raw HTTP/2 request instead. The request
//! path `/<package>.<Service>/<Method>` with the leading slash removed is the
//! operation identifier looked up in the shared requirements table.
//!
//! Only paths inside the gated package are checked. Health and reflection
//! services pass through untouched.

use std::task::{Context, Poll};

use futures::future::BoxFuture;
use http::{header, HeaderValue};
use tonic::Status;
use tower::{Layer, Service};

use crate::capability::CapabilityGate;
use crate::error::GatewayError;
use crate::grpc::error::IntoStatus;

#[derive(Clone)]
pub struct CapabilityLayer {
    gate: CapabilityGate,
    package: String,
}

impl CapabilityLayer {
    /// Gate every method under `package` (for example `kaspi.gateway.v1`).
    pub fn new(gate: CapabilityGate, package: impl Into<String>) -> Self {
        Self {
            gate,
            package: package.into(),
        }
    }
}

impl<S> Layer<S> for CapabilityLayer {
    type Service = CapabilityService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CapabilityService {
            inner,
            gate: self.gate.clone(),
            prefix: format!("/{}.", self.package),
        }
    }
}

#[derive(Clone)]
pub struct CapabilityService<S> {
    inner: S,
    gate: CapabilityGate,
    prefix: String,
}

/// Operation identifier for a gRPC request path, if it belongs to the gated package.
pub fn operation_for_path<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    if path.starts_with(prefix) {
        Some(&path[1..])
    } else {
        None
    }
}

impl<S, ReqBody, ResBody> Service<http::Request<ReqBody>> for CapabilityService<S>
where
    S: Service<http::Request<ReqBody>, Response = http::Response<ResBody>>
        + Clone
        + Send
        + 'static,
    S::Future: Send + 'static,
    ReqBody: Send + 'static,
    ResBody: Default + Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: http::Request<ReqBody>) -> Self::Future {
        if let Some(operation) = operation_for_path(req.uri().path(), &self.prefix) {
            if let Err(denial) = self.gate.check(operation) {
                tracing::warn!(
                    operation = %operation,
                    configured_tier = %denial.configured,
                    "gRPC call rejected by capability gate"
                );
                let status = GatewayError::CapabilityDenied(denial).into_status();
                let response = status_response(&status);
                return Box::pin(async move { Ok(response) });
            }
        }

        // The clone may not be ready; keep the instance poll_ready was called on.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        Box::pin(async move { inner.call(req).await })
    }
}

/// Trailers-only gRPC response carrying `status`.
fn status_response<B: Default>(status: &Status) -> http::Response<B> {
    let mut response = http::Response::new(B::default());
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/grpc"),
    );
    headers.insert("grpc-status", HeaderValue::from(status.code() as i32));
    if let Ok(value) = HeaderValue::from_str(&urlencoding::encode(status.message())) {
        headers.insert("grpc-message", value);
    }
    response
}
