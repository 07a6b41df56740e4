//! gRPC infrastructure shared by the gateway's services.
//!
//! - Rendering of translated errors as `tonic::Status`
//! - Capability gate as a tower layer keyed by method path
//! - Interceptors for trace context and request metrics

pub mod capability;
pub mod error;
pub mod interceptors;

pub use capability::{CapabilityLayer, CapabilityService};
pub use error::{GrpcResult, IntoStatus};
pub use interceptors::{metrics_interceptor, trace_context_interceptor};
