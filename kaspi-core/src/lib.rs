//! kaspi-core: shared infrastructure for the Kaspi Pay gateway.
//!
//! The capability gate and the error translator live here so that the HTTP
//! and gRPC surfaces of the gateway share one implementation of each.
pub mod capability;
pub mod config;
pub mod error;
pub mod extract;
pub mod grpc;
pub mod middleware;
pub mod observability;

pub use capability::{CapabilityGate, CapabilityTier, OperationRequirements, TierDenial};
pub use error::{
    ApiResponse, ErrorKind, ErrorOutcome, GatewayError, TransportError, UpstreamError,
};
