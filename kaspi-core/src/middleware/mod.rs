pub mod capability;
pub mod metrics;
pub mod tracing;

pub use capability::{capability_middleware, OperationGuard};
pub use metrics::metrics_middleware;
pub use tracing::{request_id_middleware, REQUEST_ID_HEADER};
