//! gRPC surface: one tonic service per functional area.
//!
//! The services only convert between protobuf messages and the gateway's
//! request types. Gating happens in [`kaspi_core::grpc::CapabilityLayer`]
//! before a call reaches them.

pub mod device_service;
pub mod enhanced_refund_service;
pub mod payment_service;
pub mod refund_service;
pub mod utility_service;

pub use device_service::DeviceGrpcService;
pub use enhanced_refund_service::EnhancedRefundGrpcService;
pub use payment_service::PaymentGrpcService;
pub use refund_service::RefundGrpcService;
pub use utility_service::UtilityGrpcService;

pub mod proto {
    tonic::include_proto!("kaspi.gateway.v1");

    pub const FILE_DESCRIPTOR_SET: &[u8] =
        tonic::include_file_descriptor_set!("kaspi_gateway_descriptor");
}
