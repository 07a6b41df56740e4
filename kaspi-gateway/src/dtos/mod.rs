//! Request and response bodies.
//!
//! Requests arrive as snake_case JSON (or are built from protobuf messages)
//! and go to the provider as PascalCase. Responses arrive from the provider
//! as PascalCase and leave as snake_case.

pub mod device;
pub mod enhanced;
pub mod payment;
pub mod refund;
pub mod utility;

pub use device::{
    DeleteDeviceRequest, DeviceRegistration, RegisterDeviceRequest, TradePoint, TradePointsQuery,
};
pub use enhanced::{DeviceTokenQuery, PaymentDetailsRequest, RefundPaymentRequest};
pub use payment::{
    CreatePaymentRequest, PaymentLink, PaymentLinkBehaviorOptions, PaymentStatus,
    PaymentStatusRequest, QrPaymentBehaviorOptions, QrToken,
};
pub use refund::{
    CreateRefundQrRequest, OperationDetailsRequest, PaymentDetails, QrReturnBehaviorOptions,
    RefundOperation, RefundOperationsRequest, RefundQrToken, RefundStatus, RefundStatusRequest,
    ReturnOperation, ReturnPaymentRequest,
};
pub use utility::{Capabilities, SimulateRequest, SimulationAction};

use std::borrow::Cow;
use validator::ValidationError;

/// Amounts must be finite and at least one tiyn.
///
/// `range` lets NaN through, and serde_json writes non-finite floats as `null`.
pub(crate) fn positive_amount(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value >= 0.01 {
        return Ok(());
    }

    let mut error = ValidationError::new("positive_amount");
    error.message = Some(Cow::Borrowed("must be positive"));
    Err(error)
}
