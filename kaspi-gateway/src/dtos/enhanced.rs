use serde::{Deserialize, Serialize};
use validator::Validate;

/// Sent to the provider as query parameters.
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct PaymentDetailsRequest {
    #[validate(range(min = 1, message = "must be positive"))]
    pub qr_payment_id: i64,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub device_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeviceTokenQuery {
    pub device_token: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all(deserialize = "snake_case", serialize = "PascalCase"))]
pub struct RefundPaymentRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub device_token: String,
    #[validate(range(min = 1, message = "must be positive"))]
    pub qr_payment_id: i64,
    #[validate(custom(function = "crate::dtos::positive_amount"))]
    pub return_amount: f64,
}
