use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all(deserialize = "snake_case", serialize = "PascalCase"))]
pub struct CreateRefundQrRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub device_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 64, message = "must be 1 to 64 characters"))]
    pub external_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all(deserialize = "PascalCase", serialize = "snake_case"))]
pub struct QrReturnBehaviorOptions {
    pub qr_code_scan_event_polling_interval: i32,
    pub qr_code_scan_wait_timeout: i32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all(deserialize = "PascalCase", serialize = "snake_case"))]
pub struct RefundQrToken {
    pub qr_token: String,
    pub expire_date: String,
    pub qr_return_id: i64,
    #[serde(rename(deserialize = "QrReturnBehaviorOptions", serialize = "behavior_options"))]
    pub behavior_options: QrReturnBehaviorOptions,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RefundStatusRequest {
    #[validate(range(min = 1, message = "must be positive"))]
    pub qr_return_id: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all(deserialize = "PascalCase", serialize = "snake_case"))]
pub struct RefundStatus {
    pub status: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all(deserialize = "snake_case", serialize = "PascalCase"))]
pub struct RefundOperationsRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub device_token: String,
    #[validate(range(min = 1, message = "must be positive"))]
    pub qr_return_id: i64,
    #[validate(range(min = 1, max = 100, message = "must be between 1 and 100"))]
    pub max_result: i32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all(deserialize = "PascalCase", serialize = "snake_case"))]
pub struct RefundOperation {
    pub qr_payment_id: i64,
    pub transaction_date: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all(deserialize = "snake_case", serialize = "PascalCase"))]
pub struct OperationDetailsRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub device_token: String,
    #[validate(range(min = 1, message = "must be positive"))]
    pub qr_return_id: i64,
    #[validate(range(min = 1, message = "must be positive"))]
    pub qr_payment_id: i64,
}

/// Purchase amounts as seen by the refund flows.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all(deserialize = "PascalCase", serialize = "snake_case"))]
pub struct PaymentDetails {
    pub qr_payment_id: i64,
    pub total_amount: f64,
    pub available_return_amount: f64,
    pub transaction_date: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all(deserialize = "snake_case", serialize = "PascalCase"))]
pub struct ReturnPaymentRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub device_token: String,
    #[validate(range(min = 1, message = "must be positive"))]
    pub qr_return_id: i64,
    #[validate(range(min = 1, message = "must be positive"))]
    pub qr_payment_id: i64,
    #[validate(custom(function = "crate::dtos::positive_amount"))]
    pub qr_return_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all(deserialize = "PascalCase", serialize = "snake_case"))]
pub struct ReturnOperation {
    pub return_operation_id: i64,
}
