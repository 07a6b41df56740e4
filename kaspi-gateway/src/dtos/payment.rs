use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body of both QR token and payment link creation.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all(deserialize = "snake_case", serialize = "PascalCase"))]
pub struct CreatePaymentRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub device_token: String,
    #[validate(custom(function = "crate::dtos::positive_amount"))]
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 64, message = "must be 1 to 64 characters"))]
    pub external_id: Option<String>,
}

/// Polling hints, in seconds.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all(deserialize = "PascalCase", serialize = "snake_case"))]
pub struct QrPaymentBehaviorOptions {
    pub status_polling_interval: i32,
    pub qr_code_scan_wait_timeout: i32,
    pub payment_confirmation_timeout: i32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all(deserialize = "PascalCase", serialize = "snake_case"))]
pub struct QrToken {
    pub qr_token: String,
    pub expire_date: String,
    pub qr_payment_id: i64,
    #[serde(default)]
    pub payment_methods: Vec<String>,
    #[serde(rename(deserialize = "QrPaymentBehaviorOptions", serialize = "behavior_options"))]
    pub behavior_options: QrPaymentBehaviorOptions,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all(deserialize = "PascalCase", serialize = "snake_case"))]
pub struct PaymentLinkBehaviorOptions {
    pub status_polling_interval: i32,
    pub link_activation_wait_timeout: i32,
    pub payment_confirmation_timeout: i32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all(deserialize = "PascalCase", serialize = "snake_case"))]
pub struct PaymentLink {
    pub payment_link: String,
    pub expire_date: String,
    pub payment_id: i64,
    #[serde(default)]
    pub payment_methods: Vec<String>,
    #[serde(rename(deserialize = "PaymentBehaviorOptions", serialize = "behavior_options"))]
    pub behavior_options: PaymentLinkBehaviorOptions,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PaymentStatusRequest {
    #[validate(range(min = 1, message = "must be positive"))]
    pub qr_payment_id: i64,
}

/// Payment state. `status` is one of the provider's values such as
/// `Wait`, `Processed` or `Error`; the rest is filled in once processed.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all(deserialize = "PascalCase", serialize = "snake_case"))]
pub struct PaymentStatus {
    pub status: String,
    pub transaction_id: Option<String>,
    pub loan_offer_name: Option<String>,
    pub loan_term: Option<i32>,
    pub is_offer: Option<bool>,
    pub product_type: Option<String>,
    pub amount: Option<f64>,
    pub store_name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
}
