use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct TradePointsQuery {
    #[validate(length(equal = 12, message = "must be 12 characters"))]
    pub organization_bin: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all(deserialize = "PascalCase", serialize = "snake_case"))]
pub struct TradePoint {
    pub trade_point_id: i64,
    pub trade_point_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all(deserialize = "snake_case", serialize = "PascalCase"))]
pub struct RegisterDeviceRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub device_id: String,
    #[validate(range(min = 1, message = "must be positive"))]
    pub trade_point_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(equal = 12, message = "must be 12 characters"))]
    pub organization_bin: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all(deserialize = "PascalCase", serialize = "snake_case"))]
pub struct DeviceRegistration {
    pub device_token: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all(deserialize = "snake_case", serialize = "PascalCase"))]
pub struct DeleteDeviceRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub device_token: String,
}
