use axum::{extract::State, Json};
use kaspi_core::extract::{ApiJson, ApiPath, ApiQuery};
use kaspi_core::{ApiResponse, GatewayError};

use crate::dtos::{
    DeviceTokenQuery, PaymentDetails, PaymentDetailsRequest, RefundPaymentRequest, ReturnOperation,
};
use crate::startup::AppState;

pub async fn payment_details(
    State(state): State<AppState>,
    ApiPath(qr_payment_id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<DeviceTokenQuery>,
) -> Result<Json<ApiResponse<PaymentDetails>>, GatewayError> {
    let details = state
        .gateway
        .payment_details(PaymentDetailsRequest {
            qr_payment_id,
            device_token: query.device_token,
        })
        .await?;
    Ok(ApiResponse::ok(details))
}

pub async fn refund_payment(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RefundPaymentRequest>,
) -> Result<Json<ApiResponse<ReturnOperation>>, GatewayError> {
    let operation = state.gateway.refund_payment(request).await?;
    Ok(ApiResponse::ok(operation))
}
