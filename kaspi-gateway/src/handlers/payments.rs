use axum::{extract::State, Json};
use kaspi_core::extract::{ApiJson, ApiPath};
use kaspi_core::{ApiResponse, GatewayError};

use crate::dtos::{CreatePaymentRequest, PaymentLink, PaymentStatus, PaymentStatusRequest, QrToken};
use crate::startup::AppState;

pub async fn create_qr_token(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreatePaymentRequest>,
) -> Result<Json<ApiResponse<QrToken>>, GatewayError> {
    let token = state.gateway.create_qr_token(request).await?;
    Ok(ApiResponse::ok(token))
}

pub async fn create_payment_link(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreatePaymentRequest>,
) -> Result<Json<ApiResponse<PaymentLink>>, GatewayError> {
    let link = state.gateway.create_payment_link(request).await?;
    Ok(ApiResponse::ok(link))
}

pub async fn payment_status(
    State(state): State<AppState>,
    ApiPath(qr_payment_id): ApiPath<i64>,
) -> Result<Json<ApiResponse<PaymentStatus>>, GatewayError> {
    let status = state
        .gateway
        .payment_status(PaymentStatusRequest { qr_payment_id })
        .await?;
    Ok(ApiResponse::ok(status))
}
