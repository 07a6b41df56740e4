use axum::{extract::State, Json};
use kaspi_core::extract::{ApiJson, ApiPath};
use kaspi_core::{ApiResponse, GatewayError};

use crate::dtos::{
    CreateRefundQrRequest, OperationDetailsRequest, PaymentDetails, RefundOperation,
    RefundOperationsRequest, RefundQrToken, RefundStatus, RefundStatusRequest, ReturnOperation,
    ReturnPaymentRequest,
};
use crate::startup::AppState;

pub async fn create_refund_qr_token(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateRefundQrRequest>,
) -> Result<Json<ApiResponse<RefundQrToken>>, GatewayError> {
    let token = state.gateway.create_refund_qr_token(request).await?;
    Ok(ApiResponse::ok(token))
}

pub async fn refund_status(
    State(state): State<AppState>,
    ApiPath(qr_return_id): ApiPath<i64>,
) -> Result<Json<ApiResponse<RefundStatus>>, GatewayError> {
    let status = state
        .gateway
        .refund_status(RefundStatusRequest { qr_return_id })
        .await?;
    Ok(ApiResponse::ok(status))
}

pub async fn refund_operations(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RefundOperationsRequest>,
) -> Result<Json<ApiResponse<Vec<RefundOperation>>>, GatewayError> {
    let operations = state.gateway.refund_operations(request).await?;
    Ok(ApiResponse::ok(operations))
}

pub async fn operation_details(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<OperationDetailsRequest>,
) -> Result<Json<ApiResponse<PaymentDetails>>, GatewayError> {
    let details = state.gateway.operation_details(request).await?;
    Ok(ApiResponse::ok(details))
}

pub async fn return_payment(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ReturnPaymentRequest>,
) -> Result<Json<ApiResponse<ReturnOperation>>, GatewayError> {
    let operation = state.gateway.return_payment(request).await?;
    Ok(ApiResponse::ok(operation))
}
