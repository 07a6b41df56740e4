use axum::{extract::State, Json};
use kaspi_core::extract::{ApiJson, ApiQuery};
use kaspi_core::{ApiResponse, GatewayError};

use crate::dtos::{
    DeleteDeviceRequest, DeviceRegistration, RegisterDeviceRequest, TradePoint, TradePointsQuery,
};
use crate::startup::AppState;

pub async fn trade_points(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<TradePointsQuery>,
) -> Result<Json<ApiResponse<Vec<TradePoint>>>, GatewayError> {
    let points = state.gateway.trade_points(query).await?;
    Ok(ApiResponse::ok(points))
}

pub async fn register_device(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterDeviceRequest>,
) -> Result<Json<ApiResponse<DeviceRegistration>>, GatewayError> {
    let registration = state.gateway.register_device(request).await?;
    Ok(ApiResponse::ok(registration))
}

pub async fn delete_device(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<DeleteDeviceRequest>,
) -> Result<Json<ApiResponse<()>>, GatewayError> {
    state.gateway.delete_device(request).await?;
    Ok(ApiResponse::ok(()))
}
