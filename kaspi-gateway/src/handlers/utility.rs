use axum::{extract::State, Json};
use kaspi_core::extract::ApiJson;
use kaspi_core::{ApiResponse, GatewayError};

use crate::dtos::{Capabilities, SimulateRequest, SimulationAction};
use crate::startup::AppState;

pub async fn capabilities(State(state): State<AppState>) -> Json<ApiResponse<Capabilities>> {
    ApiResponse::ok(state.gateway.capabilities())
}

async fn simulate(
    state: AppState,
    action: SimulationAction,
    request: SimulateRequest,
) -> Result<Json<ApiResponse<()>>, GatewayError> {
    state.gateway.simulate(action, request).await?;
    Ok(ApiResponse::ok(()))
}

pub async fn simulate_scan(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SimulateRequest>,
) -> Result<Json<ApiResponse<()>>, GatewayError> {
    simulate(state, SimulationAction::Scan, request).await
}

pub async fn simulate_scan_error(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SimulateRequest>,
) -> Result<Json<ApiResponse<()>>, GatewayError> {
    simulate(state, SimulationAction::ScanError, request).await
}

pub async fn simulate_confirm(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SimulateRequest>,
) -> Result<Json<ApiResponse<()>>, GatewayError> {
    simulate(state, SimulationAction::Confirm, request).await
}

pub async fn simulate_confirm_error(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SimulateRequest>,
) -> Result<Json<ApiResponse<()>>, GatewayError> {
    simulate(state, SimulationAction::ConfirmError, request).await
}
