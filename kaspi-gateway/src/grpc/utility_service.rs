use kaspi_core::grpc::GrpcResult;
use tonic::{Request, Response};
use tracing::instrument;

use crate::dtos::{self, SimulationAction};
use crate::grpc::proto::{
    utility_service_server::UtilityService, GetCapabilitiesRequest, GetCapabilitiesResponse,
    SimulateRequest, SimulateResponse,
};
use crate::services::PaymentGateway;

pub struct UtilityGrpcService {
    gateway: PaymentGateway,
}

impl UtilityGrpcService {
    pub fn new(gateway: PaymentGateway) -> Self {
        Self { gateway }
    }

    async fn simulate(
        &self,
        action: SimulationAction,
        request: Request<SimulateRequest>,
    ) -> GrpcResult<SimulateResponse> {
        self.gateway
            .simulate(
                action,
                dtos::SimulateRequest {
                    qr_payment_id: request.into_inner().qr_payment_id,
                },
            )
            .await?;
        Ok(Response::new(SimulateResponse {}))
    }
}

#[tonic::async_trait]
impl UtilityService for UtilityGrpcService {
    async fn get_capabilities(
        &self,
        _request: Request<GetCapabilitiesRequest>,
    ) -> GrpcResult<GetCapabilitiesResponse> {
        let capabilities = self.gateway.capabilities();
        Ok(Response::new(GetCapabilitiesResponse {
            tier: capabilities.tier.as_str().to_string(),
            operations: capabilities.operations,
        }))
    }

    #[instrument(skip(self, request), fields(method = "SimulateScan"))]
    async fn simulate_scan(
        &self,
        request: Request<SimulateRequest>,
    ) -> GrpcResult<SimulateResponse> {
        self.simulate(SimulationAction::Scan, request).await
    }

    #[instrument(skip(self, request), fields(method = "SimulateConfirm"))]
    async fn simulate_confirm(
        &self,
        request: Request<SimulateRequest>,
    ) -> GrpcResult<SimulateResponse> {
        self.simulate(SimulationAction::Confirm, request).await
    }

    #[instrument(skip(self, request), fields(method = "SimulateScanError"))]
    async fn simulate_scan_error(
        &self,
        request: Request<SimulateRequest>,
    ) -> GrpcResult<SimulateResponse> {
        self.simulate(SimulationAction::ScanError, request).await
    }

    #[instrument(skip(self, request), fields(method = "SimulateConfirmError"))]
    async fn simulate_confirm_error(
        &self,
        request: Request<SimulateRequest>,
    ) -> GrpcResult<SimulateResponse> {
        self.simulate(SimulationAction::ConfirmError, request).await
    }
}
