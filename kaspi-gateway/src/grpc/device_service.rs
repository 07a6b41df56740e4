use kaspi_core::grpc::GrpcResult;
use tonic::{Request, Response};
use tracing::instrument;

use crate::dtos::{self, DeleteDeviceRequest, RegisterDeviceRequest, TradePointsQuery};
use crate::grpc::proto::{
    self, device_service_server::DeviceService, DeleteDeviceResponse, GetTradePointsRequest,
    GetTradePointsResponse, RegisterDeviceResponse,
};
use crate::services::PaymentGateway;

pub struct DeviceGrpcService {
    gateway: PaymentGateway,
}

impl DeviceGrpcService {
    pub fn new(gateway: PaymentGateway) -> Self {
        Self { gateway }
    }
}

impl From<dtos::TradePoint> for proto::TradePoint {
    fn from(point: dtos::TradePoint) -> Self {
        Self {
            trade_point_id: point.trade_point_id,
            trade_point_name: point.trade_point_name,
        }
    }
}

#[tonic::async_trait]
impl DeviceService for DeviceGrpcService {
    #[instrument(skip(self, request), fields(method = "GetTradePoints"))]
    async fn get_trade_points(
        &self,
        request: Request<GetTradePointsRequest>,
    ) -> GrpcResult<GetTradePointsResponse> {
        let req = request.into_inner();
        let points = self
            .gateway
            .trade_points(TradePointsQuery {
                organization_bin: req.organization_bin,
            })
            .await?;

        Ok(Response::new(GetTradePointsResponse {
            trade_points: points.into_iter().map(Into::into).collect(),
        }))
    }

    #[instrument(skip(self, request), fields(method = "RegisterDevice"))]
    async fn register_device(
        &self,
        request: Request<proto::RegisterDeviceRequest>,
    ) -> GrpcResult<RegisterDeviceResponse> {
        let req = request.into_inner();
        let registration = self
            .gateway
            .register_device(RegisterDeviceRequest {
                device_id: req.device_id,
                trade_point_id: req.trade_point_id,
                organization_bin: req.organization_bin,
            })
            .await?;

        Ok(Response::new(RegisterDeviceResponse {
            device_token: registration.device_token,
        }))
    }

    #[instrument(skip(self, request), fields(method = "DeleteDevice"))]
    async fn delete_device(
        &self,
        request: Request<proto::DeleteDeviceRequest>,
    ) -> GrpcResult<DeleteDeviceResponse> {
        let req = request.into_inner();
        self.gateway
            .delete_device(DeleteDeviceRequest {
                device_token: req.device_token,
            })
            .await?;

        Ok(Response::new(DeleteDeviceResponse {}))
    }
}
