use kaspi_core::grpc::GrpcResult;
use tonic::{Request, Response};
use tracing::instrument;

use crate::dtos::{self, RefundStatusRequest};
use crate::grpc::proto::{
    self, refund_service_server::RefundService, CreateRefundQrTokenRequest,
    CreateRefundQrTokenResponse, GetOperationDetailsRequest, GetRefundStatusRequest,
    GetRefundStatusResponse, ListRefundOperationsRequest, ListRefundOperationsResponse,
    OperationDetails, ReturnPaymentResponse,
};
use crate::services::PaymentGateway;

pub struct RefundGrpcService {
    gateway: PaymentGateway,
}

impl RefundGrpcService {
    pub fn new(gateway: PaymentGateway) -> Self {
        Self { gateway }
    }
}

impl From<dtos::RefundQrToken> for CreateRefundQrTokenResponse {
    fn from(token: dtos::RefundQrToken) -> Self {
        let options = token.behavior_options;
        Self {
            qr_token: token.qr_token,
            expire_date: token.expire_date,
            qr_return_id: token.qr_return_id,
            behavior_options: Some(proto::QrReturnBehaviorOptions {
                qr_code_scan_event_polling_interval: options.qr_code_scan_event_polling_interval,
                qr_code_scan_wait_timeout: options.qr_code_scan_wait_timeout,
            }),
        }
    }
}

impl From<dtos::RefundOperation> for proto::RefundOperation {
    fn from(operation: dtos::RefundOperation) -> Self {
        Self {
            qr_payment_id: operation.qr_payment_id,
            transaction_date: operation.transaction_date,
            amount: operation.amount,
        }
    }
}

impl From<dtos::PaymentDetails> for OperationDetails {
    fn from(details: dtos::PaymentDetails) -> Self {
        Self {
            qr_payment_id: details.qr_payment_id,
            total_amount: details.total_amount,
            available_return_amount: details.available_return_amount,
            transaction_date: details.transaction_date,
        }
    }
}

#[tonic::async_trait]
impl RefundService for RefundGrpcService {
    #[instrument(skip(self, request), fields(method = "CreateRefundQrToken"))]
    async fn create_refund_qr_token(
        &self,
        request: Request<CreateRefundQrTokenRequest>,
    ) -> GrpcResult<CreateRefundQrTokenResponse> {
        let req = request.into_inner();
        let token = self
            .gateway
            .create_refund_qr_token(dtos::CreateRefundQrRequest {
                device_token: req.device_token,
                external_id: req.external_id,
            })
            .await?;
        Ok(Response::new(token.into()))
    }

    #[instrument(skip(self, request), fields(method = "GetRefundStatus"))]
    async fn get_refund_status(
        &self,
        request: Request<GetRefundStatusRequest>,
    ) -> GrpcResult<GetRefundStatusResponse> {
        let status = self
            .gateway
            .refund_status(RefundStatusRequest {
                qr_return_id: request.into_inner().qr_return_id,
            })
            .await?;
        Ok(Response::new(GetRefundStatusResponse {
            status: status.status,
        }))
    }

    #[instrument(skip(self, request), fields(method = "ListRefundOperations"))]
    async fn list_refund_operations(
        &self,
        request: Request<ListRefundOperationsRequest>,
    ) -> GrpcResult<ListRefundOperationsResponse> {
        let req = request.into_inner();
        let operations = self
            .gateway
            .refund_operations(dtos::RefundOperationsRequest {
                device_token: req.device_token,
                qr_return_id: req.qr_return_id,
                max_result: req.max_result,
            })
            .await?;
        Ok(Response::new(ListRefundOperationsResponse {
            operations: operations.into_iter().map(Into::into).collect(),
        }))
    }

    #[instrument(skip(self, request), fields(method = "GetOperationDetails"))]
    async fn get_operation_details(
        &self,
        request: Request<GetOperationDetailsRequest>,
    ) -> GrpcResult<OperationDetails> {
        let req = request.into_inner();
        let details = self
            .gateway
            .operation_details(dtos::OperationDetailsRequest {
                device_token: req.device_token,
                qr_return_id: req.qr_return_id,
                qr_payment_id: req.qr_payment_id,
            })
            .await?;
        Ok(Response::new(details.into()))
    }

    #[instrument(skip(self, request), fields(method = "ReturnPayment"))]
    async fn return_payment(
        &self,
        request: Request<proto::ReturnPaymentRequest>,
    ) -> GrpcResult<ReturnPaymentResponse> {
        let req = request.into_inner();
        let operation = self
            .gateway
            .return_payment(dtos::ReturnPaymentRequest {
                device_token: req.device_token,
                qr_return_id: req.qr_return_id,
                qr_payment_id: req.qr_payment_id,
                qr_return_amount: req.qr_return_amount,
            })
            .await?;
        Ok(Response::new(ReturnPaymentResponse {
            return_operation_id: operation.return_operation_id,
        }))
    }
}
