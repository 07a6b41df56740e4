use kaspi_core::grpc::GrpcResult;
use tonic::{Request, Response};
use tracing::instrument;

use crate::dtos;
use crate::grpc::proto::{
    enhanced_refund_service_server::EnhancedRefundService, GetPaymentDetailsRequest,
    PaymentDetails, RefundPaymentRequest, RefundPaymentResponse,
};
use crate::services::PaymentGateway;

pub struct EnhancedRefundGrpcService {
    gateway: PaymentGateway,
}

impl EnhancedRefundGrpcService {
    pub fn new(gateway: PaymentGateway) -> Self {
        Self { gateway }
    }
}

impl From<dtos::PaymentDetails> for PaymentDetails {
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
impl EnhancedRefundService for EnhancedRefundGrpcService {
    #[instrument(skip(self, request), fields(method = "GetPaymentDetails"))]
    async fn get_payment_details(
        &self,
        request: Request<GetPaymentDetailsRequest>,
    ) -> GrpcResult<PaymentDetails> {
        let req = request.into_inner();
        let details = self
            .gateway
            .payment_details(dtos::PaymentDetailsRequest {
                qr_payment_id: req.qr_payment_id,
                device_token: req.device_token,
            })
            .await?;
        Ok(Response::new(details.into()))
    }

    #[instrument(skip(self, request), fields(method = "RefundPayment"))]
    async fn refund_payment(
        &self,
        request: Request<RefundPaymentRequest>,
    ) -> GrpcResult<RefundPaymentResponse> {
        let req = request.into_inner();
        let operation = self
            .gateway
            .refund_payment(dtos::RefundPaymentRequest {
                device_token: req.device_token,
                qr_payment_id: req.qr_payment_id,
                return_amount: req.return_amount,
            })
            .await?;
        Ok(Response::new(RefundPaymentResponse {
            return_operation_id: operation.return_operation_id,
        }))
    }
}
