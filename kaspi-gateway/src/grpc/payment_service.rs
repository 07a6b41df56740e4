use kaspi_core::grpc::GrpcResult;
use tonic::{Request, Response};
use tracing::instrument;

use crate::dtos::{self, PaymentStatusRequest};
use crate::grpc::proto::{
    self, payment_service_server::PaymentService, CreatePaymentRequest, CreatePaymentLinkResponse,
    CreateQrTokenResponse, GetPaymentStatusRequest, GetPaymentStatusResponse,
};
use crate::services::PaymentGateway;

pub struct PaymentGrpcService {
    gateway: PaymentGateway,
}

impl PaymentGrpcService {
    pub fn new(gateway: PaymentGateway) -> Self {
        Self { gateway }
    }
}

fn create_request(req: CreatePaymentRequest) -> dtos::CreatePaymentRequest {
    dtos::CreatePaymentRequest {
        device_token: req.device_token,
        amount: req.amount,
        external_id: req.external_id,
    }
}

impl From<dtos::QrToken> for CreateQrTokenResponse {
    fn from(token: dtos::QrToken) -> Self {
        let options = token.behavior_options;
        Self {
            qr_token: token.qr_token,
            expire_date: token.expire_date,
            qr_payment_id: token.qr_payment_id,
            payment_methods: token.payment_methods,
            behavior_options: Some(proto::QrPaymentBehaviorOptions {
                status_polling_interval: options.status_polling_interval,
                qr_code_scan_wait_timeout: options.qr_code_scan_wait_timeout,
                payment_confirmation_timeout: options.payment_confirmation_timeout,
            }),
        }
    }
}

impl From<dtos::PaymentLink> for CreatePaymentLinkResponse {
    fn from(link: dtos::PaymentLink) -> Self {
        let options = link.behavior_options;
        Self {
            payment_link: link.payment_link,
            expire_date: link.expire_date,
            payment_id: link.payment_id,
            payment_methods: link.payment_methods,
            behavior_options: Some(proto::PaymentLinkBehaviorOptions {
                status_polling_interval: options.status_polling_interval,
                link_activation_wait_timeout: options.link_activation_wait_timeout,
                payment_confirmation_timeout: options.payment_confirmation_timeout,
            }),
        }
    }
}

impl From<dtos::PaymentStatus> for GetPaymentStatusResponse {
    fn from(status: dtos::PaymentStatus) -> Self {
        Self {
            status: status.status,
            transaction_id: status.transaction_id,
            loan_offer_name: status.loan_offer_name,
            loan_term: status.loan_term,
            is_offer: status.is_offer,
            product_type: status.product_type,
            amount: status.amount,
            store_name: status.store_name,
            address: status.address,
            city: status.city,
        }
    }
}

#[tonic::async_trait]
impl PaymentService for PaymentGrpcService {
    #[instrument(skip(self, request), fields(method = "CreateQrToken"))]
    async fn create_qr_token(
        &self,
        request: Request<CreatePaymentRequest>,
    ) -> GrpcResult<CreateQrTokenResponse> {
        let token = self
            .gateway
            .create_qr_token(create_request(request.into_inner()))
            .await?;
        Ok(Response::new(token.into()))
    }

    #[instrument(skip(self, request), fields(method = "CreatePaymentLink"))]
    async fn create_payment_link(
        &self,
        request: Request<CreatePaymentRequest>,
    ) -> GrpcResult<CreatePaymentLinkResponse> {
        let link = self
            .gateway
            .create_payment_link(create_request(request.into_inner()))
            .await?;
        Ok(Response::new(link.into()))
    }

    #[instrument(skip(self, request), fields(method = "GetPaymentStatus"))]
    async fn get_payment_status(
        &self,
        request: Request<GetPaymentStatusRequest>,
    ) -> GrpcResult<GetPaymentStatusResponse> {
        let status = self
            .gateway
            .payment_status(PaymentStatusRequest {
                qr_payment_id: request.into_inner().qr_payment_id,
            })
            .await?;
        Ok(Response::new(status.into()))
    }
}
