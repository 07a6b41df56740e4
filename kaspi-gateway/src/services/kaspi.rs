//! Kaspi Pay merchant API operations.

use async_trait::async_trait;
use kaspi_core::GatewayError;
use serde::de::IgnoredAny;

use crate::config::KaspiConfig;
use crate::dtos::{
    CreatePaymentRequest, CreateRefundQrRequest, DeleteDeviceRequest, DeviceRegistration,
    OperationDetailsRequest, PaymentDetails, PaymentDetailsRequest, PaymentLink, PaymentStatus,
    QrToken, RefundOperation, RefundOperationsRequest, RefundPaymentRequest, RefundQrToken,
    RefundStatus, RegisterDeviceRequest, ReturnOperation, ReturnPaymentRequest, SimulateRequest,
    SimulationAction, TradePoint,
};
use crate::services::envelope::EnvelopeClient;

/// The provider as seen by the gateway service. One call per method.
#[async_trait]
pub trait KaspiProvider: Send + Sync {
    async fn trade_points(&self, organization_bin: Option<&str>)
        -> Result<Vec<TradePoint>, GatewayError>;

    async fn register_device(
        &self,
        request: &RegisterDeviceRequest,
    ) -> Result<DeviceRegistration, GatewayError>;

    async fn delete_device(&self, request: &DeleteDeviceRequest) -> Result<(), GatewayError>;

    async fn create_qr_token(&self, request: &CreatePaymentRequest)
        -> Result<QrToken, GatewayError>;

    async fn create_payment_link(
        &self,
        request: &CreatePaymentRequest,
    ) -> Result<PaymentLink, GatewayError>;

    async fn payment_status(&self, qr_payment_id: i64) -> Result<PaymentStatus, GatewayError>;

    async fn create_refund_qr_token(
        &self,
        request: &CreateRefundQrRequest,
    ) -> Result<RefundQrToken, GatewayError>;

    async fn refund_status(&self, qr_return_id: i64) -> Result<RefundStatus, GatewayError>;

    async fn refund_operations(
        &self,
        request: &RefundOperationsRequest,
    ) -> Result<Vec<RefundOperation>, GatewayError>;

    async fn operation_details(
        &self,
        request: &OperationDetailsRequest,
    ) -> Result<PaymentDetails, GatewayError>;

    async fn return_payment(
        &self,
        request: &ReturnPaymentRequest,
    ) -> Result<ReturnOperation, GatewayError>;

    async fn simulate(
        &self,
        action: SimulationAction,
        request: &SimulateRequest,
    ) -> Result<(), GatewayError>;

    async fn payment_details(
        &self,
        request: &PaymentDetailsRequest,
    ) -> Result<PaymentDetails, GatewayError>;

    async fn refund_payment(
        &self,
        request: &RefundPaymentRequest,
    ) -> Result<ReturnOperation, GatewayError>;
}

#[derive(Clone)]
pub struct KaspiClient {
    envelope: EnvelopeClient,
}

impl KaspiClient {
    pub fn new(config: &KaspiConfig) -> anyhow::Result<Self> {
        Ok(Self {
            envelope: EnvelopeClient::new(config)?,
        })
    }
}

#[async_trait]
impl KaspiProvider for KaspiClient {
    async fn trade_points(
        &self,
        organization_bin: Option<&str>,
    ) -> Result<Vec<TradePoint>, GatewayError> {
        match organization_bin {
            Some(bin) => {
                let path = format!("partner/tradepoints/{}", urlencoding::encode(bin));
                self.envelope.get(&path).await
            }
            None => self.envelope.get("partner/tradepoints").await,
        }
    }

    async fn register_device(
        &self,
        request: &RegisterDeviceRequest,
    ) -> Result<DeviceRegistration, GatewayError> {
        self.envelope.post("device/register", request).await
    }

    async fn delete_device(&self, request: &DeleteDeviceRequest) -> Result<(), GatewayError> {
        self.envelope
            .post::<_, IgnoredAny>("device/delete", request)
            .await
            .map(|_| ())
    }

    async fn create_qr_token(
        &self,
        request: &CreatePaymentRequest,
    ) -> Result<QrToken, GatewayError> {
        self.envelope.post("qr/create", request).await
    }

    async fn create_payment_link(
        &self,
        request: &CreatePaymentRequest,
    ) -> Result<PaymentLink, GatewayError> {
        self.envelope.post("qr/create-link", request).await
    }

    async fn payment_status(&self, qr_payment_id: i64) -> Result<PaymentStatus, GatewayError> {
        self.envelope
            .get(&format!("payment/status/{}", qr_payment_id))
            .await
    }

    async fn create_refund_qr_token(
        &self,
        request: &CreateRefundQrRequest,
    ) -> Result<RefundQrToken, GatewayError> {
        self.envelope.post("return/create", request).await
    }

    async fn refund_status(&self, qr_return_id: i64) -> Result<RefundStatus, GatewayError> {
        self.envelope
            .get(&format!("return/status/{}", qr_return_id))
            .await
    }

    async fn refund_operations(
        &self,
        request: &RefundOperationsRequest,
    ) -> Result<Vec<RefundOperation>, GatewayError> {
        self.envelope.post("return/operations", request).await
    }

    async fn operation_details(
        &self,
        request: &OperationDetailsRequest,
    ) -> Result<PaymentDetails, GatewayError> {
        self.envelope.post("return/operation/details", request).await
    }

    async fn return_payment(
        &self,
        request: &ReturnPaymentRequest,
    ) -> Result<ReturnOperation, GatewayError> {
        self.envelope.post("return/return", request).await
    }

    async fn simulate(
        &self,
        action: SimulationAction,
        request: &SimulateRequest,
    ) -> Result<(), GatewayError> {
        self.envelope
            .post::<_, IgnoredAny>(action.path(), request)
            .await
            .map(|_| ())
    }

    async fn payment_details(
        &self,
        request: &PaymentDetailsRequest,
    ) -> Result<PaymentDetails, GatewayError> {
        self.envelope
            .get_with_query("payment/details", request)
            .await
    }

    async fn refund_payment(
        &self,
        request: &RefundPaymentRequest,
    ) -> Result<ReturnOperation, GatewayError> {
        self.envelope.post("payment/return", request).await
    }
}
