//! Transport-neutral gateway operations.
//!
//! HTTP handlers and gRPC services both decode their input into the request
//! types in [`crate::dtos`] and call into [`PaymentGateway`]. Field validation
//! and optional-feature checks happen here, before the provider is contacted.
//! Whether the operation itself is reachable has already been decided by the
//! transport's capability gate.

use std::sync::Arc;

use chrono::Utc;
use kaspi_core::{CapabilityGate, GatewayError};
use validator::Validate;

use crate::dtos::{
    Capabilities, CreatePaymentRequest, CreateRefundQrRequest, DeleteDeviceRequest,
    DeviceRegistration, OperationDetailsRequest, PaymentDetails, PaymentDetailsRequest,
    PaymentLink, PaymentStatus, PaymentStatusRequest, QrToken, RefundOperation,
    RefundOperationsRequest, RefundPaymentRequest, RefundQrToken, RefundStatus,
    RefundStatusRequest, RegisterDeviceRequest, ReturnOperation, ReturnPaymentRequest,
    SimulateRequest, SimulationAction, TradePoint, TradePointsQuery,
};
use crate::operations;
use crate::services::device_store::{DeviceRecord, DeviceTokenStore, StoreError};
use crate::services::kaspi::KaspiProvider;

#[derive(Clone)]
pub struct PaymentGateway {
    provider: Arc<dyn KaspiProvider>,
    devices: Arc<dyn DeviceTokenStore>,
    gate: CapabilityGate,
}

impl PaymentGateway {
    pub fn new(
        provider: Arc<dyn KaspiProvider>,
        devices: Arc<dyn DeviceTokenStore>,
        gate: CapabilityGate,
    ) -> Self {
        Self {
            provider,
            devices,
            gate,
        }
    }

    pub fn gate(&self) -> &CapabilityGate {
        &self.gate
    }

    fn require_feature(&self, feature: &str) -> Result<(), GatewayError> {
        self.gate.check(feature).map_err(|denial| {
            tracing::warn!(
                feature = %feature,
                configured_tier = %denial.configured,
                "Optional feature rejected"
            );
            GatewayError::FeatureUnavailable(denial)
        })
    }

    // ------------------------------------------------------------------
    // Devices
    // ------------------------------------------------------------------

    pub async fn trade_points(
        &self,
        query: TradePointsQuery,
    ) -> Result<Vec<TradePoint>, GatewayError> {
        query.validate()?;
        if query.organization_bin.is_some() {
            self.require_feature(operations::TRADE_POINTS_BY_ORGANIZATION)?;
        }

        self.provider
            .trade_points(query.organization_bin.as_deref())
            .await
    }

    pub async fn register_device(
        &self,
        request: RegisterDeviceRequest,
    ) -> Result<DeviceRegistration, GatewayError> {
        request.validate()?;
        if request.organization_bin.is_some() {
            self.require_feature(operations::REGISTER_DEVICE_FOR_ORGANIZATION)?;
        }

        // A known device id would leave the provider's new token unrecorded
        if self.devices.contains(&request.device_id).await? {
            return Err(StoreError::AlreadyExists(request.device_id).into());
        }

        let registration = self.provider.register_device(&request).await?;

        self.devices
            .save(DeviceRecord {
                device_id: request.device_id.clone(),
                device_token: registration.device_token.clone(),
                trade_point_id: request.trade_point_id,
                organization_bin: request.organization_bin.clone(),
                registered_at: Utc::now(),
            })
            .await?;

        tracing::info!(
            device_id = %request.device_id,
            trade_point_id = request.trade_point_id,
            "Device registered"
        );
        Ok(registration)
    }

    pub async fn delete_device(&self, request: DeleteDeviceRequest) -> Result<(), GatewayError> {
        request.validate()?;
        self.provider.delete_device(&request).await?;
        self.devices.remove(&request.device_token).await?;

        tracing::info!("Device deleted");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Payments
    // ------------------------------------------------------------------

    pub async fn create_qr_token(
        &self,
        request: CreatePaymentRequest,
    ) -> Result<QrToken, GatewayError> {
        request.validate()?;
        let token = self.provider.create_qr_token(&request).await?;

        tracing::info!(
            qr_payment_id = token.qr_payment_id,
            amount = request.amount,
            "QR token created"
        );
        Ok(token)
    }

    pub async fn create_payment_link(
        &self,
        request: CreatePaymentRequest,
    ) -> Result<PaymentLink, GatewayError> {
        request.validate()?;
        let link = self.provider.create_payment_link(&request).await?;

        tracing::info!(
            payment_id = link.payment_id,
            amount = request.amount,
            "Payment link created"
        );
        Ok(link)
    }

    pub async fn payment_status(
        &self,
        request: PaymentStatusRequest,
    ) -> Result<PaymentStatus, GatewayError> {
        request.validate()?;
        self.provider.payment_status(request.qr_payment_id).await
    }

    // ------------------------------------------------------------------
    // Refunds
    // ------------------------------------------------------------------

    pub async fn create_refund_qr_token(
        &self,
        request: CreateRefundQrRequest,
    ) -> Result<RefundQrToken, GatewayError> {
        request.validate()?;
        let token = self.provider.create_refund_qr_token(&request).await?;

        tracing::info!(qr_return_id = token.qr_return_id, "Refund QR token created");
        Ok(token)
    }

    pub async fn refund_status(
        &self,
        request: RefundStatusRequest,
    ) -> Result<RefundStatus, GatewayError> {
        request.validate()?;
        self.provider.refund_status(request.qr_return_id).await
    }

    pub async fn refund_operations(
        &self,
        request: RefundOperationsRequest,
    ) -> Result<Vec<RefundOperation>, GatewayError> {
        request.validate()?;
        self.provider.refund_operations(&request).await
    }

    pub async fn operation_details(
        &self,
        request: OperationDetailsRequest,
    ) -> Result<PaymentDetails, GatewayError> {
        request.validate()?;
        self.provider.operation_details(&request).await
    }

    pub async fn return_payment(
        &self,
        request: ReturnPaymentRequest,
    ) -> Result<ReturnOperation, GatewayError> {
        request.validate()?;
        let operation = self.provider.return_payment(&request).await?;

        tracing::info!(
            qr_payment_id = request.qr_payment_id,
            return_operation_id = operation.return_operation_id,
            amount = request.qr_return_amount,
            "Payment returned"
        );
        Ok(operation)
    }

    // ------------------------------------------------------------------
    // Utility
    // ------------------------------------------------------------------

    /// Tier and reachable operations of this deployment. Local only.
    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            tier: self.gate.tier(),
            operations: self
                .gate
                .allowed_operations()
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }

    pub async fn simulate(
        &self,
        action: SimulationAction,
        request: SimulateRequest,
    ) -> Result<(), GatewayError> {
        request.validate()?;
        self.provider.simulate(action, &request).await?;

        tracing::info!(
            qr_payment_id = request.qr_payment_id,
            action = ?action,
            "Payment event simulated"
        );
        Ok(())
    }

    // ------------------------------------------------------------------
    // Enhanced refunds
    // ------------------------------------------------------------------

    pub async fn payment_details(
        &self,
        request: PaymentDetailsRequest,
    ) -> Result<PaymentDetails, GatewayError> {
        request.validate()?;
        self.provider.payment_details(&request).await
    }

    pub async fn refund_payment(
        &self,
        request: RefundPaymentRequest,
    ) -> Result<ReturnOperation, GatewayError> {
        request.validate()?;
        let operation = self.provider.refund_payment(&request).await?;

        tracing::info!(
            qr_payment_id = request.qr_payment_id,
            return_operation_id = operation.return_operation_id,
            amount = request.return_amount,
            "Payment refunded"
        );
        Ok(operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::device_store::InMemoryDeviceTokenStore;
    use async_trait::async_trait;
    use kaspi_core::{CapabilityTier, ErrorKind, UpstreamError};
    use std::sync::Mutex;

    /// Provider double that records calls and answers from fixed values.
    #[derive(Default)]
    struct FakeProvider {
        pub calls: Mutex<Vec<&'static str>>,
        pub fail_with: Option<i64>,
    }

    impl FakeProvider {
        pub fn failing(code: i64) -> Self {
            Self {
                fail_with: Some(code),
                ..Default::default()
            }
        }

        pub fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, name: &'static str) -> Result<(), GatewayError> {
            self.calls.lock().unwrap().push(name);
            match self.fail_with {
                Some(code) => Err(UpstreamError::new(code, "provider says no").into()),
                None => Ok(()),
            }
        }
    }

    fn details() -> PaymentDetails {
        PaymentDetails {
            qr_payment_id: 15,
            total_amount: 200.0,
            available_return_amount: 150.0,
            transaction_date: "2024-01-01T12:00:00+06:00".into(),
        }
    }

    #[async_trait]
    impl KaspiProvider for FakeProvider {
        async fn trade_points(
            &self,
            _organization_bin: Option<&str>,
        ) -> Result<Vec<TradePoint>, GatewayError> {
            self.record("trade_points")?;
            Ok(vec![TradePoint {
                trade_point_id: 1,
                trade_point_name: "Shop".into(),
            }])
        }

        async fn register_device(
            &self,
            request: &RegisterDeviceRequest,
        ) -> Result<DeviceRegistration, GatewayError> {
            self.record("register_device")?;
            Ok(DeviceRegistration {
                device_token: format!("token-{}", request.device_id),
            })
        }

        async fn delete_device(&self, _request: &DeleteDeviceRequest) -> Result<(), GatewayError> {
            self.record("delete_device")
        }

        async fn create_qr_token(
            &self,
            _request: &CreatePaymentRequest,
        ) -> Result<QrToken, GatewayError> {
            self.record("create_qr_token")?;
            Ok(QrToken {
                qr_token: "qr".into(),
                expire_date: "2024-01-01T12:00:00+06:00".into(),
                qr_payment_id: 15,
                payment_methods: vec!["Gold".into()],
                behavior_options: crate::dtos::QrPaymentBehaviorOptions {
                    status_polling_interval: 5,
                    qr_code_scan_wait_timeout: 180,
                    payment_confirmation_timeout: 65,
                },
            })
        }

        async fn create_payment_link(
            &self,
            _request: &CreatePaymentRequest,
        ) -> Result<PaymentLink, GatewayError> {
            self.record("create_payment_link")?;
            Ok(PaymentLink {
                payment_link: "https://pay.kaspi.kz/pay/abc".into(),
                expire_date: "2024-01-01T12:00:00+06:00".into(),
                payment_id: 16,
                payment_methods: vec![],
                behavior_options: crate::dtos::PaymentLinkBehaviorOptions {
                    status_polling_interval: 5,
                    link_activation_wait_timeout: 180,
                    payment_confirmation_timeout: 65,
                },
            })
        }

        async fn payment_status(&self, _id: i64) -> Result<PaymentStatus, GatewayError> {
            self.record("payment_status")?;
            Ok(PaymentStatus {
                status: "Wait".into(),
                transaction_id: None,
                loan_offer_name: None,
                loan_term: None,
                is_offer: None,
                product_type: None,
                amount: None,
                store_name: None,
                address: None,
                city: None,
            })
        }

        async fn create_refund_qr_token(
            &self,
            _request: &CreateRefundQrRequest,
        ) -> Result<RefundQrToken, GatewayError> {
            self.record("create_refund_qr_token")?;
            Ok(RefundQrToken {
                qr_token: "rqr".into(),
                expire_date: "2024-01-01T12:00:00+06:00".into(),
                qr_return_id: 30,
                behavior_options: crate::dtos::QrReturnBehaviorOptions {
                    qr_code_scan_event_polling_interval: 5,
                    qr_code_scan_wait_timeout: 180,
                },
            })
        }

        async fn refund_status(&self, _id: i64) -> Result<RefundStatus, GatewayError> {
            self.record("refund_status")?;
            Ok(RefundStatus {
                status: "QrTokenCreated".into(),
            })
        }

        async fn refund_operations(
            &self,
            _request: &RefundOperationsRequest,
        ) -> Result<Vec<RefundOperation>, GatewayError> {
            self.record("refund_operations")?;
            Ok(vec![])
        }

        async fn operation_details(
            &self,
            _request: &OperationDetailsRequest,
        ) -> Result<PaymentDetails, GatewayError> {
            self.record("operation_details")?;
            Ok(details())
        }

        async fn return_payment(
            &self,
            _request: &ReturnPaymentRequest,
        ) -> Result<ReturnOperation, GatewayError> {
            self.record("return_payment")?;
            Ok(ReturnOperation {
                return_operation_id: 99,
            })
        }

        async fn simulate(
            &self,
            _action: SimulationAction,
            _request: &SimulateRequest,
        ) -> Result<(), GatewayError> {
            self.record("simulate")
        }

        async fn payment_details(
            &self,
            _request: &PaymentDetailsRequest,
        ) -> Result<PaymentDetails, GatewayError> {
            self.record("payment_details")?;
            Ok(details())
        }

        async fn refund_payment(
            &self,
            _request: &RefundPaymentRequest,
        ) -> Result<ReturnOperation, GatewayError> {
            self.record("refund_payment")?;
            Ok(ReturnOperation {
                return_operation_id: 100,
            })
        }
    }

    struct Harness {
        gateway: PaymentGateway,
        provider: Arc<FakeProvider>,
        store: Arc<InMemoryDeviceTokenStore>,
    }

    fn harness(tier: CapabilityTier, provider: FakeProvider) -> Harness {
        let provider = Arc::new(provider);
        let store = Arc::new(InMemoryDeviceTokenStore::new());
        let gateway = PaymentGateway::new(provider.clone(), store.clone(), operations::gate(tier));
        Harness {
            gateway,
            provider,
            store,
        }
    }

    fn register(bin: Option<&str>) -> RegisterDeviceRequest {
        RegisterDeviceRequest {
            device_id: "till-1".into(),
            trade_point_id: 7,
            organization_bin: bin.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn register_device_stores_issued_token() {
        let h = harness(CapabilityTier::Basic, FakeProvider::default());
        let registration = h.gateway.register_device(register(None)).await.unwrap();

        assert_eq!(registration.device_token, "token-till-1");
        assert_eq!(h.store.get("till-1").unwrap().device_token, "token-till-1");
    }

    #[tokio::test]
    async fn registering_same_device_twice_conflicts() {
        let h = harness(CapabilityTier::Basic, FakeProvider::default());
        h.gateway.register_device(register(None)).await.unwrap();

        let err = h.gateway.register_device(register(None)).await.unwrap_err();
        assert_eq!(err.outcome().kind, ErrorKind::Conflict);
        assert_eq!(h.provider.calls(), vec!["register_device"]);
        assert_eq!(h.store.get("till-1").unwrap().device_token, "token-till-1");
    }

    #[tokio::test]
    async fn organization_bin_below_enhanced_is_rejected_before_provider() {
        let h = harness(CapabilityTier::Standard, FakeProvider::default());
        let err = h
            .gateway
            .register_device(register(Some("180340021791")))
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::FeatureUnavailable(_)));
        let outcome = err.outcome();
        assert_eq!(outcome.kind, ErrorKind::PermissionDenied);
        assert!(outcome.message.contains("Enhanced"));
        assert!(outcome.message.contains("Standard"));
        assert!(h.provider.calls().is_empty());
        assert!(h.store.is_empty());
    }

    #[tokio::test]
    async fn organization_bin_on_enhanced_reaches_provider() {
        let h = harness(CapabilityTier::Enhanced, FakeProvider::default());
        h.gateway
            .trade_points(TradePointsQuery {
                organization_bin: Some("180340021791".into()),
            })
            .await
            .unwrap();
        assert_eq!(h.provider.calls(), vec!["trade_points"]);
    }

    #[tokio::test]
    async fn invalid_amount_never_reaches_provider() {
        let h = harness(CapabilityTier::Basic, FakeProvider::default());
        let err = h
            .gateway
            .create_qr_token(CreatePaymentRequest {
                device_token: "tok".into(),
                amount: -5.0,
                external_id: None,
            })
            .await
            .unwrap_err();

        let outcome = err.outcome();
        assert_eq!(outcome.kind, ErrorKind::InvalidInput);
        assert_eq!(outcome.message, "Invalid request: amount: must be positive");
        assert!(h.provider.calls().is_empty());
    }

    #[tokio::test]
    async fn upstream_failure_leaves_store_untouched() {
        let h = harness(CapabilityTier::Basic, FakeProvider::failing(-1503));
        let err = h.gateway.register_device(register(None)).await.unwrap_err();

        assert_eq!(err.outcome().kind, ErrorKind::Conflict);
        assert!(h.store.is_empty());
    }

    #[tokio::test]
    async fn delete_device_forgets_token() {
        let h = harness(CapabilityTier::Basic, FakeProvider::default());
        h.gateway.register_device(register(None)).await.unwrap();
        h.gateway
            .delete_device(DeleteDeviceRequest {
                device_token: "token-till-1".into(),
            })
            .await
            .unwrap();

        assert!(h.store.is_empty());
        assert_eq!(h.provider.calls(), vec!["register_device", "delete_device"]);
    }

    #[tokio::test]
    async fn capabilities_list_reachable_operations() {
        let h = harness(CapabilityTier::Standard, FakeProvider::default());
        let capabilities = h.gateway.capabilities();

        assert_eq!(capabilities.tier, CapabilityTier::Standard);
        assert!(capabilities
            .operations
            .iter()
            .any(|op| op == operations::RETURN_PAYMENT));
        assert!(!capabilities
            .operations
            .iter()
            .any(|op| op == operations::REFUND_PAYMENT));
        assert!(h.provider.calls().is_empty());
    }

    #[tokio::test]
    async fn refund_payment_passes_through() {
        let h = harness(CapabilityTier::Enhanced, FakeProvider::default());
        let operation = h
            .gateway
            .refund_payment(RefundPaymentRequest {
                device_token: "tok".into(),
                qr_payment_id: 15,
                return_amount: 50.0,
            })
            .await
            .unwrap();
        assert_eq!(operation.return_operation_id, 100);
    }

    #[tokio::test]
    async fn zero_identifier_is_invalid() {
        let h = harness(CapabilityTier::Basic, FakeProvider::default());
        let err = h
            .gateway
            .payment_status(PaymentStatusRequest { qr_payment_id: 0 })
            .await
            .unwrap_err();
        assert_eq!(err.outcome().kind, ErrorKind::InvalidInput);
        assert!(h.provider.calls().is_empty());
    }
}
