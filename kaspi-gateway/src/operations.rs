//! Operation identifiers and the tier each one requires.
//!
//! Identifiers are the fully-qualified gRPC method names, so the gRPC layer
//! can look them up straight from the request path. HTTP routes reference
//! the same constants. Entries with a `#` suffix are optional request
//! features checked by the gateway service, not by a transport.

use kaspi_core::{CapabilityGate, CapabilityTier, OperationRequirements};

pub const PACKAGE: &str = "kaspi.gateway.v1";

pub const GET_TRADE_POINTS: &str = "kaspi.gateway.v1.DeviceService/GetTradePoints";
pub const REGISTER_DEVICE: &str = "kaspi.gateway.v1.DeviceService/RegisterDevice";
pub const DELETE_DEVICE: &str = "kaspi.gateway.v1.DeviceService/DeleteDevice";

pub const CREATE_QR_TOKEN: &str = "kaspi.gateway.v1.PaymentService/CreateQrToken";
pub const CREATE_PAYMENT_LINK: &str = "kaspi.gateway.v1.PaymentService/CreatePaymentLink";
pub const GET_PAYMENT_STATUS: &str = "kaspi.gateway.v1.PaymentService/GetPaymentStatus";

pub const CREATE_REFUND_QR_TOKEN: &str = "kaspi.gateway.v1.RefundService/CreateRefundQrToken";
pub const GET_REFUND_STATUS: &str = "kaspi.gateway.v1.RefundService/GetRefundStatus";
pub const LIST_REFUND_OPERATIONS: &str = "kaspi.gateway.v1.RefundService/ListRefundOperations";
pub const GET_OPERATION_DETAILS: &str = "kaspi.gateway.v1.RefundService/GetOperationDetails";
pub const RETURN_PAYMENT: &str = "kaspi.gateway.v1.RefundService/ReturnPayment";

pub const GET_CAPABILITIES: &str = "kaspi.gateway.v1.UtilityService/GetCapabilities";
pub const SIMULATE_SCAN: &str = "kaspi.gateway.v1.UtilityService/SimulateScan";
pub const SIMULATE_CONFIRM: &str = "kaspi.gateway.v1.UtilityService/SimulateConfirm";
pub const SIMULATE_SCAN_ERROR: &str = "kaspi.gateway.v1.UtilityService/SimulateScanError";
pub const SIMULATE_CONFIRM_ERROR: &str = "kaspi.gateway.v1.UtilityService/SimulateConfirmError";

pub const GET_PAYMENT_DETAILS: &str = "kaspi.gateway.v1.EnhancedRefundService/GetPaymentDetails";
pub const REFUND_PAYMENT: &str = "kaspi.gateway.v1.EnhancedRefundService/RefundPayment";

/// Trade point lookup scoped to an organization BIN.
pub const TRADE_POINTS_BY_ORGANIZATION: &str =
    "kaspi.gateway.v1.DeviceService/GetTradePoints#organization_bin";
/// Device registration under an explicit organization BIN.
pub const REGISTER_DEVICE_FOR_ORGANIZATION: &str =
    "kaspi.gateway.v1.DeviceService/RegisterDevice#organization_bin";

pub const REQUIREMENTS: &[(&str, CapabilityTier)] = &[
    (GET_TRADE_POINTS, CapabilityTier::Basic),
    (REGISTER_DEVICE, CapabilityTier::Basic),
    (DELETE_DEVICE, CapabilityTier::Basic),
    (CREATE_QR_TOKEN, CapabilityTier::Basic),
    (CREATE_PAYMENT_LINK, CapabilityTier::Basic),
    (GET_PAYMENT_STATUS, CapabilityTier::Basic),
    (CREATE_REFUND_QR_TOKEN, CapabilityTier::Standard),
    (GET_REFUND_STATUS, CapabilityTier::Standard),
    (LIST_REFUND_OPERATIONS, CapabilityTier::Standard),
    (GET_OPERATION_DETAILS, CapabilityTier::Standard),
    (RETURN_PAYMENT, CapabilityTier::Standard),
    (GET_CAPABILITIES, CapabilityTier::Basic),
    (SIMULATE_SCAN, CapabilityTier::Basic),
    (SIMULATE_CONFIRM, CapabilityTier::Basic),
    (SIMULATE_SCAN_ERROR, CapabilityTier::Basic),
    (SIMULATE_CONFIRM_ERROR, CapabilityTier::Basic),
    (GET_PAYMENT_DETAILS, CapabilityTier::Enhanced),
    (REFUND_PAYMENT, CapabilityTier::Enhanced),
    (TRADE_POINTS_BY_ORGANIZATION, CapabilityTier::Enhanced),
    (REGISTER_DEVICE_FOR_ORGANIZATION, CapabilityTier::Enhanced),
];

pub fn requirements() -> OperationRequirements {
    OperationRequirements::from_entries(REQUIREMENTS)
}

/// The gate for a deployment running at `tier`.
pub fn gate(tier: CapabilityTier) -> CapabilityGate {
    CapabilityGate::new(requirements(), tier)
}

/// Whether `operation` names an optional feature rather than an RPC.
pub fn is_feature(operation: &str) -> bool {
    operation.contains('#')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_has_no_duplicates() {
        assert_eq!(requirements().len(), REQUIREMENTS.len());
    }

    #[test]
    fn every_identifier_is_in_the_gateway_package() {
        for (operation, _) in REQUIREMENTS {
            assert!(
                operation.starts_with("kaspi.gateway.v1."),
                "{operation} is outside the package"
            );
        }
    }

    #[test]
    fn features_never_require_less_than_their_operation() {
        let table = requirements();
        for (operation, tier) in REQUIREMENTS.iter().filter(|(op, _)| is_feature(op)) {
            let base = operation.split('#').next().unwrap_or_default();
            let base_tier = table.required_tier(base).expect("feature without operation");
            assert!(*tier >= base_tier, "{operation}");
        }
    }

    #[test]
    fn basic_tier_exposes_no_refunds() {
        let gate = gate(CapabilityTier::Basic);
        assert!(gate.is_allowed(CREATE_QR_TOKEN));
        assert!(!gate.is_allowed(RETURN_PAYMENT));
        assert!(!gate.is_allowed(REFUND_PAYMENT));
        assert!(!gate.is_allowed(TRADE_POINTS_BY_ORGANIZATION));
    }

    #[test]
    fn standard_tier_adds_qr_refunds_only() {
        let gate = gate(CapabilityTier::Standard);
        assert!(gate.is_allowed(RETURN_PAYMENT));
        assert!(!gate.is_allowed(GET_PAYMENT_DETAILS));
    }
}
