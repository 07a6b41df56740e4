use kaspi_core::CapabilityTier;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Capabilities {
    pub tier: CapabilityTier,
    pub operations: Vec<String>,
}

/// Sandbox-only transitions of a pending QR payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationAction {
    Scan,
    Confirm,
    ScanError,
    ConfirmError,
}

impl SimulationAction {
    /// Provider path for this transition.
    pub fn path(&self) -> &'static str {
        match self {
            SimulationAction::Scan => "test/payment/scan",
            SimulationAction::Confirm => "test/payment/confirm",
            SimulationAction::ScanError => "test/payment/scanerror",
            SimulationAction::ConfirmError => "test/payment/confirmerror",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all(deserialize = "snake_case", serialize = "PascalCase"))]
pub struct SimulateRequest {
    #[validate(range(min = 1, message = "must be positive"))]
    pub qr_payment_id: i64,
}
