//! Tiered capability gate.
//!
//! A deployment is configured with a single [`CapabilityTier`]. Every operation
//! the gateway exposes is registered in [`OperationRequirements`] with the
//! minimum tier it needs. The HTTP middleware and the gRPC layer both consult
//! the same [`CapabilityGate`], so the reachable surface is identical on both
//! transports.
//!
//! Operations missing from the table are denied.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Capability level of a deployment. Ordered `Basic < Standard < Enhanced`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityTier {
    Basic,
    Standard,
    Enhanced,
}

impl CapabilityTier {
    pub const ALL: [CapabilityTier; 3] = [
        CapabilityTier::Basic,
        CapabilityTier::Standard,
        CapabilityTier::Enhanced,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CapabilityTier::Basic => "basic",
            CapabilityTier::Standard => "standard",
            CapabilityTier::Enhanced => "enhanced",
        }
    }
}

impl fmt::Display for CapabilityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CapabilityTier::Basic => "Basic",
            CapabilityTier::Standard => "Standard",
            CapabilityTier::Enhanced => "Enhanced",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown capability tier '{0}' (expected basic, standard or enhanced)")]
pub struct ParseTierError(String);

impl FromStr for CapabilityTier {
    type Err = ParseTierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(CapabilityTier::Basic),
            "standard" => Ok(CapabilityTier::Standard),
            "enhanced" => Ok(CapabilityTier::Enhanced),
            _ => Err(ParseTierError(s.to_string())),
        }
    }
}

/// Static mapping from operation identifier to the minimum tier it requires.
#[derive(Debug, Clone, Default)]
pub struct OperationRequirements {
    table: HashMap<&'static str, CapabilityTier>,
}

impl OperationRequirements {
    /// Build the table from `(operation, tier)` pairs.
    ///
    /// A later entry for the same operation replaces an earlier one.
    pub fn from_entries(entries: &[(&'static str, CapabilityTier)]) -> Self {
        Self {
            table: entries.iter().copied().collect(),
        }
    }

    /// Minimum tier for `operation`, or `None` if the operation is unknown.
    pub fn required_tier(&self, operation: &str) -> Option<CapabilityTier> {
        self.table.get(operation).copied()
    }

    /// Whether `operation` may run under `configured`. Unknown operations are denied.
    pub fn is_allowed(&self, operation: &str, configured: CapabilityTier) -> bool {
        self.required_tier(operation)
            .is_some_and(|required| configured >= required)
    }

    pub fn operations(&self) -> impl Iterator<Item = (&'static str, CapabilityTier)> + '_ {
        self.table.iter().map(|(op, tier)| (*op, *tier))
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// Why an operation or feature was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierDenial {
    pub operation: String,
    /// `None` when the operation is not registered at all.
    pub required: Option<CapabilityTier>,
    pub configured: CapabilityTier,
}

impl fmt::Display for TierDenial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.required {
            Some(required) => write!(
                f,
                "Operation {} requires the {} tier; configured tier is {}",
                self.operation, required, self.configured
            ),
            None => write!(
                f,
                "Operation {} is not available; configured tier is {}",
                self.operation, self.configured
            ),
        }
    }
}

/// The configured tier bound to the requirements table.
///
/// Cheap to clone; the table is shared.
#[derive(Debug, Clone)]
pub struct CapabilityGate {
    requirements: Arc<OperationRequirements>,
    tier: CapabilityTier,
}

impl CapabilityGate {
    pub fn new(requirements: OperationRequirements, tier: CapabilityTier) -> Self {
        Self {
            requirements: Arc::new(requirements),
            tier,
        }
    }

    pub fn tier(&self) -> CapabilityTier {
        self.tier
    }

    pub fn requirements(&self) -> &OperationRequirements {
        &self.requirements
    }

    pub fn is_allowed(&self, operation: &str) -> bool {
        self.requirements.is_allowed(operation, self.tier)
    }

    /// Admit or reject `operation` under the configured tier.
    pub fn check(&self, operation: &str) -> Result<(), TierDenial> {
        if self.is_allowed(operation) {
            return Ok(());
        }

        Err(TierDenial {
            operation: operation.to_string(),
            required: self.requirements.required_tier(operation),
            configured: self.tier,
        })
    }

    /// Operations reachable under the configured tier, sorted.
    pub fn allowed_operations(&self) -> Vec<&'static str> {
        let mut allowed: Vec<&'static str> = self
            .requirements
            .operations()
            .filter(|(_, required)| self.tier >= *required)
            .map(|(op, _)| op)
            .collect();
        allowed.sort_unstable();
        allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC_OP: &str = "test.v1.Service/Basic";
    const STANDARD_OP: &str = "test.v1.Service/Standard";
    const ENHANCED_OP: &str = "test.v1.Service/Enhanced";

    fn requirements() -> OperationRequirements {
        OperationRequirements::from_entries(&[
            (BASIC_OP, CapabilityTier::Basic),
            (STANDARD_OP, CapabilityTier::Standard),
            (ENHANCED_OP, CapabilityTier::Enhanced),
        ])
    }

    #[test]
    fn tiers_are_ordered() {
        assert!(CapabilityTier::Basic < CapabilityTier::Standard);
        assert!(CapabilityTier::Standard < CapabilityTier::Enhanced);
    }

    #[test]
    fn is_allowed_follows_tier_ordering() {
        let table = requirements();
        for configured in CapabilityTier::ALL {
            for (op, required) in [
                (BASIC_OP, CapabilityTier::Basic),
                (STANDARD_OP, CapabilityTier::Standard),
                (ENHANCED_OP, CapabilityTier::Enhanced),
            ] {
                assert_eq!(
                    table.is_allowed(op, configured),
                    configured >= required,
                    "{op} under {configured}"
                );
            }
        }
    }

    #[test]
    fn standard_operation_denied_under_basic() {
        let table = requirements();
        assert!(!table.is_allowed(STANDARD_OP, CapabilityTier::Basic));
        assert!(table.is_allowed(STANDARD_OP, CapabilityTier::Standard));
        assert!(table.is_allowed(STANDARD_OP, CapabilityTier::Enhanced));
    }

    #[test]
    fn unknown_operation_is_denied_at_every_tier() {
        let table = requirements();
        for tier in CapabilityTier::ALL {
            assert!(!table.is_allowed("test.v1.Service/Missing", tier));
        }
    }

    #[test]
    fn check_reports_required_and_configured_tier() {
        let gate = CapabilityGate::new(requirements(), CapabilityTier::Basic);
        let denial = gate.check(ENHANCED_OP).unwrap_err();

        assert_eq!(denial.required, Some(CapabilityTier::Enhanced));
        assert_eq!(denial.configured, CapabilityTier::Basic);
        assert_eq!(
            denial.to_string(),
            "Operation test.v1.Service/Enhanced requires the Enhanced tier; configured tier is Basic"
        );
    }

    #[test]
    fn check_on_unknown_operation_has_no_required_tier() {
        let gate = CapabilityGate::new(requirements(), CapabilityTier::Enhanced);
        let denial = gate.check("nope").unwrap_err();
        assert_eq!(denial.required, None);
        assert!(denial.to_string().contains("nope"));
    }

    #[test]
    fn allowed_operations_are_sorted_and_filtered() {
        let gate = CapabilityGate::new(requirements(), CapabilityTier::Standard);
        assert_eq!(gate.allowed_operations(), vec![BASIC_OP, STANDARD_OP]);
    }

    #[test]
    fn tier_parses_case_insensitively() {
        assert_eq!("Enhanced".parse::<CapabilityTier>().unwrap(), CapabilityTier::Enhanced);
        assert_eq!(" basic ".parse::<CapabilityTier>().unwrap(), CapabilityTier::Basic);
        assert!("gold".parse::<CapabilityTier>().is_err());
    }
}
