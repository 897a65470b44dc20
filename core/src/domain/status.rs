//! Firewall status classification and the reconciliation decision.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Firewall status enums
// ============================================================================

/// UFW classification for a single port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UfwStatus {
    /// UFW is not enforcing at all. Distinct from `Allowed`: nothing is
    /// blocked, but nothing is explicitly permitted either.
    Inactive,
    /// An allow rule mentioning the port is present.
    Allowed,
    /// UFW is active and no allow rule for the port was found.
    BlockedOrMissing,
}

impl UfwStatus {
    /// Display label matching the scan table.
    pub fn display_name(&self) -> &'static str {
        match self {
            UfwStatus::Inactive => "Inactive",
            UfwStatus::Allowed => "Allowed",
            UfwStatus::BlockedOrMissing => "Blocked/Missing",
        }
    }
}

impl std::fmt::Display for UfwStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// iptables classification for a single port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IptablesStatus {
    /// A rule mentioning the port as destination was found.
    Found,
    /// No destination-port match in the rule listing.
    NotFound,
}

impl IptablesStatus {
    /// Display label matching the scan table.
    pub fn display_name(&self) -> &'static str {
        match self {
            IptablesStatus::Found => "Found",
            IptablesStatus::NotFound => "Not Found",
        }
    }
}

impl std::fmt::Display for IptablesStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Action decision
// ============================================================================

/// Remediation decision for a scanned port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    /// Nothing to do.
    Ok,
    /// A listening service is blocked by UFW; safe to open automatically.
    OpenPort,
    /// Ambiguous firewall state; flagged for human review instead of
    /// automatic remediation.
    CheckRules,
}

impl Action {
    /// Display label matching the scan table.
    pub fn display_name(&self) -> &'static str {
        match self {
            Action::Ok => "OK",
            Action::OpenPort => "Open Port",
            Action::CheckRules => "Check Rules",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Decide the remediation action for a port.
///
/// Pure function of the observed state; recomputed every run so successive
/// scans always reflect live system state. Only the UFW-blocking case is
/// auto-fixable; non-UFW ambiguity is surfaced for review.
pub fn decide(listening: bool, ufw: UfwStatus, iptables: IptablesStatus) -> Action {
    if !listening {
        return Action::Ok;
    }
    if ufw == UfwStatus::BlockedOrMissing {
        return Action::OpenPort;
    }
    if iptables == IptablesStatus::NotFound && ufw != UfwStatus::Allowed {
        return Action::CheckRules;
    }
    Action::Ok
}

// ============================================================================
// PortReport
// ============================================================================

/// One row of a scan report: observed state plus the derived action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortReport {
    /// Unique identifier for this report row.
    pub id: Uuid,
    /// The scanned port.
    pub port: u16,
    /// Service name from the scan batch's service map.
    pub service: String,
    /// Whether a local socket connect to the port succeeded.
    pub listening: bool,
    /// UFW classification.
    pub ufw: UfwStatus,
    /// iptables classification.
    pub iptables: IptablesStatus,
    /// Derived remediation decision.
    pub action: Action,
}

impl PortReport {
    /// Build a report row, deriving the action from the observed state.
    pub fn new(
        port: u16,
        service: impl Into<String>,
        listening: bool,
        ufw: UfwStatus,
        iptables: IptablesStatus,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            port,
            service: service.into(),
            listening,
            ufw,
            iptables,
            action: decide(listening, ufw, iptables),
        }
    }

    /// Whether this port is in the auto-fix batch.
    pub fn needs_fix(&self) -> bool {
        self.action == Action::OpenPort
    }
}

// ============================================================================
// Fix outcomes
// ============================================================================

/// Firewall layer a fix step targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FixLayer {
    Ufw,
    Hestia,
}

impl std::fmt::Display for FixLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FixLayer::Ufw => write!(f, "UFW"),
            FixLayer::Hestia => write!(f, "HestiaCP"),
        }
    }
}

/// Result of a single fix step. Printed and discarded, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixOutcome {
    /// The firewall layer that was touched.
    pub layer: FixLayer,
    /// Whether the layer confirmed the rule.
    pub applied: bool,
}

// ============================================================================
// Tests
// ============================================================================
