//! Reconciliation engine: combines listening state and firewall state into
//! per-port action decisions and applies remediation.
//!
//! Evaluation is stateless: every scan recomputes decisions from live system
//! state. Ports are processed one at a time in increasing port order; nothing
//! is cached between runs.

use tracing::{info, warn};

use crate::domain::{FixLayer, FixOutcome, PortReport, ServiceMap};
use crate::error::Result;
use crate::firewall::{self, hestia, HestiaCli};
use crate::probe::Prober;
use crate::runner::CommandRunner;

/// Result of the `ensure-defaults` bootstrap flow.
#[derive(Debug, Clone)]
pub struct BootstrapReport {
    /// Whether UFW had to be enabled from an inactive state.
    pub ufw_was_inactive: bool,
    /// Essential ports whitelisted before enabling enforcement.
    pub essential_ports: Vec<u16>,
    /// Whether the HestiaCP CLI was found and its layer updated.
    pub hestia_present: bool,
    /// iptables rule lines mentioning the panel port, from the verification
    /// pass; empty when nothing matched.
    pub iptables_lines: String,
}

impl BootstrapReport {
    /// Whether the verification pass found the panel port in iptables.
    pub fn iptables_verified(&self) -> bool {
        !self.iptables_lines.is_empty()
    }
}

/// The reconciliation engine.
///
/// Holds the command runner, the prober and the scan batch's service map.
/// The map is passed in at construction so the engine stays independent of
/// any global initialization order.
pub struct Reconciler<R, P> {
    runner: R,
    prober: P,
    services: ServiceMap,
    hestia: HestiaCli,
}

impl<R: CommandRunner, P: Prober> Reconciler<R, P> {
    /// Create an engine over the given runner, prober and service map.
    pub fn new(runner: R, prober: P, services: ServiceMap) -> Self {
        Self {
            runner,
            prober,
            services,
            hestia: HestiaCli::new(),
        }
    }

    /// Override the HestiaCP CLI location.
    pub fn with_hestia(mut self, hestia: HestiaCli) -> Self {
        self.hestia = hestia;
        self
    }

    /// The scan batch's service map.
    pub fn services(&self) -> &ServiceMap {
        &self.services
    }

    /// Scan every port in the service map, in increasing port order.
    pub async fn scan(&self) -> Result<Vec<PortReport>> {
        let mut reports = Vec::with_capacity(self.services.len());

        for (port, service) in self.services.iter() {
            let listening = self.prober.is_listening(port).await;
            let ufw = firewall::ufw::status(&self.runner, port).await?;
            let iptables = firewall::iptables::status(&self.runner, port).await?;
            reports.push(PortReport::new(port, service, listening, ufw, iptables));
        }

        Ok(reports)
    }

    /// Open `port` in each firewall layer, in fixed order with no rollback.
    ///
    /// UFW first; then, when the HestiaCP CLI exists, its rule-add and reload
    /// pair — attempted regardless of the UFW step's outcome. No verification
    /// re-check is performed; the operator re-runs the scan to confirm.
    pub async fn fix_port(&self, port: u16, service: &str) -> Result<Vec<FixOutcome>> {
        let mut outcomes = Vec::new();

        let applied = firewall::ufw::allow(&self.runner, port).await?;
        if applied {
            info!(port, "ufw rule added");
        } else {
            warn!(port, "ufw did not confirm the allow rule");
        }
        outcomes.push(FixOutcome {
            layer: FixLayer::Ufw,
            applied,
        });

        if self.hestia.is_installed() {
            self.hestia.add_rule(&self.runner, port, service).await?;
            self.hestia.reload(&self.runner).await?;
            outcomes.push(FixOutcome {
                layer: FixLayer::Hestia,
                applied: true,
            });
        }

        Ok(outcomes)
    }

    /// Enable UFW with the essential allow-list and sync the panel firewall.
    ///
    /// The bootstrap flow used by `setup`:
    /// 1. When UFW reports inactive, whitelist the essential ports and only
    ///    then enable enforcement; otherwise just ensure the panel port is
    ///    allowed.
    /// 2. When the HestiaCP CLI exists, add its panel-port rule and force a
    ///    firewall rebuild.
    /// 3. Verify by searching iptables for the panel port.
    pub async fn ensure_defaults(&self, essential_ports: &[u16]) -> Result<BootstrapReport> {
        let status = self.runner.run("ufw status", true).await?;
        let ufw_was_inactive = status.contains("inactive");

        if ufw_was_inactive {
            firewall::ufw::enable_with_essentials(&self.runner, essential_ports).await?;
        } else {
            firewall::ufw::allow(&self.runner, hestia::PANEL_PORT).await?;
        }

        let hestia_present = self.hestia.is_installed();
        if hestia_present {
            self.hestia
                .add_rule(&self.runner, hestia::PANEL_PORT, "HestiaCP_Port")
                .await?;
            self.hestia.reload(&self.runner).await?;
        } else {
            warn!("HestiaCP CLI not found, skipping panel firewall layer");
        }

        let iptables_lines =
            firewall::iptables::grep_port(&self.runner, hestia::PANEL_PORT).await?;

        Ok(BootstrapReport {
            ufw_was_inactive,
            essential_ports: essential_ports.to_vec(),
            hestia_present,
            iptables_lines,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use crate::domain::{Action, IptablesStatus, PortSpec, UfwStatus};
    use crate::runner::mock::MockRunner;

    /// Prober with a fixed set of listening ports.
    struct MockProber {
        listening: HashSet<u16>,
    }

    impl MockProber {
        fn new(listening: impl IntoIterator<Item = u16>) -> Self {
            Self {
                listening: listening.into_iter().collect(),
            }
        }
    }

    impl Prober for MockProber {
        async fn is_listening(&self, port: u16) -> bool {
            self.listening.contains(&port)
        }
    }

    fn panel_only_services() -> ServiceMap {
        let mut services = ServiceMap::new();
        services.insert(PortSpec::new(8083, "HestiaCP").unwrap());
        services
    }

    fn absent_hestia() -> (HestiaCli, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        (HestiaCli::with_bin_dir(dir.path()), dir)
    }

    fn present_hestia() -> (HestiaCli, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("v-add-firewall-rule"), "").unwrap();
        (HestiaCli::with_bin_dir(dir.path()), dir)
    }

    #[tokio::test]
    async fn test_scan_not_listening_is_ok() {
        let (hestia, _dir) = absent_hestia();
        let engine = Reconciler::new(MockRunner::new(), MockProber::new([]), panel_only_services())
            .with_hestia(hestia);

        let reports = engine.scan().await.unwrap();
        assert_eq!(reports.len(), 1);
        assert!(!reports[0].listening);
        assert_eq!(reports[0].action, Action::Ok);
        assert!(!reports[0].needs_fix());
    }

    #[tokio::test]
    async fn test_scan_listening_and_allowed_is_ok() {
        let runner = MockRunner::new()
            .with_response("ufw status", "Status: active\n8083/tcp    ALLOW    Anywhere")
            .with_response(
                "iptables -L -n",
                "ACCEPT  tcp  --  0.0.0.0/0  0.0.0.0/0  tcp dpt:8083",
            );
        let (hestia, _dir) = absent_hestia();
        let engine = Reconciler::new(runner, MockProber::new([8083]), panel_only_services())
            .with_hestia(hestia);

        let reports = engine.scan().await.unwrap();
        assert_eq!(reports[0].ufw, UfwStatus::Allowed);
        assert_eq!(reports[0].action, Action::Ok);
    }

    #[tokio::test]
    async fn test_scan_listening_behind_active_ufw_flags_open_port() {
        let runner = MockRunner::new()
            .with_response("ufw status", "Status: active\n22/tcp    ALLOW    Anywhere");
        let (hestia, _dir) = absent_hestia();
        let engine = Reconciler::new(runner, MockProber::new([8083]), panel_only_services())
            .with_hestia(hestia);

        let reports = engine.scan().await.unwrap();
        assert_eq!(reports[0].ufw, UfwStatus::BlockedOrMissing);
        assert_eq!(reports[0].iptables, IptablesStatus::NotFound);
        assert_eq!(reports[0].action, Action::OpenPort);
        assert!(reports[0].needs_fix());
    }

    #[tokio::test]
    async fn test_scan_walks_ports_in_order() {
        let mut services = ServiceMap::new();
        services.insert(PortSpec::new(443, "HTTPS").unwrap());
        services.insert(PortSpec::new(22, "SSH").unwrap());
        let (hestia, _dir) = absent_hestia();
        let engine =
            Reconciler::new(MockRunner::new(), MockProber::new([]), services).with_hestia(hestia);

        let reports = engine.scan().await.unwrap();
        let ports: Vec<u16> = reports.iter().map(|r| r.port).collect();
        assert_eq!(ports, vec![22, 443]);
    }

    #[tokio::test]
    async fn test_fix_port_without_hestia() {
        let runner = MockRunner::new().with_response("ufw allow 8083/tcp", "Rule added");
        let (hestia, _dir) = absent_hestia();
        let engine = Reconciler::new(runner, MockProber::new([]), panel_only_services())
            .with_hestia(hestia);

        let outcomes = engine.fix_port(8083, "HestiaCP").await.unwrap();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].layer, FixLayer::Ufw);
        assert!(outcomes[0].applied);
    }

    #[tokio::test]
    async fn test_fix_port_runs_hestia_pair_after_ufw() {
        let runner = MockRunner::new().with_response("ufw allow 8083/tcp", "Rule added");
        let (hestia, dir) = present_hestia();
        let engine = Reconciler::new(runner, MockProber::new([]), panel_only_services())
            .with_hestia(hestia);

        let outcomes = engine.fix_port(8083, "HestiaCP").await.unwrap();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[1].layer, FixLayer::Hestia);
        assert!(outcomes[1].applied);

        let calls = engine.runner.calls();
        let bin = dir.path().display();
        assert_eq!(
            calls,
            vec![
                "ufw allow 8083/tcp".to_string(),
                format!("{bin}/v-add-firewall-rule ACCEPT 0.0.0.0/0 8083 TCP 'HestiaCP'"),
                format!("{bin}/v-update-firewall"),
            ]
        );
    }

    #[tokio::test]
    async fn test_fix_port_attempts_hestia_even_when_ufw_fails() {
        // No canned response: ufw returns nothing, which is not a
        // confirmation. The panel layer still runs.
        let runner = MockRunner::new();
        let (hestia, _dir) = present_hestia();
        let engine = Reconciler::new(runner, MockProber::new([]), panel_only_services())
            .with_hestia(hestia);

        let outcomes = engine.fix_port(8083, "HestiaCP").await.unwrap();
        assert!(!outcomes[0].applied);
        assert_eq!(outcomes[1].layer, FixLayer::Hestia);
        assert!(outcomes[1].applied);
    }

    #[tokio::test]
    async fn test_ensure_defaults_enables_inactive_ufw_in_safe_order() {
        let runner = MockRunner::new().with_response("ufw status", "Status: inactive");
        let (hestia, _dir) = absent_hestia();
        let engine = Reconciler::new(runner, MockProber::new([]), panel_only_services())
            .with_hestia(hestia);

        let report = engine.ensure_defaults(&[22, 80, 443, 8083]).await.unwrap();
        assert!(report.ufw_was_inactive);
        assert!(!report.hestia_present);
        assert!(!report.iptables_verified());

        let calls = engine.runner.calls();
        assert_eq!(
            calls,
            vec![
                "ufw status",
                "ufw allow 22/tcp",
                "ufw allow 80/tcp",
                "ufw allow 443/tcp",
                "ufw allow 8083/tcp",
                "echo 'y' | ufw enable",
                "iptables -L -n",
            ]
        );
    }

    #[tokio::test]
    async fn test_ensure_defaults_on_active_ufw_only_allows_panel_port() {
        let runner = MockRunner::new()
            .with_response("ufw status", "Status: active")
            .with_response("ufw allow 8083/tcp", "Rule added")
            .with_response(
                "iptables -L -n",
                "ACCEPT  tcp  --  0.0.0.0/0  0.0.0.0/0  tcp dpt:8083",
            );
        let (hestia, _dir) = absent_hestia();
        let engine = Reconciler::new(runner, MockProber::new([]), panel_only_services())
            .with_hestia(hestia);

        let report = engine.ensure_defaults(&[22, 80, 443, 8083]).await.unwrap();
        assert!(!report.ufw_was_inactive);
        assert!(report.iptables_verified());
        assert!(report.iptables_lines.contains("dpt:8083"));

        let calls = engine.runner.calls();
        assert_eq!(
            calls,
            vec!["ufw status", "ufw allow 8083/tcp", "iptables -L -n"]
        );
    }
}
