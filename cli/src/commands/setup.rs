//! Setup command - enable UFW with safe defaults and sync HestiaCP.

use anyhow::Result;
use colored::Colorize;
use portmedic_core::{ConfigStore, Reconciler, ShellRunner, TcpProber};

pub async fn run() -> Result<()> {
    super::require_root("setup");

    let store = ConfigStore::new()?;
    let config = store.load().await?;

    let reconciler = Reconciler::new(ShellRunner::new(), TcpProber::new(), config.service_map()?)
        .with_hestia(config.hestia_cli());

    println!("\n--- Checking UFW (Uncomplicated Firewall) ---");
    let report = reconciler.ensure_defaults(&config.essential_ports).await?;

    if report.ufw_was_inactive {
        let ports = report
            .essential_ports
            .iter()
            .map(u16::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "{}",
            format!("[SUCCESS] UFW enabled and ports {ports} allowed.").green()
        );
    } else {
        println!("{}", "[SUCCESS] UFW is active; panel port rule updated.".green());
    }

    println!("\n--- Checking HestiaCP Firewall ---");
    if report.hestia_present {
        println!("{}", "[SUCCESS] HestiaCP firewall rules updated.".green());
    } else {
        println!(
            "{}",
            "[WARN] HestiaCP CLI not found. Is Hestia installed?".yellow()
        );
    }

    println!("\n--- Verifying iptables ---");
    if report.iptables_verified() {
        println!("{}", "[SUCCESS] Panel port found in iptables rules:".green());
        println!("{}", report.iptables_lines);
    } else {
        println!(
            "{}",
            "[WARN] Panel port NOT found in iptables! Something might still be blocking it."
                .yellow()
        );
    }

    println!("\n[DONE] Firewall configuration attempt complete.");
    println!(
        "NOTE: If the port is still unreachable, the issue is likely your cloud provider's external firewall."
    );

    Ok(())
}
