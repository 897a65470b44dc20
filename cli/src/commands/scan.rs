//! Scan command - reconcile ports against firewall state.

use anyhow::Result;
use colored::Colorize;
use portmedic_core::{
    Action, ConfigStore, IptablesStatus, PortReport, PortSpec, Reconciler, ShellRunner, TcpProber,
    UfwStatus,
};

pub async fn run(extra_port: Option<u16>, fix: bool, json: bool) -> Result<()> {
    super::require_root(&invocation_hint(extra_port, fix));

    let store = ConfigStore::new()?;
    let config = store.load().await?;

    let mut services = config.service_map()?;
    if let Some(port) = extra_port {
        services.insert(PortSpec::new(port, "Custom Port")?);
    }

    let reconciler = Reconciler::new(ShellRunner::new(), TcpProber::new(), services)
        .with_hestia(config.hestia_cli());

    if !json {
        println!("{}", "Scanning ports and firewall rules...".green().bold());
    }
    let reports = reconciler.scan().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    render_table(&reports);

    let to_fix: Vec<&PortReport> = reports.iter().filter(|r| r.needs_fix()).collect();
    if to_fix.is_empty() {
        return Ok(());
    }

    if fix {
        println!("\n{}", "Applying fixes...".bold());
        for report in &to_fix {
            println!(
                "{}",
                format!(
                    "Attempting to allow port {} ({})...",
                    report.port, report.service
                )
                .yellow()
            );
            let outcomes = reconciler.fix_port(report.port, &report.service).await?;
            for outcome in outcomes {
                if outcome.applied {
                    println!(
                        "{}",
                        format!("✔ {} rule added for {}.", outcome.layer, report.port).green()
                    );
                } else {
                    println!(
                        "{}",
                        format!("✘ Failed to add {} rule for {}.", outcome.layer, report.port)
                            .red()
                    );
                }
            }
        }
        println!(
            "\n{}",
            "Fixes applied. Re-run the scan to verify.".green().bold()
        );
    } else {
        println!(
            "\n{}",
            "To automatically open blocked ports, run:".yellow().bold()
        );
        match extra_port {
            Some(port) => println!("  sudo portmedic scan --port {port} --fix"),
            None => println!("  sudo portmedic scan --fix"),
        }
    }

    Ok(())
}

fn invocation_hint(extra_port: Option<u16>, fix: bool) -> String {
    let mut hint = String::from("scan");
    if let Some(port) = extra_port {
        hint.push_str(&format!(" --port {port}"));
    }
    if fix {
        hint.push_str(" --fix");
    }
    hint
}

fn render_table(reports: &[PortReport]) {
    println!(
        "{:<7} {:<16} {:<11} {:<16} {:<10} ACTION",
        "PORT", "SERVICE", "LISTENING", "UFW", "IPTABLES"
    );
    println!("{}", "-".repeat(72));

    for report in reports {
        // Pad before coloring: ANSI escapes break width formatting.
        let listening = if report.listening {
            format!("{:<11}", "Yes").green()
        } else {
            format!("{:<11}", "No").dimmed()
        };
        let ufw = match report.ufw {
            UfwStatus::Allowed => format!("{:<16}", report.ufw.display_name()).green(),
            UfwStatus::Inactive => format!("{:<16}", report.ufw.display_name()).dimmed(),
            UfwStatus::BlockedOrMissing => format!("{:<16}", report.ufw.display_name()).red(),
        };
        let iptables = match report.iptables {
            IptablesStatus::Found => format!("{:<10}", report.iptables.display_name()).green(),
            IptablesStatus::NotFound => format!("{:<10}", report.iptables.display_name()).dimmed(),
        };
        let action = match report.action {
            Action::Ok => report.action.to_string().green(),
            Action::OpenPort | Action::CheckRules => report.action.to_string().red().bold(),
        };

        let service = truncate(&report.service, 16);
        println!(
            "{:<7} {:<16} {listening} {ufw} {iptables} {action}",
            report.port, service
        );
    }

    println!("\nTotal: {} ports", reports.len());
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        format!("{}…", &s[..max - 1])
    }
}
