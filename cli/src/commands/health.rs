//! Health command - probe the control panel port and HTTPS endpoint.

use anyhow::Result;
use colored::Colorize;
use portmedic_core::{health, HttpProbe};

/// Run the health check. Returns whether the service is fully healthy;
/// the caller turns that into the process exit code.
pub async fn run(host: &str, port: u16, json: bool) -> Result<bool> {
    let report = health::check(host, port).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(report.is_healthy());
    }

    println!("Checking control panel status on {host}...");

    if report.port_open {
        println!(
            "{}",
            format!("[OK] Port {port} on {host} is OPEN.").green()
        );
    } else {
        println!(
            "{}",
            format!("[FAIL] Port {port} on {host} is CLOSED or unreachable.").red()
        );
        println!(
            "\n{}",
            format!("[!] CRITICAL: port {port} is not open. The service might be down.")
                .red()
                .bold()
        );
        return Ok(false);
    }

    println!("Checking HTTP response from {}...", report.url);
    match &report.http {
        Some(HttpProbe::Ok { status }) => {
            println!(
                "{}",
                format!("[OK] Service at {} is responding (HTTP {status}).", report.url).green()
            );
        }
        Some(HttpProbe::ErrorStatus { status }) => {
            // An auth or server error still means the panel answered.
            println!(
                "{}",
                format!("[WARN] HTTP error for {}: {status}.", report.url).yellow()
            );
        }
        Some(HttpProbe::Unreachable { reason }) => {
            println!(
                "{}",
                format!("[FAIL] Failed to reach {}. Reason: {reason}", report.url).red()
            );
        }
        None => {}
    }

    if report.is_healthy() {
        println!(
            "\n{}",
            "[SUCCESS] Control panel appears to be running correctly."
                .green()
                .bold()
        );
    } else {
        println!(
            "\n{}",
            "[!] WARNING: Port is open but the HTTP check failed."
                .yellow()
                .bold()
        );
    }

    Ok(report.is_healthy())
}
