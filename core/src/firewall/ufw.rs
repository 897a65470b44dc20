//! UFW status classification and rule management.

use tracing::info;

use crate::domain::UfwStatus;
use crate::error::Result;
use crate::runner::CommandRunner;

/// Classify UFW state for a port from `ufw status` output.
///
/// The allow check is a substring heuristic, not a structured parse: the port
/// number co-occurring anywhere with an "ALLOW" marker counts as allowed.
/// Kept as-is for compatibility; it can false-positive when the port number
/// appears inside an unrelated address or a larger port number.
pub async fn status<R: CommandRunner>(runner: &R, port: u16) -> Result<UfwStatus> {
    let output = runner.run("ufw status", true).await?;

    if output.contains("Status: inactive") {
        return Ok(UfwStatus::Inactive);
    }
    if output.contains(&port.to_string()) && output.contains("ALLOW") {
        return Ok(UfwStatus::Allowed);
    }
    Ok(UfwStatus::BlockedOrMissing)
}

/// Add an allow rule for `port/tcp`.
///
/// UFW acknowledges with "Rule added", or "Skipping" when the rule already
/// exists; both count as applied.
pub async fn allow<R: CommandRunner>(runner: &R, port: u16) -> Result<bool> {
    let output = runner.run(&format!("ufw allow {port}/tcp"), true).await?;
    Ok(output.contains("Rule added") || output.contains("Skipping"))
}

/// Enable UFW after whitelisting the essential ports.
///
/// The allow rules MUST be installed before the enable command runs:
/// enabling enforcement first risks locking the operator out of SSH.
pub async fn enable_with_essentials<R: CommandRunner>(runner: &R, ports: &[u16]) -> Result<()> {
    for port in ports {
        runner.run(&format!("ufw allow {port}/tcp"), true).await?;
    }
    info!(?ports, "enabling ufw with essential ports allowed");
    runner.run("echo 'y' | ufw enable", true).await?;
    Ok(())
}
