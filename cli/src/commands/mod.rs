//! CLI command implementations.

pub mod health;
pub mod scan;
pub mod services;
pub mod setup;

use colored::Colorize;

/// Abort unless running as root.
///
/// Firewall inspection and mutation both need administrative privileges;
/// this is checked before any work starts.
pub fn require_root(invocation: &str) {
    if is_root::is_root() {
        return;
    }
    eprintln!("{}", "[ERROR] This command must be run as root.".red().bold());
    eprintln!("Try: {}", format!("sudo portmedic {invocation}").yellow());
    std::process::exit(1);
}
