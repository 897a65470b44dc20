//! Firewall layer inspection and remediation.
//!
//! Three layers are consulted, in decreasing order of automation confidence:
//! UFW (classified three ways and safe to auto-fix), iptables (two-way
//! presence check, review-only), and the optional HestiaCP control panel CLI.

pub mod hestia;
pub mod iptables;
pub mod ufw;

pub use hestia::HestiaCli;
