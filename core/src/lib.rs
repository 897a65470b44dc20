//! Portmedic Core Library
//!
//! Library for reconciling listening TCP ports with host firewall state.
//! Provides functionality to:
//! - Probe local and remote TCP ports, and HTTPS endpoints
//! - Classify UFW and iptables state for a specific port
//! - Decide and apply firewall remediation (UFW first, then HestiaCP)
//! - Manage user configuration (service names, bootstrap defaults)
//!
//! # Architecture
//! - `domain`: Pure decision logic and data models
//! - `runner` / `probe`: Trait seams over external commands and sockets
//! - `firewall`: UFW, iptables and HestiaCP integrations
//! - `engine`: The reconciliation engine tying the above together
//!
//! # Platform Support
//! Linux servers running `ufw`/`iptables`. The HestiaCP layer is optional
//! and only used when its CLI is present on disk.

pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod firewall;
pub mod health;
pub mod probe;
pub mod runner;

// Re-export domain types (primary API)
pub use domain::{decide, Action, FixLayer, FixOutcome, IptablesStatus, PortReport, PortSpec, ServiceMap, UfwStatus};

// Re-export other commonly used types
pub use config::{Config, ConfigStore};
pub use engine::{BootstrapReport, Reconciler};
pub use error::{Error, Result};
pub use health::HealthReport;
pub use probe::{HttpProbe, Prober, TcpProber};
pub use runner::{CommandRunner, ShellRunner};
