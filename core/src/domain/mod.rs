//! Domain layer - Pure business logic and data models.
//!
//! This module contains the types that represent scan state and the
//! reconciliation decision. These types have no I/O dependencies and can be
//! tested in isolation.

mod port;
mod status;

// Re-export all domain types
pub use port::{PortSpec, ServiceMap, DEFAULT_SERVICES};
pub use status::{
    decide, Action, FixLayer, FixOutcome, IptablesStatus, PortReport, UfwStatus,
};
