//! Port specifications and the service-name mapping.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default port-to-service mapping used when no overrides are configured.
pub const DEFAULT_SERVICES: &[(u16, &str)] = &[
    (22, "SSH"),
    (80, "HTTP"),
    (443, "HTTPS"),
    (8083, "HestiaCP"),
    (5432, "PostgreSQL"),
    (3306, "MySQL/MariaDB"),
    (27017, "MongoDB"),
    (6379, "Redis"),
    (8000, "Supabase/API"),
    (8443, "Supabase/Kong"),
    (3000, "React/Node"),
    (8080, "Alt HTTP"),
];

/// A port paired with the service name it is expected to serve.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortSpec {
    /// The port number (1-65535).
    pub port: u16,
    /// Human-readable service name shown in reports.
    pub service: String,
}

impl PortSpec {
    /// Create a new port spec, rejecting port 0.
    pub fn new(port: u16, service: impl Into<String>) -> Result<Self> {
        if port == 0 {
            return Err(Error::Config("port must be in 1-65535".to_string()));
        }
        Ok(Self {
            port,
            service: service.into(),
        })
    }
}

impl std::fmt::Display for PortSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.port, self.service)
    }
}

/// Ordered port-to-service mapping driving a scan batch.
///
/// Ports are unique within the map; inserting an entry for an existing port
/// replaces the earlier one. Iteration is in increasing port order, which is
/// also the scan and remediation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceMap {
    entries: BTreeMap<u16, String>,
}

impl ServiceMap {
    /// Create an empty service map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a service map from the built-in default table.
    pub fn defaults() -> Self {
        let mut map = Self::new();
        for (port, service) in DEFAULT_SERVICES {
            map.entries.insert(*port, (*service).to_string());
        }
        map
    }

    /// Insert an entry, replacing any previous entry for the same port.
    pub fn insert(&mut self, spec: PortSpec) {
        self.entries.insert(spec.port, spec.service);
    }

    /// Look up the service name for a port.
    pub fn get(&self, port: u16) -> Option<&str> {
        self.entries.get(&port).map(String::as_str)
    }

    /// Iterate entries in increasing port order.
    pub fn iter(&self) -> impl Iterator<Item = (u16, &str)> {
        self.entries.iter().map(|(port, service)| (*port, service.as_str()))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
