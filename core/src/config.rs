//! Configuration management for service names and bootstrap defaults.
//!
//! Stores configuration in JSON format at `~/.portmedic/config.json`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::domain::{PortSpec, ServiceMap};
use crate::error::{Error, Result};
use crate::firewall::{hestia, HestiaCli};

/// Configuration data stored in JSON format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// User-supplied service entries overlaid on the default table.
    #[serde(default)]
    pub custom_services: Vec<ServiceEntry>,

    /// Ports whitelisted before UFW enforcement is enabled.
    #[serde(default = "default_essential_ports")]
    pub essential_ports: Vec<u16>,

    /// Override for the HestiaCP CLI directory.
    #[serde(default)]
    pub hestia_bin_dir: Option<PathBuf>,
}

fn default_essential_ports() -> Vec<u16> {
    vec![22, 80, 443, hestia::PANEL_PORT]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            custom_services: Vec::new(),
            essential_ports: default_essential_ports(),
            hestia_bin_dir: None,
        }
    }
}

impl Config {
    /// The default table overlaid with the custom entries.
    ///
    /// Custom entries win per port; entries later in the list win over
    /// earlier ones sharing a port.
    pub fn service_map(&self) -> Result<ServiceMap> {
        let mut map = ServiceMap::defaults();
        for entry in &self.custom_services {
            map.insert(PortSpec::new(entry.port, entry.name.as_str())?);
        }
        Ok(map)
    }

    /// HestiaCP CLI handle honoring the configured directory override.
    pub fn hestia_cli(&self) -> HestiaCli {
        match &self.hestia_bin_dir {
            Some(dir) => HestiaCli::with_bin_dir(dir),
            None => HestiaCli::new(),
        }
    }
}

/// A configured port-to-service-name entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEntry {
    /// Port number.
    pub port: u16,
    /// Service name shown in the scan table.
    pub name: String,
}

/// Configuration store for persisted settings.
///
/// Handles reading and writing configuration to `~/.portmedic/config.json`.
pub struct ConfigStore {
    /// Path to the configuration file.
    config_path: PathBuf,
}

impl ConfigStore {
    /// Create a new config store with the default path.
    ///
    /// Default path: `~/.portmedic/config.json`
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;

        let config_dir = home.join(".portmedic");
        let config_path = config_dir.join("config.json");

        Ok(Self { config_path })
    }

    /// Create a config store with a custom path (for testing).
    pub fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> PathBuf {
        self.config_path.parent().unwrap().to_path_buf()
    }

    /// Load configuration from disk.
    ///
    /// Returns default config if the file doesn't exist.
    pub async fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&self.config_path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist. Writes atomically
    /// by writing to a temp file then renaming.
    pub async fn save(&self, config: &Config) -> Result<()> {
        let config_dir = self.config_dir();
        if !config_dir.exists() {
            fs::create_dir_all(&config_dir).await?;
        }

        let content = serde_json::to_string_pretty(config)?;

        let temp_path = self.config_path.with_extension("json.tmp");

        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(content.as_bytes()).await?;
        file.sync_all().await?;

        fs::rename(&temp_path, &self.config_path).await?;

        Ok(())
    }

    /// Add or replace the custom service entry for a port.
    pub async fn add_service(&self, port: u16, name: &str) -> Result<()> {
        // Validates the port range before anything is written.
        let spec = PortSpec::new(port, name)?;

        let mut config = self.load().await?;
        config.custom_services.retain(|entry| entry.port != port);
        config.custom_services.push(ServiceEntry {
            port: spec.port,
            name: spec.service,
        });
        self.save(&config).await
    }

    /// Remove the custom service entry for a port.
    ///
    /// Returns whether an entry was removed.
    pub async fn remove_service(&self, port: u16) -> Result<bool> {
        let mut config = self.load().await?;
        let before = config.custom_services.len();
        config.custom_services.retain(|entry| entry.port != port);
        let removed = config.custom_services.len() != before;
        if removed {
            self.save(&config).await?;
        }
        Ok(removed)
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new().expect("Failed to create config store")
    }
}
