//! HestiaCP control-panel firewall CLI integration.
//!
//! Optional layer: only invoked when the panel's CLI binaries exist on disk.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::Result;
use crate::runner::CommandRunner;

/// Default HestiaCP CLI directory.
pub const DEFAULT_BIN_DIR: &str = "/usr/local/hestia/bin";

/// TCP port the HestiaCP web panel serves on.
pub const PANEL_PORT: u16 = 8083;

/// Handle on the HestiaCP command-line tools.
#[derive(Debug, Clone)]
pub struct HestiaCli {
    bin_dir: PathBuf,
}

impl HestiaCli {
    /// Create a handle using the default install location.
    pub fn new() -> Self {
        Self {
            bin_dir: PathBuf::from(DEFAULT_BIN_DIR),
        }
    }

    /// Create a handle with a custom CLI directory.
    pub fn with_bin_dir(bin_dir: impl Into<PathBuf>) -> Self {
        Self {
            bin_dir: bin_dir.into(),
        }
    }

    /// The configured CLI directory.
    pub fn bin_dir(&self) -> &Path {
        &self.bin_dir
    }

    /// Whether the panel's firewall CLI is present on this host.
    pub fn is_installed(&self) -> bool {
        self.bin_dir.join("v-add-firewall-rule").exists()
    }

    /// Add an ACCEPT rule for `port/TCP` from anywhere.
    ///
    /// Runs in ignore mode: the rule may already exist and the CLI exits
    /// non-zero for that.
    pub async fn add_rule<R: CommandRunner>(
        &self,
        runner: &R,
        port: u16,
        comment: &str,
    ) -> Result<()> {
        let bin = self.bin_dir.join("v-add-firewall-rule");
        info!(port, comment, "adding HestiaCP firewall rule");
        runner
            .run(
                &format!("{} ACCEPT 0.0.0.0/0 {} TCP '{}'", bin.display(), port, comment),
                true,
            )
            .await?;
        Ok(())
    }

    /// Force the panel to rebuild its firewall chains.
    pub async fn reload<R: CommandRunner>(&self, runner: &R) -> Result<()> {
        let bin = self.bin_dir.join("v-update-firewall");
        runner.run(&bin.display().to_string(), true).await?;
        Ok(())
    }
}

impl Default for HestiaCli {
    fn default() -> Self {
        Self::new()
    }
}
