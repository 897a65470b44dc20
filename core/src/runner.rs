//! Shell command execution with caller-selectable error handling.
//!
//! Firewall tools return non-zero for "no matching rule", which is a valid
//! negative result rather than a fault. Callers pick per invocation whether a
//! non-zero exit is swallowed (ignore mode) or surfaced (strict mode).

use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::error::{Error, Result};

/// Port for running external commands.
///
/// Implementations capture trimmed standard output. With `ignore_errors`,
/// a non-zero exit returns an empty string instead of an error; callers must
/// treat the empty string as "no information", not as a failure.
pub trait CommandRunner: Send + Sync {
    /// Run `command` through a shell and return its trimmed stdout.
    fn run(
        &self,
        command: &str,
        ignore_errors: bool,
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

/// Command runner backed by `/bin/sh -c`.
///
/// No timeout is applied to the subprocess; a hung external command blocks
/// the whole scan. Only socket and HTTP probes carry timeouts.
#[derive(Debug, Clone, Copy)]
pub struct ShellRunner;

impl ShellRunner {
    /// Create a new shell runner.
    pub fn new() -> Self {
        Self
    }
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for ShellRunner {
    async fn run(&self, command: &str, ignore_errors: bool) -> Result<String> {
        debug!(command, ignore_errors, "running shell command");

        let output = Command::new("/bin/sh")
            .args(["-c", command])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            if ignore_errors {
                return Ok(String::new());
            }
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(Error::CommandFailed {
                command: command.to_string(),
                stderr,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::CommandRunner;
    use crate::error::Result;

    /// Scripted runner for tests: canned outputs keyed by the exact command
    /// line, plus a record of every call in order. Unknown commands return
    /// the empty string, like an ignore-mode failure.
    pub struct MockRunner {
        responses: HashMap<String, String>,
        calls: Mutex<Vec<String>>,
    }

    impl MockRunner {
        pub fn new() -> Self {
            Self {
                responses: HashMap::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn with_response(mut self, command: &str, output: &str) -> Self {
            self.responses.insert(command.to_string(), output.to_string());
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl CommandRunner for MockRunner {
        async fn run(&self, command: &str, _ignore_errors: bool) -> Result<String> {
            self.calls.lock().unwrap().push(command.to_string());
            Ok(self.responses.get(command).cloned().unwrap_or_default())
        }
    }
}
