//! TCP and HTTP reachability probes.
//!
//! Probes collapse every failure mode into a negative result: whether nothing
//! is listening or the network itself is broken, the remediation guidance is
//! the same. Probes carry explicit timeouts; external commands do not.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

/// Timeout for local listen checks against loopback.
pub const LOCAL_PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// Port for local listening-state checks.
pub trait Prober: Send + Sync {
    /// Whether a local socket connect to `127.0.0.1:port` succeeds.
    fn is_listening(&self, port: u16) -> impl std::future::Future<Output = bool> + Send;
}

/// Prober backed by real TCP connects to loopback.
#[derive(Debug, Clone, Copy)]
pub struct TcpProber;

impl TcpProber {
    /// Create a new TCP prober.
    pub fn new() -> Self {
        Self
    }
}

impl Default for TcpProber {
    fn default() -> Self {
        Self::new()
    }
}

impl Prober for TcpProber {
    async fn is_listening(&self, port: u16) -> bool {
        check_port("127.0.0.1", port, LOCAL_PROBE_TIMEOUT).await
    }
}

/// Check whether `host:port` accepts a TCP connection within `limit`.
///
/// Timeout, refusal and OS-level errors are all reported as `false`.
pub async fn check_port(host: &str, port: u16, limit: Duration) -> bool {
    match timeout(limit, TcpStream::connect((host, port))).await {
        Ok(Ok(_stream)) => true,
        Ok(Err(err)) => {
            debug!(host, port, %err, "tcp probe failed");
            false
        }
        Err(_elapsed) => {
            debug!(host, port, "tcp probe timed out");
            false
        }
    }
}

/// Outcome of an HTTP(S) probe.
///
/// An HTTP error response still means the service process is alive and
/// answering; only connection-level failures count as unreachable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum HttpProbe {
    /// Response with status in [200, 400).
    Ok { status: u16 },
    /// Response with any other status (4xx/5xx).
    ErrorStatus { status: u16 },
    /// Connection-level failure: DNS, refusal, TLS handshake, timeout.
    Unreachable { reason: String },
}

impl HttpProbe {
    /// Whether the service answered at the HTTP layer at all.
    pub fn responding(&self) -> bool {
        !matches!(self, HttpProbe::Unreachable { .. })
    }

    /// The response status, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpProbe::Ok { status } | HttpProbe::ErrorStatus { status } => Some(*status),
            HttpProbe::Unreachable { .. } => None,
        }
    }
}

/// Probe `url` with a GET request, tolerating self-signed certificates.
///
/// Certificate-chain and hostname verification are disabled: the target is
/// typically a freshly installed control panel serving its own certificate.
pub async fn check_http_status(url: &str, limit: Duration) -> HttpProbe {
    let client = match reqwest::Client::builder()
        .danger_accept_invalid_certs(true)
        .timeout(limit)
        .build()
    {
        Ok(client) => client,
        Err(err) => {
            return HttpProbe::Unreachable {
                reason: err.to_string(),
            }
        }
    };

    match client.get(url).send().await {
        Ok(response) => {
            let status = response.status().as_u16();
            if (200..400).contains(&status) {
                HttpProbe::Ok { status }
            } else {
                HttpProbe::ErrorStatus { status }
            }
        }
        Err(err) => {
            debug!(url, %err, "http probe failed");
            HttpProbe::Unreachable {
                reason: err.to_string(),
            }
        }
    }
}
