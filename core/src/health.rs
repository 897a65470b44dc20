//! Control-panel health checks: TCP port plus HTTPS endpoint.
//!
//! The exit-code contract built on [`HealthReport::is_healthy`] is load-bearing
//! for external automation: healthy means the TCP port is open AND the HTTP
//! layer responded, where any HTTP error response counts as responding.

use std::time::Duration;

use serde::Serialize;

use crate::probe::{self, HttpProbe};

/// Default host probed by the health check.
pub const DEFAULT_HOST: &str = "localhost";

/// Default control-panel port probed by the health check.
pub const DEFAULT_PORT: u16 = 8083;

const PORT_TIMEOUT: Duration = Duration::from_secs(5);
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of one health-check run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    /// Probed host.
    pub host: String,
    /// Probed TCP port.
    pub port: u16,
    /// HTTPS endpoint probed when the port was open.
    pub url: String,
    /// Whether the TCP port accepted a connection.
    pub port_open: bool,
    /// HTTP probe outcome; `None` when the port was closed and the HTTP
    /// layer was never tried.
    pub http: Option<HttpProbe>,
}

impl HealthReport {
    /// Whether the service passes both checks.
    pub fn is_healthy(&self) -> bool {
        self.port_open && self.http.as_ref().is_some_and(HttpProbe::responding)
    }
}

/// Probe `host:port` and, when open, `https://host:port/login/`.
pub async fn check(host: &str, port: u16) -> HealthReport {
    let url = format!("https://{host}:{port}/login/");

    let port_open = probe::check_port(host, port, PORT_TIMEOUT).await;
    let http = if port_open {
        Some(probe::check_http_status(&url, HTTP_TIMEOUT).await)
    } else {
        None
    };

    HealthReport {
        host: host.to_string(),
        port,
        url,
        port_open,
        http,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(port_open: bool, http: Option<HttpProbe>) -> HealthReport {
        HealthReport {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            url: format!("https://{DEFAULT_HOST}:{DEFAULT_PORT}/login/"),
            port_open,
            http,
        }
    }

    #[test]
    fn test_closed_port_is_unhealthy() {
        assert!(!report(false, None).is_healthy());
    }

    #[test]
    fn test_http_success_is_healthy() {
        assert!(report(true, Some(HttpProbe::Ok { status: 200 })).is_healthy());
    }

    #[test]
    fn test_http_error_response_still_counts_as_healthy() {
        // A 401/403 means the panel is running, just not accessible
        // without auth.
        assert!(report(true, Some(HttpProbe::ErrorStatus { status: 403 })).is_healthy());
        assert!(report(true, Some(HttpProbe::ErrorStatus { status: 500 })).is_healthy());
    }

    #[test]
    fn test_connection_failure_is_unhealthy() {
        let http = HttpProbe::Unreachable {
            reason: "tls handshake failed".to_string(),
        };
        assert!(!report(true, Some(http)).is_healthy());
    }

    #[tokio::test]
    async fn test_check_skips_http_when_port_closed() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let report = check("127.0.0.1", port).await;
        assert!(!report.port_open);
        assert!(report.http.is_none());
        assert!(!report.is_healthy());
    }
}
