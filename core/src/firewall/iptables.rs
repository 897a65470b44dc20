//! iptables destination-port presence check.

use crate::domain::IptablesStatus;
use crate::error::Result;
use crate::runner::CommandRunner;

/// Classify iptables state for a port.
///
/// Runs `iptables -L -n` once and applies a grep-equivalent substring filter:
/// `":<port> "` first, then `"dpt:<port>"` when the first pattern matched
/// nothing. Presence of any matching line counts as a rule. iptables chains
/// are not modeled beyond this; presence usually indicates a rule.
pub async fn status<R: CommandRunner>(runner: &R, port: u16) -> Result<IptablesStatus> {
    let listing = runner.run("iptables -L -n", true).await?;

    if grep(&listing, &format!(":{port} ")).is_empty()
        && grep(&listing, &format!("dpt:{port}")).is_empty()
    {
        return Ok(IptablesStatus::NotFound);
    }
    Ok(IptablesStatus::Found)
}

/// Lines of `iptables -L -n` output mentioning `port` at all.
///
/// Used by the bootstrap verification pass, which reports the matching rule
/// text back to the operator.
pub async fn grep_port<R: CommandRunner>(runner: &R, port: u16) -> Result<String> {
    let listing = runner.run("iptables -L -n", true).await?;
    Ok(grep(&listing, &port.to_string()))
}

fn grep(listing: &str, pattern: &str) -> String {
    listing
        .lines()
        .filter(|line| line.contains(pattern))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::mock::MockRunner;

    const LISTING_WITH_DPT: &str = "Chain INPUT (policy ACCEPT)\n\
        target     prot opt source               destination\n\
        ACCEPT     tcp  --  0.0.0.0/0            0.0.0.0/0            tcp dpt:8083";

    #[tokio::test]
    async fn test_dpt_pattern_matches() {
        let runner = MockRunner::new().with_response("iptables -L -n", LISTING_WITH_DPT);
        assert_eq!(status(&runner, 8083).await.unwrap(), IptablesStatus::Found);
    }

    #[tokio::test]
    async fn test_colon_pattern_matches() {
        let runner = MockRunner::new().with_response(
            "iptables -L -n",
            "DNAT       tcp  --  0.0.0.0/0            0.0.0.0/0            to:10.0.0.2:8083 extra",
        );
        assert_eq!(status(&runner, 8083).await.unwrap(), IptablesStatus::Found);
    }

    #[tokio::test]
    async fn test_no_match() {
        let runner = MockRunner::new().with_response(
            "iptables -L -n",
            "Chain INPUT (policy ACCEPT)\nACCEPT     tcp  --  0.0.0.0/0   0.0.0.0/0   tcp dpt:22",
        );
        assert_eq!(
            status(&runner, 8083).await.unwrap(),
            IptablesStatus::NotFound
        );
    }

    #[tokio::test]
    async fn test_empty_listing_is_not_found() {
        let runner = MockRunner::new();
        assert_eq!(
            status(&runner, 8083).await.unwrap(),
            IptablesStatus::NotFound
        );
    }

    #[tokio::test]
    async fn test_grep_port_returns_matching_lines() {
        let runner = MockRunner::new().with_response("iptables -L -n", LISTING_WITH_DPT);
        let lines = grep_port(&runner, 8083).await.unwrap();
        assert!(lines.contains("dpt:8083"));
        assert_eq!(lines.lines().count(), 1);

        let runner = MockRunner::new().with_response("iptables -L -n", "Chain INPUT");
        assert!(grep_port(&runner, 8083).await.unwrap().is_empty());
    }
}
