//! Public IP discovery.
//!
//! Races all configured IP-echo endpoints and takes the first body that
//! contains an IPv4-shaped substring. Endpoints that error or answer with
//! no match simply contribute no candidate; the race keeps going until a
//! candidate arrives or every endpoint has completed.

use crate::error::{Error, Result};
use regex::Regex;
use std::time::Duration;
use tokio::task::JoinSet;

/// Loose dotted-quad pattern. Deliberately not range-checked and not
/// anchored: echo services wrap the address in arbitrary text (e.g.
/// Cloudflare's `cdn-cgi/trace` key=value dump), so the first quad-shaped
/// substring anywhere in the body wins.
const IPV4_PATTERN: &str = r"\b(?:\d{1,3}\.){3}\d{1,3}\b";

/// Races multiple IP-echo services for the current public address.
pub struct IpResolver {
    client: reqwest::Client,
    endpoints: Vec<String>,
    pattern: Regex,
}

impl IpResolver {
    /// Create a resolver over the given endpoint set.
    pub fn new(endpoints: Vec<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        let pattern = Regex::new(IPV4_PATTERN).expect("IPv4 pattern is valid");

        Self {
            client,
            endpoints,
            pattern,
        }
    }

    /// Resolve the current public IPv4 address.
    ///
    /// Issues one concurrent request per endpoint and returns as soon as any
    /// of them yields a match. Stragglers are aborted when the set is
    /// dropped; their results would be discarded anyway.
    pub async fn resolve(&self) -> Result<String> {
        let mut tasks = JoinSet::new();

        for endpoint in &self.endpoints {
            let client = self.client.clone();
            let pattern = self.pattern.clone();
            let url = endpoint.clone();

            tasks.spawn(async move {
                let candidate = fetch_candidate(&client, &pattern, &url).await;
                (url, candidate)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            let Ok((url, candidate)) = joined else {
                continue;
            };

            match candidate {
                Some(ip) => {
                    tracing::debug!("Resolved {} via {}", ip, url);
                    return Ok(ip);
                }
                None => tracing::warn!("No address candidate from {}", url),
            }
        }

        Err(Error::Resolve(
            "no endpoint returned an address".to_string(),
        ))
    }
}

/// Fetch one endpoint and extract the first IPv4-shaped substring.
///
/// Transport errors are logged and collapse to "no candidate"; a single
/// flaky echo service must not fail the whole resolution.
async fn fetch_candidate(client: &reqwest::Client, pattern: &Regex, url: &str) -> Option<String> {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("Endpoint {} failed: {}", url, e);
            return None;
        }
    };

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!("Endpoint {} body read failed: {}", url, e);
            return None;
        }
    };

    pattern.find(&body).map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn echo_server(body: &str) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_resolve_plain_body() {
        let server = echo_server("203.0.113.7").await;
        let resolver = IpResolver::new(vec![server.uri()]);

        assert_eq!(resolver.resolve().await.unwrap(), "203.0.113.7");
    }

    #[tokio::test]
    async fn test_resolve_extracts_from_trace_dump() {
        let body = "fl=490f68\nh=example.com\nip=198.51.100.23\nts=1743642238.374\nvisit_scheme=https";
        let server = echo_server(body).await;
        let resolver = IpResolver::new(vec![server.uri()]);

        assert_eq!(resolver.resolve().await.unwrap(), "198.51.100.23");
    }

    #[tokio::test]
    async fn test_resolve_skips_endpoints_without_match() {
        let empty = echo_server("no address here").await;
        let good = echo_server("192.0.2.4").await;
        let resolver = IpResolver::new(vec![empty.uri(), good.uri()]);

        assert_eq!(resolver.resolve().await.unwrap(), "192.0.2.4");
    }

    #[tokio::test]
    async fn test_resolve_survives_unreachable_endpoint() {
        let good = echo_server("192.0.2.4").await;
        let resolver = IpResolver::new(vec!["http://127.0.0.1:1".to_string(), good.uri()]);

        assert_eq!(resolver.resolve().await.unwrap(), "192.0.2.4");
    }

    #[tokio::test]
    async fn test_resolve_all_miss_is_error() {
        let empty = echo_server("nothing useful").await;
        let resolver = IpResolver::new(vec!["http://127.0.0.1:1".to_string(), empty.uri()]);

        assert!(matches!(resolver.resolve().await, Err(Error::Resolve(_))));
    }

    #[tokio::test]
    async fn test_pattern_is_not_range_checked() {
        // Known limitation, preserved: the quad is shape-matched only.
        let server = echo_server("err 999.1.2.3").await;
        let resolver = IpResolver::new(vec![server.uri()]);

        assert_eq!(resolver.resolve().await.unwrap(), "999.1.2.3");
    }
}
