//! Google Domains one-shot updater.
//!
//! Pure request/response: Google infers the caller's address server-side,
//! so there is no read-compare-write cycle here.

use crate::error::Result;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

const DEFAULT_BASE_URL: &str = "https://domains.google.com";

/// Google Domains dynamic DNS client.
pub struct GoogleDomains {
    client: reqwest::Client,
    hostname: String,
    user: String,
    password: String,
    base_url: String,
}

impl GoogleDomains {
    /// Create a new updater for the given hostname.
    pub fn new(hostname: String, user: String, password: String) -> Self {
        Self::with_base_url(hostname, user, password, DEFAULT_BASE_URL.to_string())
    }

    /// Create with custom base URL (for testing).
    pub fn with_base_url(
        hostname: String,
        user: String,
        password: String,
        base_url: String,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            hostname,
            user,
            password,
            base_url,
        }
    }

    fn auth_header(&self) -> String {
        let token = STANDARD.encode(format!("{}:{}", self.user, self.password));
        format!("Basic {}", token)
    }

    /// Submit the update and return the provider's raw status line
    /// (e.g. "good 203.0.113.7" or "nochg 203.0.113.7").
    pub async fn update(&self) -> Result<String> {
        let url = format!("{}/nic/update?hostname={}", self.base_url, self.hostname);

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await?;

        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_update_sends_basic_auth() {
        let mock_server = MockServer::start().await;

        // base64("user:pass")
        Mock::given(method("POST"))
            .and(path("/nic/update"))
            .and(query_param("hostname", "home.example.com"))
            .and(header("Authorization", "Basic dXNlcjpwYXNz"))
            .respond_with(ResponseTemplate::new(200).set_body_string("good 203.0.113.7"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let google = GoogleDomains::with_base_url(
            "home.example.com".to_string(),
            "user".to_string(),
            "pass".to_string(),
            mock_server.uri(),
        );

        let status = google.update().await.unwrap();
        assert_eq!(status, "good 203.0.113.7");
    }

    #[tokio::test]
    async fn test_update_returns_body_verbatim() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/nic/update"))
            .respond_with(ResponseTemplate::new(200).set_body_string("nochg 203.0.113.7"))
            .mount(&mock_server)
            .await;

        let google = GoogleDomains::with_base_url(
            "home.example.com".to_string(),
            "user".to_string(),
            "pass".to_string(),
            mock_server.uri(),
        );

        assert_eq!(google.update().await.unwrap(), "nochg 203.0.113.7");
    }
}
