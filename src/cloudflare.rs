//! Cloudflare DNS record API client.
//!
//! The reader and writer return the decoded response envelope verbatim;
//! interpreting the success flag, error list and record shape is the sync
//! pipeline's job, not the transport's.

use crate::error::Result;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://api.cloudflare.com";

/// Account credentials: email plus exactly one auth scheme.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub scheme: AuthScheme,
}

/// The two mutually exclusive Cloudflare auth forms.
#[derive(Debug, Clone)]
pub enum AuthScheme {
    /// Scoped API token, sent as a bearer Authorization header.
    Token(String),
    /// Global API key, sent as X-Auth-Key.
    GlobalKey(String),
}

impl Credentials {
    fn apply(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = request.header("X-Auth-Email", &self.email);

        match &self.scheme {
            AuthScheme::Token(token) => {
                request.header("Authorization", format!("Bearer {}", token))
            }
            AuthScheme::GlobalKey(key) => request.header("X-Auth-Key", key),
        }
    }
}

/// Decoded Cloudflare v4 response envelope.
///
/// Decoding is tolerant: absent fields fall back to defaults so that a
/// malformed body surfaces as an interpretable shape (e.g. an empty record
/// id) rather than a decode error.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<ApiError>,
    pub result: Option<T>,
    pub result_info: Option<ResultInfo>,
}

impl<T> ApiResponse<T> {
    /// Provider error messages joined into one readable line.
    pub fn joined_errors(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ResultInfo {
    #[serde(default)]
    pub count: u64,
}

/// One DNS record as reported by the provider.
#[derive(Debug, Deserialize)]
pub struct DnsRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub content: String,
    pub ttl: Option<u32>,
    pub proxied: Option<bool>,
}

/// Full replacement body for a record update. Callers supply the complete
/// intended state; this is not a field-level merge.
#[derive(Debug, Serialize)]
struct PatchBody<'a> {
    #[serde(rename = "type")]
    record_type: &'a str,
    name: &'a str,
    content: &'a str,
    ttl: u32,
    proxied: bool,
}

/// Cloudflare DNS API client bound to one zone and record name.
pub struct DnsApi {
    client: reqwest::Client,
    credentials: Credentials,
    zone_id: String,
    record_name: String,
    base_url: String,
}

impl DnsApi {
    /// Create a new API client.
    pub fn new(credentials: Credentials, zone_id: String, record_name: String) -> Self {
        Self::with_base_url(credentials, zone_id, record_name, DEFAULT_BASE_URL.to_string())
    }

    /// Create with custom base URL (for testing).
    pub fn with_base_url(
        credentials: Credentials,
        zone_id: String,
        record_name: String,
        base_url: String,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            credentials,
            zone_id,
            record_name,
            base_url,
        }
    }

    pub fn record_name(&self) -> &str {
        &self.record_name
    }

    /// Fetch all "A" records matching the configured zone and name.
    pub async fn fetch_records(&self) -> Result<ApiResponse<Vec<DnsRecord>>> {
        let url = format!(
            "{}/client/v4/zones/{}/dns_records?type=A&name={}",
            self.base_url, self.zone_id, self.record_name
        );

        let response = self
            .credentials
            .apply(self.client.get(&url))
            .send()
            .await?
            .json()
            .await?;

        Ok(response)
    }

    /// Replace a record's type/name/content/ttl/proxied via PATCH.
    pub async fn patch_record(
        &self,
        record_id: &str,
        content: &str,
        ttl: u32,
        proxied: bool,
    ) -> Result<ApiResponse<DnsRecord>> {
        let url = format!(
            "{}/client/v4/zones/{}/dns_records/{}",
            self.base_url, self.zone_id, record_id
        );

        let body = PatchBody {
            record_type: "A",
            name: &self.record_name,
            content,
            ttl,
            proxied,
        };

        let response = self
            .credentials
            .apply(self.client.patch(&url))
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        Ok(response)
    }
}
