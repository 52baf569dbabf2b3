//! Configuration management for cfddns.
//!
//! Settings come from an optional TOML file merged with command-line flags;
//! the CLI layer overlays its values onto [`Config`] and then calls
//! [`Config::resolve`] to obtain validated [`Settings`].

use crate::cloudflare::{AuthScheme, Credentials};
use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Raw configuration as read from file (all fields optional).
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// IP-echo services to race.
    #[serde(default = "default_endpoints")]
    pub ip_endpoints: Vec<String>,

    /// Cloudflare credentials.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Target zone/record.
    #[serde(default)]
    pub dns: DnsConfig,

    /// Notification sinks.
    #[serde(default)]
    pub notify: NotifyConfig,
}

fn default_endpoints() -> Vec<String> {
    vec![
        "https://cloudflare.com/cdn-cgi/trace".to_string(),
        "https://api.ipify.org".to_string(),
        "https://ipv4.icanhazip.com".to_string(),
    ]
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    /// Account email, sent as X-Auth-Email.
    pub email: Option<String>,
    /// Scoped API token (mutually exclusive with auth_key).
    pub api_token: Option<String>,
    /// Global API key (mutually exclusive with api_token).
    pub auth_key: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DnsConfig {
    pub zone_id: Option<String>,
    pub record_name: Option<String>,
    /// TTL in seconds; 1 means "automatic" in Cloudflare's convention.
    pub ttl: Option<u32>,
    pub proxied: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotifyConfig {
    pub slack_webhook_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ip_endpoints: default_endpoints(),
            auth: AuthConfig::default(),
            dns: DnsConfig::default(),
            notify: NotifyConfig::default(),
        }
    }
}

/// Validated settings consumed by the sync pipeline.
#[derive(Debug, Clone)]
pub struct Settings {
    pub ip_endpoints: Vec<String>,
    pub credentials: Credentials,
    pub zone_id: String,
    pub record_name: String,
    pub ttl: u32,
    pub proxied: bool,
    pub slack_webhook_url: Option<String>,
}

impl Config {
    /// Get the default config file path.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Could not find config directory".to_string()))?;

        Ok(config_dir.join("cfddns").join("config.toml"))
    }

    /// Load configuration from a specific path.
    ///
    /// A missing file is not an error; it yields the defaults so that a
    /// flags-only invocation works without any file on disk.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Validate and convert into [`Settings`].
    pub fn resolve(self) -> Result<Settings> {
        let email = self
            .auth
            .email
            .ok_or_else(|| Error::Config("auth email is required".to_string()))?;

        let scheme = match (self.auth.api_token, self.auth.auth_key) {
            (Some(token), None) => AuthScheme::Token(token),
            (None, Some(key)) => AuthScheme::GlobalKey(key),
            (Some(_), Some(_)) => {
                return Err(Error::Config(
                    "api_token and auth_key are mutually exclusive".to_string(),
                ))
            }
            (None, None) => {
                return Err(Error::Config(
                    "either api_token or auth_key is required".to_string(),
                ))
            }
        };

        let zone_id = self
            .dns
            .zone_id
            .ok_or_else(|| Error::Config("dns zone_id is required".to_string()))?;
        let record_name = self
            .dns
            .record_name
            .ok_or_else(|| Error::Config("dns record_name is required".to_string()))?;

        Ok(Settings {
            ip_endpoints: self.ip_endpoints,
            credentials: Credentials { email, scheme },
            zone_id,
            record_name,
            ttl: self.dns.ttl.unwrap_or(1),
            proxied: self.dns.proxied.unwrap_or(false),
            slack_webhook_url: self.notify.slack_webhook_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> Config {
        Config {
            auth: AuthConfig {
                email: Some("ops@example.com".to_string()),
                api_token: Some("tok".to_string()),
                auth_key: None,
            },
            dns: DnsConfig {
                zone_id: Some("zone-1".to_string()),
                record_name: Some("home.example.com".to_string()),
                ttl: None,
                proxied: None,
            },
            ..Config::default()
        }
    }

    #[test]
    fn test_default_endpoints() {
        let config = Config::default();
        assert_eq!(config.ip_endpoints.len(), 3);
    }

    #[test]
    fn test_resolve_defaults() {
        let settings = minimal().resolve().unwrap();
        assert_eq!(settings.ttl, 1);
        assert!(!settings.proxied);
        assert!(settings.slack_webhook_url.is_none());
    }

    #[test]
    fn test_resolve_rejects_both_credentials() {
        let mut config = minimal();
        config.auth.auth_key = Some("key".to_string());
        assert!(matches!(config.resolve(), Err(Error::Config(_))));
    }

    #[test]
    fn test_resolve_rejects_missing_credentials() {
        let mut config = minimal();
        config.auth.api_token = None;
        assert!(matches!(config.resolve(), Err(Error::Config(_))));
    }

    #[test]
    fn test_resolve_requires_zone() {
        let mut config = minimal();
        config.dns.zone_id = None;
        assert!(config.resolve().is_err());
    }

    #[test]
    fn test_parse_toml() {
        let raw = r#"
            ip_endpoints = ["https://api.ipify.org"]

            [auth]
            email = "ops@example.com"
            auth_key = "global-key"

            [dns]
            zone_id = "zone-1"
            record_name = "home.example.com"
            ttl = 120
            proxied = true

            [notify]
            slack_webhook_url = "https://hooks.slack.invalid/T00/B00"
        "#;

        let config: Config = toml::from_str(raw).unwrap();
        let settings = config.resolve().unwrap();

        assert_eq!(settings.ip_endpoints.len(), 1);
        assert_eq!(settings.ttl, 120);
        assert!(settings.proxied);
        assert!(matches!(settings.credentials.scheme, AuthScheme::GlobalKey(_)));
        assert!(settings.slack_webhook_url.is_some());
    }

    #[test]
    fn test_load_from_missing_file_gives_defaults() {
        let config = Config::load_from(Path::new("/nonexistent/cfddns.toml")).unwrap();
        assert_eq!(config.ip_endpoints.len(), 3);
    }
}
