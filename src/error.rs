//! Error types for cfddns.

use thiserror::Error as ThisError;

/// Result type alias for cfddns.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the library.
#[derive(ThisError, Debug)]
pub enum Error {
    /// Configuration error (missing or contradictory settings).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network/HTTP error.
    #[error("Network error: {0}")]
    Network(String),

    /// No IP-echo endpoint yielded an address.
    #[error("IP resolution failed: {0}")]
    Resolve(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Network(e.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}
