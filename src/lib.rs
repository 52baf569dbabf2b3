//! # cfddns
//!
//! A dynamic DNS client for Cloudflare written in Rust.
//!
//! ## Features
//!
//! - Races several public IP-echo services, first valid answer wins
//! - Read-compare-write against the Cloudflare DNS records API, with an
//!   idempotent no-op when the address is unchanged
//! - Slack webhook notifications for successes and failures
//! - Interval mode for running without an external scheduler
//! - One-shot Google Domains updater
//!
//! ## Usage
//!
//! ```bash
//! # One reconciliation pass
//! cfddns sync --auth-email ops@example.com --api-token $CF_TOKEN \
//!     --zone-id abc123 --record-name home.example.com
//!
//! # Show the resolved public IP and the provider's record
//! cfddns status --auth-email ops@example.com --api-token $CF_TOKEN \
//!     --zone-id abc123 --record-name home.example.com
//!
//! # Re-run every 5 minutes
//! cfddns daemon --interval 300
//!
//! # Google Domains one-shot update
//! cfddns google --domain home.example.com --user u --password p
//! ```

pub mod cloudflare;
pub mod config;
pub mod error;
pub mod google;
pub mod notify;
pub mod reconciler;
pub mod resolver;

pub use config::{Config, Settings};
pub use error::{Error, Result};
pub use reconciler::{Outcome, Reconciler};
pub use resolver::IpResolver;
