//! Record reconciliation: resolve, read, compare, write, notify.
//!
//! One invocation walks a linear state machine with early exits. There are
//! no retries between steps; eventual consistency comes from the next
//! scheduled invocation.

use crate::cloudflare::DnsApi;
use crate::notify::Notifier;
use crate::resolver::IpResolver;

/// Terminal state of one reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Record already points at the current address. No write, no
    /// notification.
    UpToDate,
    /// No matching record exists in the zone. Creating records is out of
    /// scope, so this exits silently.
    NoRecord,
    /// Record rewritten; success notified.
    Updated { old: String, new: String },
    /// A step failed; failure notified with this message.
    Failed(String),
}

/// Drives one resolve/read/compare/write cycle.
pub struct Reconciler {
    resolver: IpResolver,
    api: DnsApi,
    notifier: Notifier,
    ttl: u32,
    proxied: bool,
}

impl Reconciler {
    pub fn new(
        resolver: IpResolver,
        api: DnsApi,
        notifier: Notifier,
        ttl: u32,
        proxied: bool,
    ) -> Self {
        Self {
            resolver,
            api,
            notifier,
            ttl,
            proxied,
        }
    }

    /// Run one reconciliation pass to completion.
    ///
    /// Provider and transport failures are converted into a failure
    /// notification at the step where they occur; nothing propagates as an
    /// error from here.
    pub async fn run(&self) -> Outcome {
        let ip = match self.resolver.resolve().await {
            Ok(ip) => ip,
            Err(e) => {
                tracing::warn!("Resolution failed: {}", e);
                return self.fail("Failed to get current ip address".to_string()).await;
            }
        };

        let record_set = match self.api.fetch_records().await {
            Ok(response) => response,
            Err(e) => {
                return self
                    .fail(format!("Failed to get dns record. Errors: {}", e))
                    .await;
            }
        };

        if !record_set.success {
            return self
                .fail(format!(
                    "Failed to get dns record. Errors: {}",
                    record_set.joined_errors()
                ))
                .await;
        }

        // Zone has no matching record at all. Creation is out of scope, so
        // this is a recognized unsupported case rather than a failure.
        if record_set.result_info.as_ref().map_or(0, |info| info.count) == 0 {
            tracing::info!("No A record named {} in zone", self.api.record_name());
            return Outcome::NoRecord;
        }

        let records = record_set.result.unwrap_or_default();
        let Some(record) = records.first().filter(|r| !r.id.is_empty()) else {
            return self.fail("Failed to get dns record id".to_string()).await;
        };

        // Idempotence path: repeated invocations with an unchanged address
        // must not touch the provider or the notifier.
        if record.content == ip {
            tracing::debug!("{} already points at {}", record.name, ip);
            return Outcome::UpToDate;
        }

        let write = match self
            .api
            .patch_record(&record.id, &ip, self.ttl, self.proxied)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                return self
                    .fail(format!("Failed to set dns record. Errors: {}", e))
                    .await;
            }
        };

        if !write.success {
            return self
                .fail(format!(
                    "Failed to set dns record. Errors: {}",
                    write.joined_errors()
                ))
                .await;
        }

        let message = format!("DNS record updated: {} -> {}", record.content, ip);
        tracing::info!("{}", message);
        self.notifier.notify(&message, true).await;

        Outcome::Updated {
            old: record.content.clone(),
            new: ip,
        }
    }

    async fn fail(&self, message: String) -> Outcome {
        tracing::error!("{}", message);
        self.notifier.notify(&message, false).await;
        Outcome::Failed(message)
    }
}
