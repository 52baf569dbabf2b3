//! cfddns - Cloudflare dynamic DNS client.

use cfddns::cloudflare::DnsApi;
use cfddns::config::{Config, Settings};
use cfddns::google::GoogleDomains;
use cfddns::notify::{Notifier, SlackWebhook};
use cfddns::reconciler::{Outcome, Reconciler};
use cfddns::resolver::IpResolver;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "cfddns")]
#[command(about = "Dynamic DNS client for Cloudflare with Slack notifications")]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one reconciliation pass
    Sync {
        #[command(flatten)]
        opts: CloudflareOpts,
    },

    /// Show the resolved public IP and the provider's record
    Status {
        #[command(flatten)]
        opts: CloudflareOpts,
    },

    /// Re-run the sync on a fixed interval
    Daemon {
        /// Seconds between passes
        #[arg(short, long, default_value = "300")]
        interval: u64,

        #[command(flatten)]
        opts: CloudflareOpts,
    },

    /// One-shot Google Domains update
    Google {
        /// Hostname to update
        #[arg(long)]
        domain: String,

        /// Dynamic DNS username
        #[arg(long)]
        user: String,

        /// Dynamic DNS password
        #[arg(long)]
        password: String,
    },
}

/// Cloudflare/notification flags; anything not given here falls back to the
/// config file.
#[derive(Args)]
struct CloudflareOpts {
    /// Account email (sent as X-Auth-Email)
    #[arg(long)]
    auth_email: Option<String>,

    /// Scoped API token (mutually exclusive with --auth-key)
    #[arg(long, group = "credential")]
    api_token: Option<String>,

    /// Global API key (mutually exclusive with --api-token)
    #[arg(long, group = "credential")]
    auth_key: Option<String>,

    /// Zone ID
    #[arg(long)]
    zone_id: Option<String>,

    /// Record name (e.g. "home.example.com")
    #[arg(long)]
    record_name: Option<String>,

    /// TTL in seconds (1 = automatic)
    #[arg(long)]
    ttl: Option<u32>,

    /// Route traffic through the Cloudflare proxy
    #[arg(long)]
    proxy: bool,

    /// Slack incoming-webhook URL for outcome notifications
    #[arg(long)]
    slack_webhook_url: Option<String>,
}

fn get_config_path(cli_path: Option<PathBuf>) -> PathBuf {
    if let Some(path) = cli_path {
        return path;
    }

    // Default locations
    let candidates = [
        dirs::config_dir().map(|p| p.join("cfddns/config.toml")),
        Some(PathBuf::from("/etc/cfddns/config.toml")),
        Some(PathBuf::from("config.toml")),
    ];

    for candidate in candidates.into_iter().flatten() {
        if candidate.exists() {
            return candidate;
        }
    }

    // Return default even if it doesn't exist
    dirs::config_dir()
        .map(|p| p.join("cfddns/config.toml"))
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

/// Overlay CLI flags onto the file config.
fn merge(mut config: Config, opts: CloudflareOpts) -> Config {
    // CLI credentials replace file credentials wholesale, otherwise a token
    // on the command line would collide with a key in the file.
    if opts.api_token.is_some() || opts.auth_key.is_some() {
        config.auth.api_token = None;
        config.auth.auth_key = None;
    }

    if let Some(v) = opts.auth_email {
        config.auth.email = Some(v);
    }
    if let Some(v) = opts.api_token {
        config.auth.api_token = Some(v);
    }
    if let Some(v) = opts.auth_key {
        config.auth.auth_key = Some(v);
    }
    if let Some(v) = opts.zone_id {
        config.dns.zone_id = Some(v);
    }
    if let Some(v) = opts.record_name {
        config.dns.record_name = Some(v);
    }
    if let Some(v) = opts.ttl {
        config.dns.ttl = Some(v);
    }
    if opts.proxy {
        config.dns.proxied = Some(true);
    }
    if let Some(v) = opts.slack_webhook_url {
        config.notify.slack_webhook_url = Some(v);
    }

    config
}

fn load_settings(path: &Path, opts: CloudflareOpts) -> anyhow::Result<Settings> {
    let config = Config::load_from(path)?;
    Ok(merge(config, opts).resolve()?)
}

fn build_reconciler(settings: Settings) -> Reconciler {
    let resolver = IpResolver::new(settings.ip_endpoints);
    let api = DnsApi::new(settings.credentials, settings.zone_id, settings.record_name);

    let mut notifier = Notifier::new();
    if let Some(url) = settings.slack_webhook_url {
        notifier.add_sink(Box::new(SlackWebhook::new(url)));
    }

    Reconciler::new(resolver, api, notifier, settings.ttl, settings.proxied)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config_path = get_config_path(cli.config);

    match cli.command {
        Commands::Sync { opts } => {
            let settings = load_settings(&config_path, opts)?;
            cmd_sync(settings).await;
        }
        Commands::Status { opts } => {
            let settings = load_settings(&config_path, opts)?;
            cmd_status(settings).await?;
        }
        Commands::Daemon { interval, opts } => {
            let settings = load_settings(&config_path, opts)?;
            cmd_daemon(settings, interval).await;
        }
        Commands::Google {
            domain,
            user,
            password,
        } => {
            cmd_google(domain, user, password).await?;
        }
    }

    Ok(())
}

async fn cmd_sync(settings: Settings) {
    let reconciler = build_reconciler(settings);
    report(&reconciler.run().await);
}

/// A failed run still exits 0: failures are surfaced through the
/// notification channel and the log, and the tool relies on re-invocation.
fn report(outcome: &Outcome) {
    match outcome {
        Outcome::UpToDate => println!("Record already up to date"),
        Outcome::NoRecord => println!("No matching record (creating records is not supported)"),
        Outcome::Updated { old, new } => println!("Updated: {} -> {}", old, new),
        Outcome::Failed(message) => eprintln!("Sync failed: {}", message),
    }
}

async fn cmd_status(settings: Settings) -> anyhow::Result<()> {
    let resolver = IpResolver::new(settings.ip_endpoints);
    let api = DnsApi::new(settings.credentials, settings.zone_id, settings.record_name);

    println!("cfddns status");
    println!("=============\n");

    match resolver.resolve().await {
        Ok(ip) => println!("Current public IP: {}", ip),
        Err(e) => println!("Failed to resolve IP: {}", e),
    }

    let response = api.fetch_records().await?;

    if !response.success {
        println!("Provider error: {}", response.joined_errors());
        return Ok(());
    }

    match response.result.unwrap_or_default().first() {
        Some(record) => {
            println!("\nRecord {}:", record.name);
            println!("  content: {}", record.content);
            if let Some(ttl) = record.ttl {
                println!("  ttl:     {}", ttl);
            }
            if let Some(proxied) = record.proxied {
                println!("  proxied: {}", proxied);
            }
        }
        None => println!("\n(no matching record)"),
    }

    Ok(())
}

async fn cmd_daemon(settings: Settings, interval: u64) {
    let interval = Duration::from_secs(interval);

    tracing::info!("Starting cfddns daemon (interval: {}s)", interval.as_secs());

    let reconciler = build_reconciler(settings);

    loop {
        match reconciler.run().await {
            Outcome::Updated { old, new } => tracing::info!("Updated: {} -> {}", old, new),
            Outcome::UpToDate => tracing::debug!("No change"),
            Outcome::NoRecord => tracing::warn!("No matching record in zone"),
            Outcome::Failed(message) => tracing::error!("Sync failed: {}", message),
        }

        tokio::time::sleep(interval).await;
    }
}

async fn cmd_google(domain: String, user: String, password: String) -> anyhow::Result<()> {
    let google = GoogleDomains::new(domain, user, password);
    let status = google.update().await?;
    println!("{}", status);
    Ok(())
}
