use anyhow::{Context, Result};
use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use fullfeed::config::Config;
use fullfeed::content::ReadabilityExtractor;
use fullfeed::enrich::{Coordinator, Enricher, TracingObserver};
use fullfeed::feed::HttpFeedSource;
use fullfeed::relay::Relay;
use fullfeed::server::{self, AppState};
use fullfeed::util::{build_http_client, UserAgentPool};

#[derive(Parser, Debug)]
#[command(
    name = "fullfeed",
    about = "Feed relay that fills in the full text of linked articles"
)]
struct Args {
    /// Address to listen on
    #[arg(long)]
    ip: Option<IpAddr>,

    /// Port to listen on
    #[arg(long)]
    port: Option<u16>,

    /// Items enriched per request when the query has no items_cap
    #[arg(long)]
    items_cap: Option<usize>,

    /// TOML config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl Args {
    fn apply(&self, config: &mut Config) {
        if let Some(ip) = self.ip {
            config.ip = ip;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(items_cap) = self.items_cap {
            config.items_cap = items_cap;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from '{}'", path.display()))?,
        None => Config::default(),
    };
    args.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    let client = build_http_client(config.fetch_timeout().saturating_mul(2), false)
        .context("Failed to build HTTP client")?;
    let user_agents = Arc::new(UserAgentPool::from_entropy());

    let source = HttpFeedSource::new(client.clone(), user_agents.clone())
        .with_timeout(config.fetch_timeout());
    let extractor = ReadabilityExtractor::new(client, user_agents);
    let enricher = Enricher::new(
        Arc::new(extractor),
        Arc::new(TracingObserver),
        config.fetch_timeout(),
    );
    let coordinator = Coordinator::new(enricher, config.concurrency());
    let relay = Relay::new(Arc::new(source), coordinator)
        .with_title_suffix(config.title_suffix.clone());

    let state = AppState {
        relay: Arc::new(relay),
        default_items_cap: config.items_cap,
        max_items_cap: config.max_items_cap,
        from_days_ago: config.from_days_ago,
    };

    let addr = SocketAddr::new(config.ip, config.port);
    tracing::info!(
        %addr,
        items_cap = config.items_cap,
        max_concurrent_fetches = config.max_concurrent_fetches,
        "Starting fullfeed"
    );

    server::serve(addr, state)
        .await
        .with_context(|| format!("Server on {} failed", addr))?;

    Ok(())
}
