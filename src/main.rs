//! Inline HTTP traffic inspector (v1)
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────────┐
//!                         │                   WAF PROXY                      │
//!    Client Request       │  ┌─────────┐   ┌────────────┐   ┌────────────┐   │
//!    ─────────────────────┼─▶│  http   │──▶│ rate limit │──▶│  query +   │   │
//!                         │  │ server  │   │  (bucket)  │   │ body check │   │
//!                         │  └─────────┘   └─────┬──────┘   └─────┬──────┘   │
//!                         │                  429 │          403   │ allow    │
//!                         │                      ▼                ▼          │
//!    Client Response      │  ┌──────────────────────┐      ┌────────────┐    │
//!    ◀────────────────────┼──│ reject / relay back  │◀─────│ forwarder  │◀───┼──── Upstream
//!                         │  └──────────────────────┘      └────────────┘    │
//!                         └──────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use waf_proxy::config::{load_config, validate_config, ConfigError, WafConfig};
use waf_proxy::lifecycle::{wait_for_signal, Shutdown};
use waf_proxy::observability::{logging, metrics};
use waf_proxy::{WafError, WafServer};

#[derive(Parser)]
#[command(name = "waf-proxy")]
#[command(about = "Inline HTTP traffic inspector and reverse proxy", long_about = None)]
struct Cli {
    /// TOML configuration file; built-in defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, e.g. 0.0.0.0:8081
    #[arg(short, long)]
    listen: Option<String>,

    /// Upstream host:port
    #[arg(short, long)]
    upstream: Option<String>,

    /// Log level when RUST_LOG is unset
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn into_config(self) -> Result<WafConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => WafConfig::default(),
        };

        if let Some(listen) = self.listen {
            config.listener.bind_address = listen;
        }
        if let Some(upstream) = self.upstream {
            config.upstream.address = upstream;
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), WafError> {
    let config = Cli::parse().into_config()?;

    logging::init_logging(&config.observability.log_level);
    tracing::info!("waf-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.address,
        capacity = config.rate_limit.capacity,
        refill_per_second = config.rate_limit.refill_per_second,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let address = &config.observability.metrics_address;
        let addr = address
            .parse::<SocketAddr>()
            .map_err(|source| WafError::InvalidMetricsAddress {
                address: address.clone(),
                source,
            })?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = WafServer::new(config)?;

    let shutdown = Shutdown::new();
    let signal = shutdown.subscribe();
    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown.trigger();
    });

    server.run(listener, signal).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
