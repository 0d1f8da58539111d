//! Main REST API server for the customer service.
//!
//! Parses configuration from flags and environment, builds the record
//! store and router, and serves until Ctrl+C or SIGTERM.

use std::net::IpAddr;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use customer_api::router::{AppState, Router};
use customer_api::server::{self, Server};
use customer_core::config::ServiceConfig;
use customer_core::CustomerStore;

/// Command-line arguments for the customer server.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    port: u16,

    /// Host address to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: IpAddr,

    /// Deadline for reading a request, in milliseconds
    #[arg(long, env = "READ_TIMEOUT_MS", default_value_t = 5000)]
    read_timeout_ms: u64,

    /// Deadline for writing a response, in milliseconds
    #[arg(long, env = "WRITE_TIMEOUT_MS", default_value_t = 10000)]
    write_timeout_ms: u64,

    /// Grace period for in-flight requests on shutdown, in milliseconds
    #[arg(long, env = "SHUTDOWN_GRACE_MS", default_value_t = 10000)]
    shutdown_grace_ms: u64,

    /// Start with no records instead of the three demo customers
    #[arg(long)]
    empty: bool,
}

impl Args {
    fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            host: self.host,
            port: self.port,
            read_timeout_ms: self.read_timeout_ms,
            write_timeout_ms: self.write_timeout_ms,
            shutdown_grace_ms: self.shutdown_grace_ms,
        }
    }
}

/// Installs the fmt subscriber, honoring `RUST_LOG` and defaulting to `info`.
fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging();

    let config = args.service_config();
    tracing::info!(
        addr = %config.socket_addr(),
        read_timeout_ms = config.read_timeout_ms,
        write_timeout_ms = config.write_timeout_ms,
        shutdown_grace_ms = config.shutdown_grace_ms,
        seeded = !args.empty,
        "starting customer server"
    );

    let store = if args.empty {
        CustomerStore::new()
    } else {
        CustomerStore::seeded()
    };

    let router = Router::new(AppState::new(store, config)).context("failed to build router")?;

    if let Err(err) = Server::new(router)
        .serve_with_shutdown(server::shutdown_signal())
        .await
    {
        tracing::error!(error = %err, "server terminated");
        return Err(err.into());
    }

    Ok(())
}
