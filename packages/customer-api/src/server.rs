//! Hyper server setup and request handling.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use http_body_util::Full;
use hyper::body::{Bytes, Incoming as IncomingBody};
use hyper::{Request, Response};
use hyper_util::rt::{TokioExecutor, TokioIo, TokioTimer};
use hyper_util::server::conn::auto::Builder as ConnectionBuilder;
use hyper_util::server::graceful::GracefulShutdown;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::time;

use crate::router::{Router, RouterError};
use customer_core::config::ServiceConfig;

/// Back-off after a failed accept, so resource exhaustion does not spin.
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Server lifecycle errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Listener could not be bound
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// In-flight connections outlived the shutdown grace period
    #[error("connections still open after {0:?} shutdown grace period")]
    ShutdownTimeout(Duration),
}

/// HTTP server for the customer API.
pub struct Server {
    config: Arc<ServiceConfig>,
    router: Arc<Router>,
}

impl Server {
    /// Creates a new server instance.
    ///
    /// Timeouts and the bind address come from the router's configuration.
    pub fn new(router: Router) -> Self {
        Self {
            config: Arc::clone(&router.state().config),
            router: Arc::new(router),
        }
    }

    /// Binds the configured address and serves until `signal` resolves.
    pub async fn serve_with_shutdown<F>(self, signal: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()>,
    {
        let addr = self.config.socket_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        self.run(listener, signal).await
    }

    /// Serves connections from `listener` until `signal` resolves.
    ///
    /// After the signal the listener is closed, open connections are asked
    /// to finish their in-flight requests, and the call waits at most the
    /// configured grace period for them.
    pub async fn run<F>(self, listener: TcpListener, signal: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()>,
    {
        if let Ok(addr) = listener.local_addr() {
            tracing::info!(%addr, "server listening");
        }

        let mut builder = ConnectionBuilder::new(TokioExecutor::new());
        builder
            .http1()
            .timer(TokioTimer::new())
            .header_read_timeout(self.config.read_timeout());

        let graceful = GracefulShutdown::new();
        let write_timeout = self.config.write_timeout();
        tokio::pin!(signal);

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(conn) => conn,
                        Err(err) => {
                            tracing::error!(error = %err, "failed to accept connection");
                            time::sleep(ACCEPT_RETRY_DELAY).await;
                            continue;
                        }
                    };

                    let io = TokioIo::new(stream);
                    let router = Arc::clone(&self.router);
                    let service = hyper::service::service_fn(move |req| {
                        handle_request(req, Arc::clone(&router), write_timeout)
                    });

                    let conn = builder.serve_connection_with_upgrades(io, service);
                    let conn = graceful.watch(conn.into_owned());
                    tokio::spawn(async move {
                        if let Err(err) = conn.await {
                            tracing::debug!(%peer, error = %err, "error serving connection");
                        }
                    });
                }
                () = &mut signal => {
                    tracing::info!("shutdown signal received, no longer accepting connections");
                    break;
                }
            }
        }

        drop(listener);

        let grace = self.config.shutdown_grace();
        time::timeout(grace, graceful.shutdown())
            .await
            .map_err(|_| ServerError::ShutdownTimeout(grace))?;

        tracing::info!("server stopped gracefully");
        Ok(())
    }
}

/// Handles an incoming HTTP request.
async fn handle_request(
    req: Request<IncomingBody>,
    router: Arc<Router>,
    write_timeout: Duration,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let response = match time::timeout(write_timeout, router.respond(req)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!(?write_timeout, "response deadline exceeded");
            Response::from(RouterError::DeadlineExceeded)
        }
    };
    Ok(response.map(Full::new))
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
