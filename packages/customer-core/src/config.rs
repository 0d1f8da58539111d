//! Service configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Configuration shared by the HTTP layer and the server binary.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to bind to
    pub host: IpAddr,
    /// TCP port to listen on
    pub port: u16,
    /// Deadline for reading request headers and body, in milliseconds
    pub read_timeout_ms: u64,
    /// Deadline for producing a full response, in milliseconds
    pub write_timeout_ms: u64,
    /// Grace period for in-flight connections after a shutdown signal, in milliseconds
    pub shutdown_grace_ms: u64,
}

impl ServiceConfig {
    /// Socket address assembled from `host` and `port`.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
            read_timeout_ms: 5000,    // 5 seconds
            write_timeout_ms: 10000,  // 10 seconds
            shutdown_grace_ms: 10000, // 10 seconds
        }
    }
}
