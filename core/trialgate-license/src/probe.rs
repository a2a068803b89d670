//! Connectivity pre-check run before prompting for a key.

use async_trait::async_trait;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::debug;

use crate::config::ActivationConfig;

/// Reports whether outbound network access is available.
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    /// Sends one bounded probe. Only an explicit success yields true.
    async fn is_available(&self) -> bool;
}

/// Probes reachability by opening a TCP connection to a well-known address
/// (by default `8.8.8.8:53`).
#[derive(Debug, Clone)]
pub struct TcpProbe {
    addr: SocketAddr,
    timeout: Duration,
}

impl TcpProbe {
    /// Creates a probe for `addr` bounded by `timeout`.
    #[must_use]
    pub fn new(addr: SocketAddr, timeout: Duration) -> Self {
        Self { addr, timeout }
    }

    /// Creates a probe from the configured address and timeout.
    #[must_use]
    pub fn from_config(config: &ActivationConfig) -> Self {
        Self::new(config.connectivity_probe_addr, config.probe_timeout())
    }
}

#[async_trait]
impl ConnectivityProbe for TcpProbe {
    async fn is_available(&self) -> bool {
        match tokio::time::timeout(self.timeout, TcpStream::connect(self.addr)).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                debug!("Connectivity probe to {} failed: {}", self.addr, e);
                false
            }
            Err(_) => {
                debug!("Connectivity probe to {} timed out after {:?}", self.addr, self.timeout);
                false
            }
        }
    }
}
