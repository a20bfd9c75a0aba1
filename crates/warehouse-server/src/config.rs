//! Runtime configuration for the server.
//!
//! Built from command-line arguments by the binary, or directly by tests.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;
use warehouse_core::{AtomCounts, Result, WarehouseError};

/// Everything the server needs to bind, restore and run.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the network endpoints bind to.
    pub host: IpAddr,
    /// TCP port for ADD commands (0 = auto-assign).
    pub tcp_port: Option<u16>,
    /// UDP port for DELIVER commands (0 = auto-assign).
    pub udp_port: Option<u16>,
    /// Unix stream socket path for ADD commands.
    pub stream_path: Option<PathBuf>,
    /// Unix datagram socket path for DELIVER commands.
    pub datagram_path: Option<PathBuf>,
    /// Shut down after this long without a command.
    pub idle_timeout: Option<Duration>,
    /// Stock present before the save file (if any) is applied.
    pub initial_atoms: AtomCounts,
    /// Snapshot file loaded at startup and written on shutdown.
    pub save_file: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            tcp_port: None,
            udp_port: None,
            stream_path: None,
            datagram_path: None,
            idle_timeout: None,
            initial_atoms: AtomCounts::default(),
            save_file: None,
        }
    }
}

impl ServerConfig {
    /// Convert a timeout in whole seconds, where 0 disables the timer.
    pub fn idle_timeout_from_secs(secs: u64) -> Option<Duration> {
        (secs > 0).then(|| Duration::from_secs(secs))
    }

    pub fn tcp_addr(&self) -> Option<SocketAddr> {
        self.tcp_port.map(|port| SocketAddr::new(self.host, port))
    }

    pub fn udp_addr(&self) -> Option<SocketAddr> {
        self.udp_port.map(|port| SocketAddr::new(self.host, port))
    }

    /// Require at least one stream endpoint and one datagram endpoint.
    pub fn validate(&self) -> Result<()> {
        if self.tcp_port.is_none() && self.stream_path.is_none() {
            return Err(WarehouseError::Config {
                message: "no stream endpoint configured (use --tcp-port or --stream-path)"
                    .to_string(),
            });
        }
        if self.udp_port.is_none() && self.datagram_path.is_none() {
            return Err(WarehouseError::Config {
                message: "no datagram endpoint configured (use --udp-port or --datagram-path)"
                    .to_string(),
            });
        }
        if let (Some(stream), Some(datagram)) = (&self.stream_path, &self.datagram_path) {
            if stream == datagram {
                return Err(WarehouseError::Config {
                    message: format!(
                        "stream and datagram sockets share the path {}",
                        stream.display()
                    ),
                });
            }
        }
        Ok(())
    }
}
