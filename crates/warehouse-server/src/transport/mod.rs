//! Transport adapters for the four endpoint kinds.
//!
//! Every adapter is non-blocking: reads, accepts and sends use the `poll_*`
//! and `try_*` forms and are only attempted after the event loop has seen
//! readiness for that handle.
//!
//! | Endpoint | Type | Commands |
//! |---|---|---|
//! | TCP listener / connection | [`StreamListener`] / [`StreamConnection`] | `ADD` |
//! | Unix stream listener / connection | [`StreamListener`] / [`StreamConnection`] | `ADD` |
//! | UDP socket | [`DatagramEndpoint`] | `DELIVER` |
//! | Unix datagram socket | [`DatagramEndpoint`] | `DELIVER` |

mod datagram;
mod stream;

pub use datagram::{DatagramEndpoint, DatagramRead, ReturnAddress};
pub use stream::{StreamConnection, StreamListener, StreamRead};

use crate::config::ServerConfig;
use std::io;
use std::net::SocketAddr;
use std::path::Path;
use tracing::{info, warn};
use warehouse_core::Result;

/// All endpoints bound for one server run.
#[derive(Debug, Default)]
pub struct Endpoints {
    pub listeners: Vec<StreamListener>,
    pub datagrams: Vec<DatagramEndpoint>,
}

impl Endpoints {
    /// Bind every endpoint named in `config`.
    ///
    /// Any failure is fatal: the caller should exit before entering the loop.
    pub async fn bind(config: &ServerConfig) -> Result<Self> {
        let mut endpoints = Endpoints::default();

        if let Some(addr) = config.tcp_addr() {
            endpoints.listeners.push(StreamListener::bind_tcp(addr).await?);
        }
        if let Some(path) = &config.stream_path {
            endpoints.listeners.push(StreamListener::bind_unix(path)?);
        }
        if let Some(addr) = config.udp_addr() {
            endpoints.datagrams.push(DatagramEndpoint::bind_udp(addr).await?);
        }
        if let Some(path) = &config.datagram_path {
            endpoints.datagrams.push(DatagramEndpoint::bind_unix(path)?);
        }

        for listener in &endpoints.listeners {
            info!("[{}] Listening on {}", listener.label(), listener.local_description());
        }
        for endpoint in &endpoints.datagrams {
            info!("[{}] Listening on {}", endpoint.label(), endpoint.local_description());
        }

        Ok(endpoints)
    }

    /// Actual TCP address (useful when port 0 was requested).
    pub fn tcp_addr(&self) -> Option<SocketAddr> {
        self.listeners.iter().find_map(StreamListener::inet_addr)
    }

    /// Actual UDP address (useful when port 0 was requested).
    pub fn udp_addr(&self) -> Option<SocketAddr> {
        self.datagrams.iter().find_map(DatagramEndpoint::inet_addr)
    }
}

/// Decode one message: the first line of the buffer, without its newline.
///
/// Returns the command text and whether anything after the first line was
/// dropped.
pub(crate) fn first_line(bytes: &[u8]) -> (String, bool) {
    let text = String::from_utf8_lossy(bytes);
    match text.split_once('\n') {
        Some((line, rest)) => (
            line.trim_end_matches('\r').to_string(),
            !rest.trim().is_empty(),
        ),
        None => (text.trim_end_matches('\r').to_string(), false),
    }
}

/// Remove a stale socket file so the path can be bound again.
pub(crate) fn remove_socket_file(path: &Path) -> io::Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Best-effort removal of a socket file at shutdown.
pub(crate) fn cleanup_socket_file(path: &Path) {
    if let Err(e) = remove_socket_file(path) {
        warn!("Failed to remove socket file {}: {}", path.display(), e);
    }
}
