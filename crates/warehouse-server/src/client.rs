//! Client helpers for suppliers (stream, `ADD`) and requesters (datagram, `DELIVER`).
//!
//! Both connect with the timeouts from `ClientConfig`. The binaries in
//! `src/bin` are thin stdin loops over these types.

use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpStream, UdpSocket, UnixDatagram, UnixStream};
use tracing::{debug, warn};
use warehouse_core::config::{ClientConfig, ProtocolConfig};
use warehouse_core::{AtomKind, MoleculeKind, Result, WarehouseError};

static NEXT_REPLY_SOCKET: AtomicU64 = AtomicU64::new(0);

fn timed_out(what: String) -> WarehouseError {
    WarehouseError::Io {
        message: format!("Timed out {}", what),
        path: None,
        source: Some(io::Error::from(io::ErrorKind::TimedOut)),
    }
}

async fn with_timeout<T, F>(limit: Duration, what: impl FnOnce() -> String, fut: F) -> Result<T>
where
    F: std::future::Future<Output = io::Result<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(timed_out(what())),
    }
}

/// Connection used to send `ADD` commands.
#[derive(Debug)]
pub enum StreamSupplier {
    Tcp(TcpStream),
    Unix(UnixStream),
}

impl StreamSupplier {
    pub async fn connect_tcp(host: &str, port: u16) -> Result<Self> {
        let stream = with_timeout(
            ClientConfig::CONNECT_TIMEOUT,
            || format!("connecting to {}:{}", host, port),
            TcpStream::connect((host, port)),
        )
        .await?;
        debug!("Supplier connected to {}:{}", host, port);
        Ok(StreamSupplier::Tcp(stream))
    }

    pub async fn connect_unix(path: &Path) -> Result<Self> {
        let stream = with_timeout(
            ClientConfig::CONNECT_TIMEOUT,
            || format!("connecting to {}", path.display()),
            UnixStream::connect(path),
        )
        .await
        .map_err(|e| match e {
            WarehouseError::Io {
                source: Some(source),
                ..
            } => WarehouseError::io_with_path(source, path),
            other => other,
        })?;
        debug!("Supplier connected to {}", path.display());
        Ok(StreamSupplier::Unix(stream))
    }

    /// Send one newline-terminated command.
    pub async fn send_line(&mut self, line: &str) -> Result<()> {
        let mut message = String::with_capacity(line.len() + 1);
        message.push_str(line.trim_end_matches(['\r', '\n']));
        message.push('\n');

        match self {
            StreamSupplier::Tcp(stream) => {
                stream.write_all(message.as_bytes()).await?;
                stream.flush().await?;
            }
            StreamSupplier::Unix(stream) => {
                stream.write_all(message.as_bytes()).await?;
                stream.flush().await?;
            }
        }
        Ok(())
    }

    pub async fn add(&mut self, atom: AtomKind, amount: u64) -> Result<()> {
        self.send_line(&format!("ADD {} {}", atom, amount)).await
    }

    /// Close the write side so the server sees end of stream.
    pub async fn close(mut self) -> Result<()> {
        match &mut self {
            StreamSupplier::Tcp(stream) => stream.shutdown().await?,
            StreamSupplier::Unix(stream) => stream.shutdown().await?,
        }
        Ok(())
    }
}

#[derive(Debug)]
enum RequesterSocket {
    Udp(UdpSocket),
    Unix(UnixDatagram),
}

/// Datagram socket used to send `DELIVER` commands and await replies.
///
/// Over Unix datagrams the requester binds its own reply path under the
/// temp directory; the file is removed when the requester is dropped.
#[derive(Debug)]
pub struct DatagramRequester {
    socket: RequesterSocket,
    reply_path: Option<PathBuf>,
}

impl DatagramRequester {
    pub async fn connect_udp(host: &str, port: u16) -> Result<Self> {
        let server = tokio::net::lookup_host((host, port))
            .await?
            .next()
            .ok_or_else(|| WarehouseError::Config {
                message: format!("{}:{} did not resolve to any address", host, port),
            })?;

        let local = match server {
            SocketAddr::V4(_) => SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)),
            SocketAddr::V6(_) => SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0)),
        };
        let socket = UdpSocket::bind(local).await?;
        socket.connect(server).await?;
        debug!("Requester sending to {}", server);

        Ok(Self {
            socket: RequesterSocket::Udp(socket),
            reply_path: None,
        })
    }

    pub fn connect_unix(server_path: &Path) -> Result<Self> {
        let reply_path = std::env::temp_dir().join(format!(
            "{}{}_{}",
            ClientConfig::REPLY_SOCKET_PREFIX,
            std::process::id(),
            NEXT_REPLY_SOCKET.fetch_add(1, Ordering::Relaxed)
        ));
        match std::fs::remove_file(&reply_path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(WarehouseError::io_with_path(e, reply_path)),
        }

        let socket = UnixDatagram::bind(&reply_path)
            .map_err(|e| WarehouseError::bind(format!("reply socket {}", reply_path.display()), e))?;
        let requester = Self {
            socket: RequesterSocket::Unix(socket),
            reply_path: Some(reply_path),
        };

        if let RequesterSocket::Unix(socket) = &requester.socket {
            socket
                .connect(server_path)
                .map_err(|e| WarehouseError::io_with_path(e, server_path))?;
        }
        debug!("Requester sending to {}", server_path.display());
        Ok(requester)
    }

    /// Path of the bound reply socket, for Unix requesters.
    pub fn reply_path(&self) -> Option<&Path> {
        self.reply_path.as_deref()
    }

    /// Send one command and wait for the reply.
    pub async fn request(&self, line: &str) -> Result<String> {
        let line = line.trim_end_matches(['\r', '\n']);
        let mut buf = vec![0u8; ProtocolConfig::MAX_MESSAGE_BYTES];

        let n = match &self.socket {
            RequesterSocket::Udp(socket) => {
                socket.send(line.as_bytes()).await?;
                with_timeout(
                    ClientConfig::REPLY_TIMEOUT,
                    || "waiting for reply".to_string(),
                    socket.recv(&mut buf),
                )
                .await?
            }
            RequesterSocket::Unix(socket) => {
                socket.send(line.as_bytes()).await?;
                with_timeout(
                    ClientConfig::REPLY_TIMEOUT,
                    || "waiting for reply".to_string(),
                    socket.recv(&mut buf),
                )
                .await?
            }
        };

        Ok(String::from_utf8_lossy(&buf[..n]).into_owned())
    }

    pub async fn deliver(&self, molecule: MoleculeKind, count: u64) -> Result<String> {
        self.request(&format!("DELIVER {} {}", molecule, count)).await
    }
}

impl Drop for DatagramRequester {
    fn drop(&mut self) {
        if let Some(path) = self.reply_path.take() {
            if let Err(e) = std::fs::remove_file(&path) {
                if e.kind() != io::ErrorKind::NotFound {
                    warn!("Failed to remove reply socket {}: {}", path.display(), e);
                }
            }
        }
    }
}
