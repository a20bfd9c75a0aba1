//! Datagram endpoints (UDP and Unix).
//!
//! One packet is one command; the reply goes back to the packet's source
//! address instead of a persistent connection.

use super::{cleanup_socket_file, first_line, remove_socket_file};
use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::task::{Context, Poll};
use tokio::net::{UdpSocket, UnixDatagram};
use warehouse_core::{Result, WarehouseError};

/// Where to send the reply for one datagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnAddress {
    Inet(SocketAddr),
    /// Unix peers can only be answered if they bound a path.
    Unix(Option<PathBuf>),
}

impl std::fmt::Display for ReturnAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReturnAddress::Inet(addr) => write!(f, "{}", addr),
            ReturnAddress::Unix(Some(path)) => write!(f, "{}", path.display()),
            ReturnAddress::Unix(None) => write!(f, "unnamed peer"),
        }
    }
}

/// Result of one non-blocking receive.
#[derive(Debug)]
pub enum DatagramRead {
    Message(String, ReturnAddress),
    WouldBlock,
    /// Receive failed; the endpoint stays registered.
    Failed(io::Error),
}

/// A bound datagram endpoint.
#[derive(Debug)]
pub enum DatagramEndpoint {
    Udp(UdpSocket),
    Unix { socket: UnixDatagram, path: PathBuf },
}

impl DatagramEndpoint {
    pub async fn bind_udp(addr: SocketAddr) -> Result<Self> {
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|e| WarehouseError::bind(format!("UDP {}", addr), e))?;
        Ok(DatagramEndpoint::Udp(socket))
    }

    /// Bind a Unix datagram socket, replacing a stale socket file at `path`.
    pub fn bind_unix(path: &Path) -> Result<Self> {
        remove_socket_file(path).map_err(|e| WarehouseError::io_with_path(e, path))?;
        let socket = UnixDatagram::bind(path)
            .map_err(|e| WarehouseError::bind(format!("Unix datagram {}", path.display()), e))?;
        Ok(DatagramEndpoint::Unix {
            socket,
            path: path.to_path_buf(),
        })
    }

    pub fn label(&self) -> &'static str {
        match self {
            DatagramEndpoint::Udp(_) => "UDP",
            DatagramEndpoint::Unix { .. } => "UDS-DGRAM",
        }
    }

    pub fn inet_addr(&self) -> Option<SocketAddr> {
        match self {
            DatagramEndpoint::Udp(socket) => socket.local_addr().ok(),
            DatagramEndpoint::Unix { .. } => None,
        }
    }

    pub fn local_description(&self) -> String {
        match self {
            DatagramEndpoint::Udp(socket) => match socket.local_addr() {
                Ok(addr) => addr.to_string(),
                Err(_) => "<unknown>".to_string(),
            },
            DatagramEndpoint::Unix { path, .. } => path.display().to_string(),
        }
    }

    pub fn poll_recv_ready(&self, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self {
            DatagramEndpoint::Udp(socket) => socket.poll_recv_ready(cx),
            DatagramEndpoint::Unix { socket, .. } => socket.poll_recv_ready(cx),
        }
    }

    /// Receive one packet without blocking.
    pub fn read_message(&self, buf: &mut [u8]) -> DatagramRead {
        let received = match self {
            DatagramEndpoint::Udp(socket) => socket
                .try_recv_from(buf)
                .map(|(n, addr)| (n, ReturnAddress::Inet(addr))),
            DatagramEndpoint::Unix { socket, .. } => socket.try_recv_from(buf).map(|(n, addr)| {
                (n, ReturnAddress::Unix(addr.as_pathname().map(Path::to_path_buf)))
            }),
        };

        match received {
            Ok((n, from)) => DatagramRead::Message(first_line(&buf[..n]).0, from),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => DatagramRead::WouldBlock,
            Err(e) => DatagramRead::Failed(e),
        }
    }

    /// Send `reply` to `to` without blocking.
    ///
    /// A full send buffer drops the reply with a `WouldBlock` error.
    pub fn send_reply(&self, reply: &str, to: &ReturnAddress) -> io::Result<()> {
        let sent = match (self, to) {
            (DatagramEndpoint::Udp(socket), ReturnAddress::Inet(addr)) => {
                socket.try_send_to(reply.as_bytes(), *addr)?
            }
            (DatagramEndpoint::Unix { socket, .. }, ReturnAddress::Unix(Some(path))) => {
                socket.try_send_to(reply.as_bytes(), path)?
            }
            (DatagramEndpoint::Unix { .. }, ReturnAddress::Unix(None)) => {
                return Err(io::Error::new(
                    io::ErrorKind::AddrNotAvailable,
                    "peer did not bind a reply path",
                ));
            }
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "return address does not match endpoint kind",
                ));
            }
        };

        if sent < reply.len() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("reply truncated ({} of {} bytes)", sent, reply.len()),
            ));
        }
        Ok(())
    }

    /// Remove the socket file of a Unix endpoint.
    pub fn close(self) {
        if let DatagramEndpoint::Unix { path, .. } = self {
            cleanup_socket_file(&path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::poll_fn;

    #[tokio::test]
    async fn test_udp_receive_and_reply() {
        let endpoint = DatagramEndpoint::bind_udp("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        let server_addr = endpoint.inet_addr().unwrap();

        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        client.send_to(b"DELIVER WATER 2", server_addr).await.unwrap();

        let mut buf = [0u8; 64];
        let (line, from) = loop {
            poll_fn(|cx| endpoint.poll_recv_ready(cx)).await.unwrap();
            match endpoint.read_message(&mut buf) {
                DatagramRead::Message(line, from) => break (line, from),
                DatagramRead::WouldBlock => continue,
                DatagramRead::Failed(e) => panic!("recv failed: {e}"),
            }
        };
        assert_eq!(line, "DELIVER WATER 2");
        assert_eq!(from, ReturnAddress::Inet(client.local_addr().unwrap()));

        endpoint.send_reply("OK 2", &from).unwrap();
        let (n, _) = client.recv_from(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"OK 2");
    }

    #[tokio::test]
    async fn test_unix_unnamed_peer_cannot_be_answered() {
        let dir = tempfile::TempDir::new().unwrap();
        let endpoint = DatagramEndpoint::bind_unix(&dir.path().join("dgram.sock")).unwrap();

        let err = endpoint
            .send_reply("OK 1", &ReturnAddress::Unix(None))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AddrNotAvailable);

        let err = endpoint
            .send_reply("OK 1", &ReturnAddress::Inet("127.0.0.1:9".parse().unwrap()))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
