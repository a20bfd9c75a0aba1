//! Stream listeners and accepted connections (TCP and Unix).

use super::{cleanup_socket_file, first_line, remove_socket_file};
use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::task::{Context, Poll};
use tokio::net::{TcpListener, TcpStream, UnixListener, UnixStream};
use tracing::warn;
use warehouse_core::{Result, WarehouseError};

/// A listening stream endpoint.
#[derive(Debug)]
pub enum StreamListener {
    Tcp(TcpListener),
    Unix { listener: UnixListener, path: PathBuf },
}

impl StreamListener {
    pub async fn bind_tcp(addr: SocketAddr) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| WarehouseError::bind(format!("TCP {}", addr), e))?;
        Ok(StreamListener::Tcp(listener))
    }

    /// Bind a Unix stream socket, replacing a stale socket file at `path`.
    pub fn bind_unix(path: &Path) -> Result<Self> {
        remove_socket_file(path).map_err(|e| WarehouseError::io_with_path(e, path))?;
        let listener = UnixListener::bind(path)
            .map_err(|e| WarehouseError::bind(format!("Unix stream {}", path.display()), e))?;
        Ok(StreamListener::Unix {
            listener,
            path: path.to_path_buf(),
        })
    }

    /// Short tag used in log lines.
    pub fn label(&self) -> &'static str {
        match self {
            StreamListener::Tcp(_) => "TCP",
            StreamListener::Unix { .. } => "UDS-STREAM",
        }
    }

    pub fn inet_addr(&self) -> Option<SocketAddr> {
        match self {
            StreamListener::Tcp(listener) => listener.local_addr().ok(),
            StreamListener::Unix { .. } => None,
        }
    }

    pub fn local_description(&self) -> String {
        match self {
            StreamListener::Tcp(listener) => match listener.local_addr() {
                Ok(addr) => addr.to_string(),
                Err(_) => "<unknown>".to_string(),
            },
            StreamListener::Unix { path, .. } => path.display().to_string(),
        }
    }

    /// Accept one pending connection, registering for wake-up if none is.
    ///
    /// Returns the connection and a printable peer description.
    pub fn poll_accept(&self, cx: &mut Context<'_>) -> Poll<io::Result<(StreamConnection, String)>> {
        match self {
            StreamListener::Tcp(listener) => listener
                .poll_accept(cx)
                .map_ok(|(stream, peer)| (StreamConnection::Tcp(stream), peer.to_string())),
            StreamListener::Unix { listener, .. } => {
                listener.poll_accept(cx).map_ok(|(stream, peer)| {
                    let peer = match peer.as_pathname() {
                        Some(path) => path.display().to_string(),
                        None => "unnamed peer".to_string(),
                    };
                    (StreamConnection::Unix(stream), peer)
                })
            }
        }
    }

    /// Remove the socket file of a Unix listener.
    pub fn close(self) {
        if let StreamListener::Unix { path, .. } = self {
            cleanup_socket_file(&path);
        }
    }
}

/// Result of one non-blocking read from a connection.
#[derive(Debug)]
pub enum StreamRead {
    /// One command's worth of text.
    Message(String),
    /// Readiness was stale; nothing to do until the next wake-up.
    WouldBlock,
    /// The peer closed the connection.
    Closed,
    /// The read failed; the connection must be torn down.
    Failed(io::Error),
}

/// An accepted stream connection.
#[derive(Debug)]
pub enum StreamConnection {
    Tcp(TcpStream),
    Unix(UnixStream),
}

impl StreamConnection {
    pub fn label(&self) -> &'static str {
        match self {
            StreamConnection::Tcp(_) => "TCP",
            StreamConnection::Unix(_) => "UDS-STREAM",
        }
    }

    pub fn poll_read_ready(&self, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self {
            StreamConnection::Tcp(stream) => stream.poll_read_ready(cx),
            StreamConnection::Unix(stream) => stream.poll_read_ready(cx),
        }
    }

    fn try_read(&self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            StreamConnection::Tcp(stream) => stream.try_read(buf),
            StreamConnection::Unix(stream) => stream.try_read(buf),
        }
    }

    /// Read at most one buffer and treat it as exactly one command.
    ///
    /// There is no framing: a command must arrive in a single read. Only the
    /// first line is kept.
    pub fn read_message(&self, buf: &mut [u8]) -> StreamRead {
        match self.try_read(buf) {
            Ok(0) => StreamRead::Closed,
            Ok(n) => {
                let (line, dropped) = first_line(&buf[..n]);
                if dropped {
                    warn!(
                        "[{}] Discarded trailing bytes after {:?} (one command per read)",
                        self.label(),
                        line
                    );
                }
                StreamRead::Message(line)
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => StreamRead::WouldBlock,
            Err(e) => StreamRead::Failed(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::poll_fn;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn test_tcp_accept_and_read() {
        let listener = StreamListener::bind_tcp("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        let addr = listener.inet_addr().unwrap();

        let mut client = TcpStream::connect(addr).await.unwrap();
        let (connection, _peer) = poll_fn(|cx| listener.poll_accept(cx)).await.unwrap();
        assert_eq!(connection.label(), "TCP");

        client.write_all(b"ADD CARBON 3\n").await.unwrap();
        poll_fn(|cx| connection.poll_read_ready(cx)).await.unwrap();

        let mut buf = [0u8; 64];
        match connection.read_message(&mut buf) {
            StreamRead::Message(line) => assert_eq!(line, "ADD CARBON 3"),
            other => panic!("unexpected read: {other:?}"),
        }

        drop(client);
        loop {
            poll_fn(|cx| connection.poll_read_ready(cx)).await.unwrap();
            match connection.read_message(&mut buf) {
                StreamRead::WouldBlock => continue,
                StreamRead::Closed => break,
                other => panic!("unexpected read: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_unix_listener_replaces_stale_file_and_cleans_up() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("stream.sock");
        std::fs::write(&path, b"stale").unwrap();

        let listener = StreamListener::bind_unix(&path).unwrap();
        assert_eq!(listener.label(), "UDS-STREAM");
        assert!(listener.inet_addr().is_none());
        assert!(path.exists());

        listener.close();
        assert!(!path.exists());
    }
}
