//! The ordered set of event sources the loop waits on.
//!
//! Every socket and the console live in one collection so that a single
//! poll reports readiness for all of them. Sources keep their registration
//! order; a readiness pass reports them in that order.

use crate::console::ConsoleSource;
use crate::transport::{DatagramEndpoint, StreamConnection, StreamListener};
use std::io;
use std::task::{Context, Poll};

/// Stable handle for a registered source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(u64);

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An accepted stream client.
#[derive(Debug)]
pub struct ClientRegistration {
    pub connection: StreamConnection,
    pub peer: String,
    /// Listener that accepted this client.
    pub listener: SourceId,
}

/// One thing the loop can wait on.
#[derive(Debug)]
pub enum Source {
    Listener(StreamListener),
    Connection(ClientRegistration),
    Datagram(DatagramEndpoint),
    Console(ConsoleSource),
}

impl Source {
    pub fn label(&self) -> &'static str {
        match self {
            Source::Listener(listener) => listener.label(),
            Source::Connection(client) => client.connection.label(),
            Source::Datagram(endpoint) => endpoint.label(),
            Source::Console(_) => "CONSOLE",
        }
    }

    /// Release the source, removing any socket file it owns.
    pub fn close(self) {
        match self {
            Source::Listener(listener) => listener.close(),
            Source::Datagram(endpoint) => endpoint.close(),
            Source::Connection(_) | Source::Console(_) => {}
        }
    }
}

/// A readiness event observed in one pass.
#[derive(Debug)]
pub enum Readiness {
    /// A listener produced a new connection; it is not registered yet.
    Accepted {
        listener: SourceId,
        connection: StreamConnection,
        peer: String,
    },
    AcceptFailed { listener: SourceId, error: io::Error },
    /// A connection or datagram endpoint may be read without blocking.
    Readable(SourceId),
    ConsoleLine { source: SourceId, line: String },
    /// The console reached end of input or failed.
    ConsoleClosed {
        source: SourceId,
        error: Option<io::Error>,
    },
}

/// Registered sources in registration order.
#[derive(Debug, Default)]
pub struct SourceSet {
    entries: Vec<(SourceId, Source)>,
    next_id: u64,
}

impl SourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, source: Source) -> SourceId {
        let id = SourceId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, source));
        id
    }

    /// Deregister a source. Returns `None` if it was already removed.
    pub fn remove(&mut self, id: SourceId) -> Option<Source> {
        let index = self.entries.iter().position(|(entry, _)| *entry == id)?;
        Some(self.entries.remove(index).1)
    }

    pub fn get(&self, id: SourceId) -> Option<&Source> {
        self.entries
            .iter()
            .find(|(entry, _)| *entry == id)
            .map(|(_, source)| source)
    }

    pub fn get_mut(&mut self, id: SourceId) -> Option<&mut Source> {
        self.entries
            .iter_mut()
            .find(|(entry, _)| *entry == id)
            .map(|(_, source)| source)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SourceId, &Source)> {
        self.entries.iter().map(|(id, source)| (*id, source))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of registered stream clients.
    pub fn connection_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, source)| matches!(source, Source::Connection(_)))
            .count()
    }

    /// Poll every source once and collect what is ready.
    ///
    /// Each source contributes at most one event per pass. Returns `Pending`
    /// only when nothing is ready, in which case every source has registered
    /// a wake-up.
    pub fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Vec<Readiness>> {
        let mut ready = Vec::new();

        for (id, source) in self.entries.iter_mut() {
            let id = *id;
            match source {
                Source::Listener(listener) => match listener.poll_accept(cx) {
                    Poll::Ready(Ok((connection, peer))) => ready.push(Readiness::Accepted {
                        listener: id,
                        connection,
                        peer,
                    }),
                    Poll::Ready(Err(error)) => {
                        ready.push(Readiness::AcceptFailed { listener: id, error })
                    }
                    Poll::Pending => {}
                },
                // Errors surface again on the read that follows.
                Source::Connection(client) => {
                    if client.connection.poll_read_ready(cx).is_ready() {
                        ready.push(Readiness::Readable(id));
                    }
                }
                Source::Datagram(endpoint) => {
                    if endpoint.poll_recv_ready(cx).is_ready() {
                        ready.push(Readiness::Readable(id));
                    }
                }
                Source::Console(console) => match console.poll_line(cx) {
                    Poll::Ready(Ok(Some(line))) => {
                        ready.push(Readiness::ConsoleLine { source: id, line })
                    }
                    Poll::Ready(Ok(None)) => ready.push(Readiness::ConsoleClosed {
                        source: id,
                        error: None,
                    }),
                    Poll::Ready(Err(error)) => ready.push(Readiness::ConsoleClosed {
                        source: id,
                        error: Some(error),
                    }),
                    Poll::Pending => {}
                },
            }
        }

        if ready.is_empty() {
            Poll::Pending
        } else {
            Poll::Ready(ready)
        }
    }

    /// Remove every source, in registration order.
    pub fn drain(&mut self) -> Vec<Source> {
        self.entries.drain(..).map(|(_, source)| source).collect()
    }
}
