//! The single-task readiness loop that owns the inventory.
//!
//! # Concurrency
//!
//! The loop runs as one task on a current-thread runtime. Its only
//! suspension point is one `select!` over the control channel, the idle
//! deadline and the readiness of the whole [`SourceSet`]. Everything else
//! (accepts, reads, dispatch, replies) happens synchronously inside a
//! readiness pass, so commands are applied in the order they were observed
//! and the inventory needs no locking.

use crate::config::ServerConfig;
use crate::console::ConsoleSource;
use crate::lifecycle::{self, IdleTimer, ShutdownReason, ShutdownTrigger};
use crate::source::{ClientRegistration, Readiness, Source, SourceId, SourceSet};
use crate::transport::{DatagramRead, Endpoints, StreamRead};
use std::future::poll_fn;
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};
use warehouse_core::command::dispatch;
use warehouse_core::config::ProtocolConfig;
use warehouse_core::{Applied, Channel, Inventory, InventorySnapshot, Outcome, Result};

/// What the loop reports once it has stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShutdownSummary {
    pub reason: ShutdownReason,
    /// Inventory at the moment of shutdown.
    pub snapshot: InventorySnapshot,
    /// True if the snapshot was written to the save file.
    pub persisted: bool,
}

enum LoopEvent {
    Control(Option<ShutdownReason>),
    IdleExpired,
    Ready(Vec<Readiness>),
}

/// The warehouse event loop.
pub struct EventLoop {
    inventory: Inventory,
    sources: SourceSet,
    idle: IdleTimer,
    save_path: Option<PathBuf>,
    trigger: ShutdownTrigger,
    control: mpsc::UnboundedReceiver<ShutdownReason>,
    snapshots: watch::Sender<InventorySnapshot>,
    buf: Vec<u8>,
}

impl EventLoop {
    pub fn new(
        inventory: Inventory,
        idle_timeout: Option<Duration>,
        save_path: Option<PathBuf>,
    ) -> Self {
        let (trigger, control) = lifecycle::control_channel();
        let (snapshots, _) = watch::channel(inventory.snapshot());
        Self {
            inventory,
            sources: SourceSet::new(),
            idle: IdleTimer::new(idle_timeout),
            save_path,
            trigger,
            control,
            snapshots,
            buf: vec![0; ProtocolConfig::MAX_MESSAGE_BYTES],
        }
    }

    /// Validate `config`, restore the inventory and bind every endpoint.
    ///
    /// The console is not attached; callers add it with [`add_source`](Self::add_source).
    pub async fn from_config(config: &ServerConfig) -> Result<Self> {
        config.validate()?;
        let inventory = lifecycle::restore_inventory(config)?;
        let endpoints = Endpoints::bind(config).await?;

        let mut event_loop = Self::new(inventory, config.idle_timeout, config.save_file.clone());
        event_loop.add_endpoints(endpoints);
        Ok(event_loop)
    }

    /// Register bound endpoints: stream listeners first, then datagram sockets.
    pub fn add_endpoints(&mut self, endpoints: Endpoints) {
        for listener in endpoints.listeners {
            self.sources.insert(Source::Listener(listener));
        }
        for endpoint in endpoints.datagrams {
            self.sources.insert(Source::Datagram(endpoint));
        }
    }

    pub fn add_source(&mut self, source: Source) -> SourceId {
        self.sources.insert(source)
    }

    pub fn add_console(&mut self, console: ConsoleSource) -> SourceId {
        self.add_source(Source::Console(console))
    }

    /// Handle for requesting shutdown from outside the loop.
    pub fn shutdown_trigger(&self) -> ShutdownTrigger {
        self.trigger.clone()
    }

    /// Receive the inventory snapshot published after every readiness pass.
    pub fn subscribe(&self) -> watch::Receiver<InventorySnapshot> {
        self.snapshots.subscribe()
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn sources(&self) -> &SourceSet {
        &self.sources
    }

    /// Bound TCP address, if a TCP listener is registered.
    pub fn tcp_addr(&self) -> Option<SocketAddr> {
        self.sources.iter().find_map(|(_, source)| match source {
            Source::Listener(listener) => listener.inet_addr(),
            _ => None,
        })
    }

    /// Bound UDP address, if a UDP socket is registered.
    pub fn udp_addr(&self) -> Option<SocketAddr> {
        self.sources.iter().find_map(|(_, source)| match source {
            Source::Datagram(endpoint) => endpoint.inet_addr(),
            _ => None,
        })
    }

    /// Run until the idle timeout elapses or shutdown is requested.
    pub async fn run(mut self) -> ShutdownSummary {
        self.idle.rearm();
        info!(
            sources = self.sources.len(),
            timeout_secs = self.idle.timeout().map(|t| t.as_secs()),
            "Event loop started"
        );

        let reason = loop {
            let event = tokio::select! {
                biased;
                reason = self.control.recv() => LoopEvent::Control(reason),
                _ = self.idle.expired() => LoopEvent::IdleExpired,
                ready = poll_fn(|cx| self.sources.poll_ready(cx)) => LoopEvent::Ready(ready),
            };

            match event {
                LoopEvent::Control(reason) => break reason.unwrap_or(ShutdownReason::Requested),
                LoopEvent::IdleExpired => {
                    info!("No activity for the idle timeout, shutting down");
                    break ShutdownReason::IdleTimeout;
                }
                LoopEvent::Ready(ready) => self.dispatch_pass(ready),
            }
        };

        self.shutdown(reason)
    }

    /// Handle every event of one readiness pass, in order.
    fn dispatch_pass(&mut self, ready: Vec<Readiness>) {
        let mut accepted = Vec::new();

        for event in ready {
            match event {
                Readiness::Accepted {
                    listener,
                    connection,
                    peer,
                } => {
                    info!(
                        connections = self.sources.connection_count() + accepted.len() + 1,
                        "[{}] Client connected: {}",
                        connection.label(),
                        peer
                    );
                    accepted.push(ClientRegistration {
                        connection,
                        peer,
                        listener,
                    });
                }
                Readiness::AcceptFailed { listener, error } => {
                    warn!("Accept failed on listener {}: {}", listener, error);
                }
                Readiness::Readable(id) => self.service(id),
                Readiness::ConsoleLine { source, line } => self.handle_console(source, &line),
                Readiness::ConsoleClosed { source, error } => {
                    match error {
                        Some(e) => warn!("[CONSOLE] Read failed, detaching console: {}", e),
                        None => info!("[CONSOLE] End of input, console detached"),
                    }
                    self.sources.remove(source);
                }
            }
        }

        // New clients are first waited on in the next pass.
        for client in accepted {
            self.sources.insert(Source::Connection(client));
        }

        let snapshot = self.inventory.snapshot();
        self.snapshots.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }

    /// Read from a ready connection or datagram endpoint.
    fn service(&mut self, id: SourceId) {
        match self.sources.get(id) {
            Some(Source::Connection(client)) => {
                let label = client.connection.label();
                match client.connection.read_message(&mut self.buf) {
                    StreamRead::Message(line) => {
                        self.handle_command(label, Channel::Stream, &line);
                    }
                    StreamRead::WouldBlock => {}
                    StreamRead::Closed => self.disconnect(id, None),
                    StreamRead::Failed(e) => self.disconnect(id, Some(e)),
                }
            }
            Some(Source::Datagram(endpoint)) => {
                let label = endpoint.label();
                match endpoint.read_message(&mut self.buf) {
                    DatagramRead::Message(line, from) => {
                        debug!("[{}] {:?} from {}", label, line, from);
                        if let Some(reply) = self.handle_command(label, Channel::Datagram, &line) {
                            if let Some(Source::Datagram(endpoint)) = self.sources.get(id) {
                                if let Err(e) = endpoint.send_reply(&reply, &from) {
                                    warn!("[{}] Failed to send reply to {}: {}", label, from, e);
                                }
                            }
                        }
                    }
                    DatagramRead::WouldBlock => {}
                    DatagramRead::Failed(e) => warn!("[{}] Receive failed: {}", label, e),
                }
            }
            // Removed earlier in this pass, or not a readable source.
            _ => {}
        }
    }

    fn handle_console(&mut self, source: SourceId, line: &str) {
        let Some(reply) = self.handle_command("CONSOLE", Channel::Console, line) else {
            return;
        };
        if let Some(Source::Console(console)) = self.sources.get_mut(source) {
            if let Err(e) = console.print(&reply) {
                warn!("[CONSOLE] Failed to write reply: {}", e);
            }
        }
    }

    /// Dispatch one command, log it, re-arm the idle timer and return the reply.
    fn handle_command(&mut self, label: &str, channel: Channel, line: &str) -> Option<String> {
        let outcome = dispatch(&mut self.inventory, channel, line);
        self.idle.rearm();

        match &outcome {
            Outcome::ParseError { reason } => {
                warn!("[{}] Invalid command {:?}: {}", label, line.trim(), reason);
            }
            Outcome::UnknownKind { name } => {
                warn!("[{}] Unknown name {:?} in {:?}", label, name, line.trim());
            }
            Outcome::Applied(Applied::Added {
                atom,
                amount,
                total,
            }) => {
                info!("[{}] Added {} {} (now {})", label, amount, atom, total);
            }
            Outcome::Applied(Applied::Delivered { molecule, count }) => {
                info!("[{}] Delivered {} {}", label, count, molecule);
            }
            Outcome::Applied(Applied::Capacity { drink, count }) => {
                info!("[{}] Capacity for {}: {}", label, drink, count);
            }
            Outcome::InsufficientResources {
                molecule,
                delivered,
                requested,
            } => {
                warn!(
                    "[{}] Delivered {} of {} {}: not enough atoms",
                    label, delivered, requested, molecule
                );
            }
        }

        if outcome.mutated() {
            let atoms = self.inventory.atoms();
            info!(
                hydrogen = atoms.hydrogen,
                oxygen = atoms.oxygen,
                carbon = atoms.carbon,
                "Atom stock"
            );
        }

        outcome.reply(channel)
    }

    fn disconnect(&mut self, id: SourceId, error: Option<io::Error>) {
        let Some(Source::Connection(client)) = self.sources.remove(id) else {
            return;
        };
        match error {
            Some(e) => warn!(
                "[{}] Connection to {} failed: {}",
                client.connection.label(),
                client.peer,
                e
            ),
            None => info!(
                connections = self.sources.connection_count(),
                "[{}] Client disconnected: {}",
                client.connection.label(),
                client.peer
            ),
        }
    }

    fn shutdown(mut self, reason: ShutdownReason) -> ShutdownSummary {
        info!("Shutting down ({})", reason);

        let snapshot = self.inventory.snapshot();
        let persisted = match &self.save_path {
            Some(path) => lifecycle::persist(path, &snapshot),
            None => false,
        };

        for source in self.sources.drain() {
            source.close();
        }
        self.snapshots.send_replace(snapshot);

        info!(persisted, "Server stopped");
        ShutdownSummary {
            reason,
            snapshot,
            persisted,
        }
    }
}
