//! Startup restore, idle timeout, termination signals and shutdown persistence.

use crate::config::ServerConfig;
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{error, info, warn};
use warehouse_core::{load_snapshot, save_snapshot, Inventory, InventorySnapshot, Result};

/// Why the event loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    IdleTimeout,
    /// A termination signal, by name.
    Signal(&'static str),
    /// Requested programmatically through a [`ShutdownTrigger`].
    Requested,
}

impl std::fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShutdownReason::IdleTimeout => write!(f, "idle timeout"),
            ShutdownReason::Signal(name) => write!(f, "signal {}", name),
            ShutdownReason::Requested => write!(f, "shutdown request"),
        }
    }
}

/// Sending half of the loop's control channel.
#[derive(Debug, Clone)]
pub struct ShutdownTrigger {
    tx: mpsc::UnboundedSender<ShutdownReason>,
}

impl ShutdownTrigger {
    /// Ask the loop to shut down. Returns false if it already stopped.
    pub fn request(&self, reason: ShutdownReason) -> bool {
        self.tx.send(reason).is_ok()
    }
}

pub(crate) fn control_channel() -> (ShutdownTrigger, mpsc::UnboundedReceiver<ShutdownReason>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ShutdownTrigger { tx }, rx)
}

/// Single inactivity deadline; `None` timeout means it never fires.
#[derive(Debug)]
pub struct IdleTimer {
    timeout: Option<Duration>,
    deadline: Option<Instant>,
}

impl IdleTimer {
    /// Create the timer, armed from now.
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            timeout,
            deadline: timeout.map(|t| Instant::now() + t),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Restart the full timeout from now.
    pub fn rearm(&mut self) {
        self.deadline = self.timeout.map(|t| Instant::now() + t);
    }

    /// Completes when the deadline passes; never completes when disabled.
    pub async fn expired(&self) {
        match self.deadline {
            Some(deadline) => sleep_until(deadline).await,
            None => std::future::pending::<()>().await,
        }
    }
}

/// Forward SIGINT and SIGTERM to the control channel.
pub fn spawn_signal_listener(trigger: ShutdownTrigger) -> JoinHandle<()> {
    use tokio::signal::unix::{signal, SignalKind};

    // Registered before spawning so a SIGTERM right after startup is caught.
    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(stream) => Some(stream),
        Err(e) => {
            warn!("Failed to install SIGTERM handler: {}", e);
            None
        }
    };

    tokio::spawn(async move {
        let name = tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    error!("Failed to listen for Ctrl-C: {}", e);
                    return;
                }
                "SIGINT"
            }
            _ = async {
                match terminate.as_mut() {
                    Some(stream) => { stream.recv().await; }
                    None => std::future::pending::<()>().await,
                }
            } => "SIGTERM",
        };

        info!("Received {}, shutting down", name);
        trigger.request(ShutdownReason::Signal(name));
    })
}

/// Build the starting inventory: command-line atoms, then the save file on top.
pub fn restore_inventory(config: &ServerConfig) -> Result<Inventory> {
    let base = Inventory::with_atoms(config.initial_atoms).snapshot();

    let snapshot = match &config.save_file {
        Some(path) => load_snapshot(path, base)?.unwrap_or(base),
        None => base,
    };

    Ok(Inventory::from(snapshot))
}

/// Write the shutdown snapshot. Failures are logged, never propagated.
pub fn persist(path: &Path, snapshot: &InventorySnapshot) -> bool {
    match save_snapshot(path, snapshot) {
        Ok(()) => true,
        Err(e) => {
            error!("Failed to save inventory to {}: {}", path.display(), e);
            false
        }
    }
}
