//! Warehouse Server - multi-transport front end for `warehouse-core`.
//!
//! Binds TCP and Unix stream endpoints for `ADD`, UDP and Unix datagram
//! endpoints for `DELIVER` and reads `GEN` queries from the console, all
//! multiplexed by one [`EventLoop`] that owns the inventory.

pub mod client;
pub mod config;
pub mod console;
pub mod event_loop;
pub mod lifecycle;
pub mod logging;
pub mod source;
pub mod transport;

pub use client::{DatagramRequester, StreamSupplier};
pub use config::ServerConfig;
pub use console::ConsoleSource;
pub use event_loop::{EventLoop, ShutdownSummary};
pub use lifecycle::{spawn_signal_listener, ShutdownReason, ShutdownTrigger};
pub use source::{Source, SourceId, SourceSet};
pub use transport::Endpoints;
