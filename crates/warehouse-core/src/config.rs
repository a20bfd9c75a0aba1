//! Centralized configuration constants for the molecule warehouse.
//!
//! Runtime settings (ports, socket paths, timeout, save file) are parsed by
//! the server binary; this module only holds the fixed values shared by the
//! server, the clients and the tests.

use std::time::Duration;

/// Application-level configuration.
pub struct AppConfig;

impl AppConfig {
    pub const APP_NAME: &'static str = "Molecule Warehouse";
}

/// Wire protocol limits and defaults.
pub struct ProtocolConfig;

impl ProtocolConfig {
    /// Largest message read from a stream or datagram in one call.
    pub const MAX_MESSAGE_BYTES: usize = 1024;
    /// Count used when `DELIVER` carries no trailing number.
    pub const DEFAULT_DELIVER_COUNT: u64 = 1;
    /// Largest `DELIVER` count accepted. Production runs one unit at a time
    /// inside the event loop, so larger requests are rejected as malformed.
    pub const MAX_DELIVER_COUNT: u64 = 1_000_000;

    pub const REPLY_OK: &'static str = "OK";
    pub const REPLY_FAILED: &'static str = "FAILED";
    pub const REPLY_INVALID: &'static str = "Invalid command";
    pub const REPLY_UNKNOWN_CONSOLE: &'static str = "Unknown command.";
}

/// Snapshot file handling.
pub struct PersistenceConfig;

impl PersistenceConfig {
    /// Suffix appended to the save path while a snapshot is being written.
    pub const TEMP_SUFFIX: &'static str = "tmp";
}

/// Client-side timeouts.
pub struct ClientConfig;

impl ClientConfig {
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
    pub const REPLY_TIMEOUT: Duration = Duration::from_secs(5);
    /// Prefix of the per-process reply socket bound by datagram clients.
    pub const REPLY_SOCKET_PREFIX: &'static str = "molecule_client_";
}
