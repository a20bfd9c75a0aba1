//! Warehouse Server - molecule warehouse over TCP, UDP and Unix sockets.
//!
//! Stream clients supply atoms with `ADD`, datagram clients request
//! molecules with `DELIVER`, and the console answers `GEN` queries.

use anyhow::{Context, Result};
use clap::Parser;
use std::net::IpAddr;
use std::path::PathBuf;
use tracing::info;
use warehouse_core::config::AppConfig;
use warehouse_core::AtomCounts;
use warehouse_server::logging::init_logging;
use warehouse_server::{spawn_signal_listener, ConsoleSource, EventLoop, ServerConfig};

#[derive(Parser, Debug)]
#[command(name = "warehouse-server")]
#[command(about = "Molecule warehouse server")]
#[command(disable_help_flag = true)]
struct Args {
    /// TCP port for ADD commands (0 = auto-assign)
    #[arg(short = 'T', long)]
    tcp_port: Option<u16>,

    /// UDP port for DELIVER commands (0 = auto-assign)
    #[arg(short = 'U', long)]
    udp_port: Option<u16>,

    /// Address the TCP and UDP endpoints bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,

    /// Unix stream socket path for ADD commands
    #[arg(short = 's', long)]
    stream_path: Option<PathBuf>,

    /// Unix datagram socket path for DELIVER commands
    #[arg(short = 'd', long)]
    datagram_path: Option<PathBuf>,

    /// Shut down after this many seconds without a command (0 = never)
    #[arg(short = 't', long, default_value = "0")]
    timeout: u64,

    /// Initial oxygen atoms
    #[arg(short = 'o', long, default_value = "0")]
    oxygen: u64,

    /// Initial carbon atoms
    #[arg(short = 'c', long, default_value = "0")]
    carbon: u64,

    /// Initial hydrogen atoms
    #[arg(short = 'h', long, default_value = "0")]
    hydrogen: u64,

    /// Inventory file loaded at startup and written on shutdown
    #[arg(short = 'f', long)]
    save_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Print help
    #[arg(long, action = clap::ArgAction::Help)]
    help: Option<bool>,
}

impl Args {
    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.host,
            tcp_port: self.tcp_port,
            udp_port: self.udp_port,
            stream_path: self.stream_path.clone(),
            datagram_path: self.datagram_path.clone(),
            idle_timeout: ServerConfig::idle_timeout_from_secs(self.timeout),
            initial_atoms: AtomCounts::new(self.hydrogen, self.oxygen, self.carbon),
            save_file: self.save_file.clone(),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.debug);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")?;

    let result = runtime.block_on(serve(args.server_config()));

    // The stdin reader sits on a blocking thread that never returns on its own.
    runtime.shutdown_background();
    result
}

async fn serve(config: ServerConfig) -> Result<()> {
    info!("Starting {}", AppConfig::APP_NAME);

    let mut event_loop = EventLoop::from_config(&config)
        .await
        .context("Failed to start the server")?;
    event_loop.add_console(ConsoleSource::stdio());
    let signals = spawn_signal_listener(event_loop.shutdown_trigger());

    // Intentional stdout for launchers and tests that pick up the bound ports
    if let Some(addr) = event_loop.tcp_addr() {
        println!("TCP_PORT={}", addr.port());
    }
    if let Some(addr) = event_loop.udp_addr() {
        println!("UDP_PORT={}", addr.port());
    }

    let summary = event_loop.run().await;
    signals.abort();

    let atoms = summary.snapshot.atoms;
    info!(
        reason = %summary.reason,
        persisted = summary.persisted,
        hydrogen = atoms.hydrogen,
        oxygen = atoms.oxygen,
        carbon = atoms.carbon,
        "Shutdown complete"
    );
    Ok(())
}
