//! Atom supplier - sends `ADD` commands read from stdin over a stream socket.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use warehouse_server::logging::init_logging;
use warehouse_server::StreamSupplier;

#[derive(Parser, Debug)]
#[command(name = "atom-supplier")]
#[command(about = "Send ADD commands to a warehouse server, one per stdin line")]
struct Args {
    /// Server host
    #[arg(required_unless_present = "socket")]
    host: Option<String>,

    /// Server TCP port
    #[arg(required_unless_present = "socket")]
    port: Option<u16>,

    /// Unix stream socket path instead of host and port
    #[arg(short = 'f', long = "file", conflicts_with_all = ["host", "port"])]
    socket: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.debug);

    let mut supplier = match (&args.socket, &args.host, args.port) {
        (Some(path), _, _) => StreamSupplier::connect_unix(path).await?,
        (None, Some(host), Some(port)) => StreamSupplier::connect_tcp(host, port).await?,
        _ => anyhow::bail!("either <HOST> <PORT> or -f <PATH> is required"),
    };
    info!("Connected; enter commands like \"ADD HYDROGEN 4\"");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        supplier
            .send_line(line)
            .await
            .with_context(|| format!("Failed to send {:?}", line))?;
        info!("Sent {:?}", line);
    }

    supplier.close().await?;
    Ok(())
}
