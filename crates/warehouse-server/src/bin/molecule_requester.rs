//! Molecule requester - sends `DELIVER` commands read from stdin as datagrams.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;
use warehouse_server::logging::init_logging;
use warehouse_server::DatagramRequester;

#[derive(Parser, Debug)]
#[command(name = "molecule-requester")]
#[command(about = "Send DELIVER commands to a warehouse server and print the replies")]
struct Args {
    /// Server host
    #[arg(required_unless_present = "socket")]
    host: Option<String>,

    /// Server UDP port
    #[arg(required_unless_present = "socket")]
    port: Option<u16>,

    /// Unix datagram socket path instead of host and port
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

    let requester = match (&args.socket, &args.host, args.port) {
        (Some(path), _, _) => DatagramRequester::connect_unix(path)?,
        (None, Some(host), Some(port)) => DatagramRequester::connect_udp(host, port).await?,
        _ => anyhow::bail!("either <HOST> <PORT> or -f <PATH> is required"),
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match requester.request(line).await {
            Ok(reply) => println!("Server response: {}", reply),
            Err(e) => warn!("No reply to {:?}: {}", line, e),
        }
    }

    Ok(())
}
