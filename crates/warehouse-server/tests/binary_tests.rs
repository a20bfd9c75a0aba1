//! End-to-end tests that spawn the `warehouse-server` binary.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::AsyncBufReadExt;
use warehouse_core::MoleculeKind;
use warehouse_server::DatagramRequester;

fn server_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_warehouse-server"))
}

/// Read stdout until both port lines have been printed.
async fn read_ports(
    lines: &mut tokio::io::Lines<tokio::io::BufReader<tokio::process::ChildStdout>>,
) -> Result<(u16, u16), String> {
    let mut tcp = None;
    let mut udp = None;
    let deadline = tokio::time::Instant::now() + Duration::from_secs(20);

    while tcp.is_none() || udp.is_none() {
        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        let line = match tokio::time::timeout(remaining, lines.next_line()).await {
            Ok(Ok(Some(line))) => line,
            Ok(Ok(None)) => return Err("server exited before printing its ports".into()),
            Ok(Err(err)) => return Err(format!("failed to read server stdout: {err}")),
            Err(_) => return Err("timed out waiting for port lines".into()),
        };
        if let Some(value) = line.strip_prefix("TCP_PORT=") {
            tcp = Some(value.trim().parse::<u16>().map_err(|e| e.to_string())?);
        } else if let Some(value) = line.strip_prefix("UDP_PORT=") {
            udp = Some(value.trim().parse::<u16>().map_err(|e| e.to_string())?);
        }
    }

    Ok((tcp.unwrap_or_default(), udp.unwrap_or_default()))
}

#[tokio::test]
async fn test_binary_delivers_and_persists_on_idle_timeout() {
    let dir = TempDir::new().unwrap();
    let save_file = dir.path().join("inventory.txt");

    let mut child = tokio::process::Command::new(server_binary())
        .args(["--host", "127.0.0.1", "-T", "0", "-U", "0", "-t", "2"])
        .args(["-h", "4", "-o", "2"])
        .arg("-f")
        .arg(&save_file)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .expect("failed to spawn warehouse-server");

    let stdout = child.stdout.take().expect("stdout not captured");
    let mut lines = tokio::io::BufReader::new(stdout).lines();
    let (tcp_port, udp_port) = read_ports(&mut lines).await.unwrap();
    assert_ne!(tcp_port, 0);

    let requester = DatagramRequester::connect_udp("127.0.0.1", udp_port)
        .await
        .unwrap();
    assert_eq!(requester.deliver(MoleculeKind::Water, 2).await.unwrap(), "OK 2");
    assert_eq!(requester.deliver(MoleculeKind::Water, 1).await.unwrap(), "FAILED");

    let status = tokio::time::timeout(Duration::from_secs(15), child.wait())
        .await
        .expect("server did not exit after the idle timeout")
        .unwrap();
    assert!(status.success());

    let text = std::fs::read_to_string(&save_file).unwrap();
    assert!(text.contains("HYDROGEN 0\n"));
    assert!(text.contains("OXYGEN 0\n"));
    assert!(text.contains("WATER 2\n"));
}

#[tokio::test]
async fn test_binary_requires_both_endpoint_kinds() {
    let status = tokio::process::Command::new(server_binary())
        .args(["--host", "127.0.0.1", "-T", "0"])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .expect("failed to spawn warehouse-server");
    assert!(!status.success());
}

#[tokio::test]
async fn test_binary_persists_on_sigterm() {
    let dir = TempDir::new().unwrap();
    let save_file = dir.path().join("inventory.txt");

    let mut child = tokio::process::Command::new(server_binary())
        .args(["--host", "127.0.0.1", "-T", "0", "-U", "0"])
        .args(["-h", "4", "-o", "2"])
        .arg("-f")
        .arg(&save_file)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .expect("failed to spawn warehouse-server");

    let stdout = child.stdout.take().expect("stdout not captured");
    let mut lines = tokio::io::BufReader::new(stdout).lines();
    let (_, udp_port) = read_ports(&mut lines).await.unwrap();

    let requester = DatagramRequester::connect_udp("127.0.0.1", udp_port)
        .await
        .unwrap();
    assert_eq!(requester.deliver(MoleculeKind::Water, 1).await.unwrap(), "OK 1");

    let pid = child.id().expect("server already exited");
    let killed = std::process::Command::new("kill")
        .arg("-TERM")
        .arg(pid.to_string())
        .status()
        .expect("failed to run kill");
    assert!(killed.success());

    let status = tokio::time::timeout(Duration::from_secs(15), child.wait())
        .await
        .expect("server did not exit after SIGTERM")
        .unwrap();
    assert!(status.success());

    let text = std::fs::read_to_string(&save_file).unwrap();
    assert!(text.contains("HYDROGEN 2\n"));
    assert!(text.contains("OXYGEN 1\n"));
    assert!(text.contains("WATER 1\n"));
}
