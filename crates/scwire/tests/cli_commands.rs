#![cfg(feature = "cli")]

use std::io::{Read, Write};
use std::net::TcpListener;
use std::process::Command;
use std::thread;

/// Fake graph store: answers lookups from `known`, answers drains with one
/// event for subscription 5 and then empty batches.
fn spawn_store(known: &'static [(&'static str, u32)]) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind should succeed");
    let endpoint = format!("tcp://{}", listener.local_addr().expect("local addr"));

    thread::spawn(move || {
        for sock in listener.incoming() {
            let Ok(mut sock) = sock else { return };
            thread::spawn(move || {
                let mut drains = 0u32;
                loop {
                    let mut header = [0u8; 10];
                    if sock.read_exact(&mut header).is_err() {
                        return;
                    }
                    let len =
                        u32::from_le_bytes([header[6], header[7], header[8], header[9]]) as usize;
                    let mut payload = vec![0u8; len];
                    if sock.read_exact(&mut payload).is_err() {
                        return;
                    }

                    let (code, body) = match header[0] {
                        0xa0 => {
                            let idtf = std::str::from_utf8(&payload[4..]).unwrap_or_default();
                            match known.iter().find(|(name, _)| *name == idtf) {
                                Some((_, raw)) => (0u8, raw.to_le_bytes().to_vec()),
                                None => (2u8, Vec::new()),
                            }
                        }
                        0x10 => {
                            drains += 1;
                            let mut body = Vec::new();
                            if drains == 1 {
                                body.extend_from_slice(&2u32.to_le_bytes());
                                for (id, addr, arg) in [(5u32, 0x0001_0002u32, 7u32), (9, 0x2B, 1)] {
                                    body.extend_from_slice(&id.to_le_bytes());
                                    body.extend_from_slice(&addr.to_le_bytes());
                                    body.extend_from_slice(&arg.to_le_bytes());
                                    body.extend_from_slice(&0u32.to_le_bytes());
                                }
                            } else {
                                body.extend_from_slice(&0u32.to_le_bytes());
                            }
                            (0u8, body)
                        }
                        _ => (1u8, Vec::new()),
                    };

                    let mut reply = vec![header[0], 0, 0, 0, 0, code];
                    reply.extend_from_slice(&(body.len() as u32).to_le_bytes());
                    reply.extend_from_slice(&body);
                    if sock.write_all(&reply).is_err() {
                        return;
                    }
                }
            });
        }
    });

    endpoint
}

fn scwire() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_scwire"));
    cmd.env_remove("SCWIRE_ENDPOINT")
        .args(["--log-level", "error", "--format", "json"]);
    cmd
}

#[test]
fn addr_converts_identifier_to_raw() {
    let output = scwire().args(["addr", "1_2"]).output().expect("addr should run");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"identifier\":\"1_2\""), "{stdout}");
    assert!(stdout.contains("\"raw\":65538"), "{stdout}");
    assert!(stdout.contains("\"hex\":\"0x00010002\""), "{stdout}");
}

#[test]
fn addr_converts_raw_to_identifier() {
    let output = scwire()
        .args(["addr", "0x00030004"])
        .output()
        .expect("addr should run");

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("\"identifier\":\"3_4\""));
}

#[test]
fn addr_rejects_malformed_identifier_with_usage_code() {
    let output = scwire()
        .args(["addr", "1_2_3"])
        .output()
        .expect("addr should run");

    assert_eq!(output.status.code(), Some(64));
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid identifier"));
}

#[test]
fn resolve_prints_found_addresses() {
    let endpoint = spawn_store(&[("node_1", 0x0001_0002), ("node_2", 0x0000_0007)]);

    let output = scwire()
        .args(["resolve", "node_1", "node_2", "--endpoint", &endpoint])
        .output()
        .expect("resolve should run");

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains(r#"{"identifier":"node_1","found":true,"address":"1_2","raw":65538}"#),
        "{stdout}"
    );
    assert!(stdout.contains(r#""address":"0_7""#), "{stdout}");
}

#[test]
fn resolve_missing_identifier_exits_1() {
    let endpoint = spawn_store(&[("node_1", 0x0001_0002)]);

    let output = scwire()
        .args(["resolve", "ghost", "node_1"])
        .env("SCWIRE_ENDPOINT", &endpoint)
        .output()
        .expect("resolve should run");

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(r#""identifier":"ghost","found":false"#), "{stdout}");
    assert!(stdout.contains(r#""address":"1_2""#), "{stdout}");
}

#[test]
fn resolve_refused_connection_exits_3() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind should succeed");
        listener.local_addr().expect("local addr").port()
    };

    let output = scwire()
        .args(["resolve", "node_1", "--endpoint", &format!("127.0.0.1:{port}")])
        .output()
        .expect("resolve should run");

    assert_eq!(output.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&output.stderr).contains("connect failed"));
}

#[test]
fn resolve_rejects_bad_endpoint() {
    let output = scwire()
        .args(["resolve", "node_1", "--endpoint", "not-an-endpoint"])
        .output()
        .expect("resolve should run");

    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn watch_prints_subscribed_events_only() {
    let endpoint = spawn_store(&[]);

    let output = scwire()
        .args([
            "watch",
            "--subscription",
            "5",
            "--period",
            "20ms",
            "--count",
            "1",
            "--endpoint",
            &endpoint,
        ])
        .output()
        .expect("watch should run");

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 1, "{stdout}");
    assert!(lines[0].contains(r#""subscription":5"#));
    assert!(lines[0].contains(r#""address":"1_2""#));
    assert!(lines[0].contains(r#""argument":7"#));
}

#[test]
fn version_prints_package_version() {
    let output = scwire().arg("version").output().expect("version should run");

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        format!("scwire {}", env!("CARGO_PKG_VERSION"))
    );
}
