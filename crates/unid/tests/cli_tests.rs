//! End-to-end CLI tests against a mock daemon on a temp socket.

use std::io::BufRead;
use std::io::BufReader;
use std::io::Write;
use std::os::unix::net::UnixListener;
use std::path::Path;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use assert_cmd::Command;
use predicates::prelude::*;

fn unid() -> Command {
    Command::cargo_bin("unid").unwrap()
}

fn temp_socket(dir: &Path) -> PathBuf {
    dir.join("unid-test.sock")
}

/// Answers the first request that arrives with `result`, tolerating the
/// bare connect probes the client makes before its real call.
fn spawn_mock_daemon(socket: PathBuf, result: serde_json::Value) -> thread::JoinHandle<()> {
    let listener = UnixListener::bind(&socket).unwrap();
    thread::spawn(move || {
        for _ in 0..10 {
            let (stream, _addr) = listener.accept().unwrap();
            stream
                .set_read_timeout(Some(Duration::from_millis(500)))
                .unwrap();

            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut line = String::new();
            match reader.read_line(&mut line) {
                Ok(n) if n > 0 => {
                    let request: serde_json::Value = serde_json::from_str(&line).unwrap();
                    assert_eq!(request["method"], "getUnixId");

                    let response = serde_json::json!({
                        "jsonrpc": "2.0",
                        "id": request["id"],
                        "result": result.clone(),
                    });
                    let mut stream = stream;
                    writeln!(stream, "{}", response).unwrap();
                    return;
                }
                _ => continue,
            }
        }
        panic!("mock daemon never received a request");
    })
}

#[test]
fn test_id_reports_value_from_daemon() {
    let dir = tempfile::tempdir().unwrap();
    let socket = temp_socket(dir.path());
    let mock = spawn_mock_daemon(
        socket.clone(),
        serde_json::json!({ "unix_id": "abc123-def456" }),
    );

    unid()
        .env("UNID_SOCKET", &socket)
        .arg("id")
        .assert()
        .success()
        .stdout(predicate::str::contains("abc123-def456"));

    mock.join().unwrap();
}

#[test]
fn test_id_reports_absent_identifier() {
    let dir = tempfile::tempdir().unwrap();
    let socket = temp_socket(dir.path());
    let mock = spawn_mock_daemon(socket.clone(), serde_json::json!({ "unix_id": null }));

    unid()
        .env("UNID_SOCKET", &socket)
        .arg("id")
        .assert()
        .success()
        .stdout(predicate::str::contains("(none)"));

    mock.join().unwrap();
}

#[test]
fn test_id_json_passes_payload_through() {
    let dir = tempfile::tempdir().unwrap();
    let socket = temp_socket(dir.path());
    let mock = spawn_mock_daemon(
        socket.clone(),
        serde_json::json!({ "unix_id": "abc123" }),
    );

    unid()
        .env("UNID_SOCKET", &socket)
        .args(["id", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""unix_id":"abc123""#));

    mock.join().unwrap();
}

#[test]
fn test_id_local_succeeds_without_daemon() {
    let dir = tempfile::tempdir().unwrap();
    let socket = temp_socket(dir.path());

    unid()
        .env("UNID_SOCKET", &socket)
        .args(["id", "--local", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("unix_id"));
}

#[test]
fn test_status_reports_not_running() {
    let dir = tempfile::tempdir().unwrap();
    let socket = temp_socket(dir.path());

    unid()
        .env("UNID_SOCKET", &socket)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("not running"));
}

#[test]
fn test_stop_when_not_running() {
    let dir = tempfile::tempdir().unwrap();
    let socket = temp_socket(dir.path());

    unid()
        .env("UNID_SOCKET", &socket)
        .arg("stop")
        .assert()
        .success()
        .stdout(predicate::str::contains("not running"));
}

#[test]
fn test_unid_log_routes_diagnostics_to_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let socket = temp_socket(dir.path());

    unid()
        .env("UNID_SOCKET", &socket)
        .env("UNID_LOG", "debug")
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("not running"))
        .stderr(predicate::str::contains("starting"));
}

#[test]
fn test_completions_generate() {
    unid()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("unid"));
}
