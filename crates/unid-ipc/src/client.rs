use std::io::BufRead;
use std::io::BufReader;
use std::io::Write;
use std::os::unix::net::UnixStream;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::error::ClientError;
use crate::socket::lock_path;
use crate::socket::socket_path;

static REQUEST_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Serialize)]
struct Request {
    jsonrpc: String,
    id: u64,
    method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct Response {
    #[allow(dead_code)]
    jsonrpc: String,
    #[allow(dead_code)]
    id: u64,
    result: Option<Value>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i32,
    message: String,
}

/// RPC access to the daemon.
///
/// The real transport is [`UnixSocketClient`]; tests substitute
/// [`crate::MockClient`].
pub trait DaemonClient {
    fn call(&mut self, method: &str, params: Option<Value>) -> Result<Value, ClientError>;

    /// Calls `getUnixId` and unwraps the result payload.
    ///
    /// `Ok(None)` means the platform has no identifier to offer; that
    /// is a valid outcome, not an error.
    fn unix_id(&mut self) -> Result<Option<String>, ClientError> {
        let result = self.call("getUnixId", None)?;
        match result.get("unix_id") {
            Some(Value::Null) => Ok(None),
            Some(Value::String(id)) => Ok(Some(id.clone())),
            _ => Err(ClientError::InvalidResponse),
        }
    }
}

pub struct UnixSocketClient;

impl UnixSocketClient {
    pub fn connect() -> Result<Self, ClientError> {
        let path = socket_path();
        if !path.exists() {
            return Err(ClientError::DaemonNotRunning);
        }

        let stream = UnixStream::connect(&path)?;
        drop(stream);

        Ok(Self)
    }

    pub fn is_daemon_running() -> bool {
        let path = socket_path();
        if !path.exists() {
            return false;
        }

        UnixStream::connect(path).is_ok()
    }
}

impl DaemonClient for UnixSocketClient {
    fn call(&mut self, method: &str, params: Option<Value>) -> Result<Value, ClientError> {
        let path = socket_path();
        let mut stream = UnixStream::connect(&path)?;

        stream.set_read_timeout(Some(Duration::from_secs(10)))?;
        stream.set_write_timeout(Some(Duration::from_secs(10)))?;

        let request = Request {
            jsonrpc: "2.0".to_string(),
            id: REQUEST_ID.fetch_add(1, Ordering::SeqCst),
            method: method.to_string(),
            params,
        };

        let request_json = serde_json::to_string(&request)?;

        writeln!(stream, "{}", request_json)?;
        stream.flush()?;

        let mut reader = BufReader::new(&stream);
        let mut response_line = String::new();
        reader.read_line(&mut response_line)?;

        let response: Response = serde_json::from_str(&response_line)?;

        if let Some(error) = response.error {
            return Err(ClientError::RpcError {
                code: error.code,
                message: error.message,
            });
        }

        response.result.ok_or(ClientError::InvalidResponse)
    }
}

/// Spawns the daemon as a detached process and waits for its socket to
/// come up.
pub fn start_daemon_background() -> Result<(), ClientError> {
    use std::fs::OpenOptions;
    use std::process::Command;
    use std::process::Stdio;

    let exe = std::env::current_exe()?;
    let log_path = socket_path().with_extension("log");

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .ok();

    let stderr = match log_file {
        Some(f) => Stdio::from(f),
        None => Stdio::null(),
    };

    Command::new(exe)
        .arg("daemon")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(stderr)
        .spawn()?;

    for _ in 0..50 {
        std::thread::sleep(Duration::from_millis(100));
        if UnixSocketClient::is_daemon_running() {
            return Ok(());
        }
    }

    if let Ok(log_content) = std::fs::read_to_string(&log_path) {
        let last_lines: String = log_content
            .lines()
            .rev()
            .take(5)
            .collect::<Vec<_>>()
            .join("\n");
        if !last_lines.is_empty() {
            eprintln!("Daemon failed to start. Recent log output:\n{}", last_lines);
        }
    }

    Err(ClientError::DaemonNotRunning)
}

/// Connects to the daemon, starting it first if it is not running.
pub fn ensure_daemon() -> Result<UnixSocketClient, ClientError> {
    if !UnixSocketClient::is_daemon_running() {
        start_daemon_background()?;
    }

    UnixSocketClient::connect()
}

/// PID recorded in the daemon lock file, if any.
pub fn read_daemon_pid() -> Option<i32> {
    let contents = std::fs::read_to_string(lock_path()).ok()?;
    contents.trim().parse().ok()
}

#[derive(Debug, PartialEq, Eq)]
pub enum StopResult {
    Stopped { pid: i32 },
    NotRunning,
}

/// Stops a running daemon via SIGTERM and waits for its socket to
/// disappear.
pub fn stop_daemon() -> Result<StopResult, ClientError> {
    if !UnixSocketClient::is_daemon_running() {
        return Ok(StopResult::NotRunning);
    }

    let pid = read_daemon_pid().ok_or(ClientError::DaemonNotRunning)?;

    let result = unsafe { libc::kill(pid, libc::SIGTERM) };
    if result != 0 {
        return Err(ClientError::ConnectionFailed(std::io::Error::last_os_error()));
    }

    for _ in 0..50 {
        std::thread::sleep(Duration::from_millis(100));
        if !UnixSocketClient::is_daemon_running() {
            return Ok(StopResult::Stopped { pid });
        }
    }

    Err(ClientError::ConnectionFailed(std::io::Error::new(
        std::io::ErrorKind::TimedOut,
        "daemon did not exit after SIGTERM",
    )))
}
