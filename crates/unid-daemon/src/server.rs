use std::fs::OpenOptions;
use std::io::Write;
use std::os::unix::io::AsRawFd;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::mpsc;
use std::sync::mpsc::SyncSender;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use serde_json::json;
use signal_hook::consts::SIGINT;
use signal_hook::consts::SIGTERM;
use signal_hook::iterator::Signals;
use tracing::error;
use tracing::info;
use tracing::warn;

use unid_common::mutex_lock_or_recover;
use unid_core::IdentityProvider;
use unid_core::OsIdentityProvider;
use unid_ipc::RpcRequest;
use unid_ipc::RpcResponse;
use unid_ipc::error_codes;
use unid_ipc::lock_path;
use unid_ipc::socket_path;

use crate::config::DaemonConfig;
use crate::error::DaemonError;
use crate::transport::TransportConnection;
use crate::transport::TransportError;
use crate::transport::TransportListener;
use crate::transport::UnixSocketConnection;
use crate::transport::UnixSocketListener;

const CHANNEL_CAPACITY: usize = 32;
const WRITE_TIMEOUT: Duration = Duration::from_secs(10);
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Serves `getUnixId` over the daemon socket.
///
/// Exactly one method name is recognized; every other name answers
/// with a method-not-found error so callers can tell "unknown API"
/// from "no identifier available".
pub struct IdentityServer<P: IdentityProvider> {
    provider: P,
    config: DaemonConfig,
    active_connections: Arc<AtomicUsize>,
}

impl IdentityServer<OsIdentityProvider> {
    pub fn new() -> Self {
        Self::with_provider(OsIdentityProvider::new(), DaemonConfig::from_env())
    }
}

impl Default for IdentityServer<OsIdentityProvider> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: IdentityProvider> IdentityServer<P> {
    pub fn with_provider(provider: P, config: DaemonConfig) -> Self {
        Self {
            provider,
            config,
            active_connections: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn handle_request(&self, request: RpcRequest) -> RpcResponse {
        match request.method.as_str() {
            "getUnixId" => match self.provider.unix_id() {
                Ok(id) => RpcResponse::success(
                    request.id,
                    json!({ "unix_id": id.map(|v| v.into_string()) }),
                ),
                Err(e) => {
                    warn!("identifier source read failed: {}", e);
                    RpcResponse::error(request.id, error_codes::IDENTITY_SOURCE, &e.to_string())
                }
            },

            _ => RpcResponse::error(
                request.id,
                error_codes::METHOD_NOT_FOUND,
                &format!("Method not found: {}", request.method),
            ),
        }
    }

    /// Serves requests on one connection until the peer goes away or
    /// the idle timeout strikes. Malformed requests are answered and
    /// the connection kept; oversized requests drop it.
    pub fn handle_client(&self, mut conn: impl TransportConnection) {
        if let Err(e) = conn.set_read_timeout(Some(self.config.idle_timeout)) {
            warn!("failed to set read timeout: {}", e);
            return;
        }

        if let Err(e) = conn.set_write_timeout(Some(WRITE_TIMEOUT)) {
            warn!("failed to set write timeout: {}", e);
            return;
        }

        loop {
            let request = match conn.read_request() {
                Ok(request) => request,
                Err(TransportError::ConnectionClosed) | Err(TransportError::Timeout) => break,
                Err(TransportError::SizeLimit { max_bytes }) => {
                    let response = RpcResponse::error(
                        0,
                        error_codes::PARSE_ERROR,
                        &format!("Parse error: request size limit exceeded ({} bytes max)", max_bytes),
                    );
                    let _ = conn.write_response(&response);
                    break;
                }
                Err(TransportError::Parse(msg)) => {
                    let response = RpcResponse::error(
                        0,
                        error_codes::PARSE_ERROR,
                        &format!("Parse error: {}", msg),
                    );
                    let _ = conn.write_response(&response);
                    continue;
                }
                Err(TransportError::Io(e)) => {
                    warn!("client connection error: {}", e);
                    break;
                }
            };

            let response = self.handle_request(request);

            if let Err(e) = conn.write_response(&response) {
                match e {
                    TransportError::ConnectionClosed => break,
                    _ => {
                        warn!("client write error: {}", e);
                        break;
                    }
                }
            }
        }
    }
}

struct WorkerPool {
    workers: Vec<thread::JoinHandle<()>>,
    sender: SyncSender<UnixSocketConnection>,
}

impl WorkerPool {
    fn new<P>(
        size: usize,
        server: Arc<IdentityServer<P>>,
        shutdown: Arc<AtomicBool>,
    ) -> std::io::Result<Self>
    where
        P: IdentityProvider + Send + Sync + 'static,
    {
        let (sender, receiver) = mpsc::sync_channel::<UnixSocketConnection>(CHANNEL_CAPACITY);
        let receiver = Arc::new(Mutex::new(receiver));

        let mut workers = Vec::with_capacity(size);

        for id in 0..size {
            let receiver = Arc::clone(&receiver);
            let server = Arc::clone(&server);
            let shutdown = Arc::clone(&shutdown);

            let handle = match thread::Builder::new()
                .name(format!("unid-worker-{}", id))
                .spawn(move || {
                    loop {
                        if shutdown.load(Ordering::Relaxed) {
                            break;
                        }

                        let conn = {
                            let lock = mutex_lock_or_recover(&receiver);
                            match lock.recv_timeout(Duration::from_millis(100)) {
                                Ok(conn) => conn,
                                Err(mpsc::RecvTimeoutError::Timeout) => continue,
                                Err(mpsc::RecvTimeoutError::Disconnected) => break,
                            }
                        };

                        server.active_connections.fetch_add(1, Ordering::Relaxed);
                        server.handle_client(conn);
                        server.active_connections.fetch_sub(1, Ordering::Relaxed);
                    }
                }) {
                Ok(handle) => handle,
                Err(e) => {
                    error!("failed to spawn worker {}: {}", id, e);
                    continue;
                }
            };

            workers.push(handle);
        }

        if workers.is_empty() {
            return Err(std::io::Error::other("Failed to spawn any worker threads"));
        }

        if workers.len() < size {
            warn!("only spawned {}/{} worker threads", workers.len(), size);
        }

        Ok(WorkerPool { workers, sender })
    }

    fn execute(&self, conn: UnixSocketConnection) -> Result<(), UnixSocketConnection> {
        self.sender.try_send(conn).map_err(|e| match e {
            mpsc::TrySendError::Full(c) | mpsc::TrySendError::Disconnected(c) => c,
        })
    }

    fn shutdown(self) {
        drop(self.sender);
        for worker in self.workers {
            let _ = worker.join();
        }
    }
}

/// Runs the daemon in the foreground until SIGINT/SIGTERM.
pub fn start_daemon() -> Result<(), DaemonError> {
    let config = DaemonConfig::from_env();
    let socket_path = socket_path();
    let lock_path = lock_path();

    let lock_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&lock_path)
        .map_err(|e| DaemonError::LockFailed(format!("failed to open lock file: {}", e)))?;

    let fd = lock_file.as_raw_fd();

    let result = unsafe { libc::flock(fd, libc::LOCK_EX | libc::LOCK_NB) };
    if result != 0 {
        return Err(DaemonError::AlreadyRunning);
    }

    lock_file
        .set_len(0)
        .map_err(|e| DaemonError::LockFailed(format!("failed to truncate lock file: {}", e)))?;
    let mut lock_file = lock_file;
    writeln!(lock_file, "{}", std::process::id())
        .map_err(|e| DaemonError::LockFailed(format!("failed to write PID to lock file: {}", e)))?;

    if socket_path.exists() {
        std::fs::remove_file(&socket_path).map_err(|e| {
            DaemonError::SocketBind(format!("failed to remove stale socket: {}", e))
        })?;
    }

    let listener = UnixSocketListener::bind(&socket_path, config.max_request_bytes)
        .map_err(|e| DaemonError::SocketBind(format!("failed to bind socket: {}", e)))?;
    listener
        .set_nonblocking(true)
        .map_err(|e| DaemonError::SocketBind(format!("failed to set non-blocking: {}", e)))?;

    info!(
        "unid daemon started on {} (pid {})",
        socket_path.display(),
        std::process::id()
    );

    let shutdown = Arc::new(AtomicBool::new(false));
    let max_connections = config.max_connections;
    let server = Arc::new(IdentityServer::with_provider(
        OsIdentityProvider::new(),
        config,
    ));

    let mut signals =
        Signals::new([SIGINT, SIGTERM]).map_err(|e| DaemonError::SignalSetup(e.to_string()))?;
    let shutdown_signal = Arc::clone(&shutdown);
    thread::Builder::new()
        .name("unid-signals".to_string())
        .spawn(move || {
            if let Some(sig) = signals.forever().next() {
                info!("received signal {}, initiating graceful shutdown", sig);
                shutdown_signal.store(true, Ordering::SeqCst);
            }
        })
        .map_err(|e| DaemonError::SignalSetup(format!("failed to spawn signal handler: {}", e)))?;

    let pool = WorkerPool::new(max_connections, Arc::clone(&server), Arc::clone(&shutdown))
        .map_err(|e| DaemonError::ThreadPool(e.to_string()))?;

    while !shutdown.load(Ordering::Relaxed) {
        match listener.accept() {
            Ok(conn) => {
                if let Err(conn) = pool.execute(conn) {
                    warn!("worker queue full, dropping connection");
                    drop(conn);
                }
            }
            Err(TransportError::Timeout) => {
                thread::sleep(Duration::from_millis(10));
            }
            Err(e) => {
                if !shutdown.load(Ordering::Relaxed) {
                    warn!("error accepting connection: {}", e);
                }
            }
        }
    }

    info!(
        "shutting down, waiting for {} active connections",
        server.active_connections.load(Ordering::Relaxed)
    );
    let shutdown_deadline = Instant::now() + SHUTDOWN_GRACE;
    while server.active_connections.load(Ordering::Relaxed) > 0 {
        if Instant::now() > shutdown_deadline {
            warn!("shutdown grace period elapsed, forcing close");
            break;
        }
        thread::sleep(Duration::from_millis(50));
    }

    pool.shutdown();

    if socket_path.exists() {
        let _ = std::fs::remove_file(&socket_path);
    }

    if lock_path.exists() {
        let _ = std::fs::remove_file(&lock_path);
    }

    info!("daemon shutdown complete");
    Ok(())
}
