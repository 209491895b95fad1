use thiserror::Error;

#[derive(Error, Debug)]
pub enum DaemonError {
    #[error("Daemon already running")]
    AlreadyRunning,

    #[error("Failed to acquire daemon lock: {0}")]
    LockFailed(String),

    #[error("Failed to bind daemon socket: {0}")]
    SocketBind(String),

    #[error("Failed to install signal handlers: {0}")]
    SignalSetup(String),

    #[error("Failed to start worker pool: {0}")]
    ThreadPool(String),
}

impl DaemonError {
    /// Returns a helpful suggestion for resolving the error.
    pub fn suggestion(&self) -> String {
        match self {
            DaemonError::AlreadyRunning => {
                "Another daemon holds the lock. Run 'unid status' to find it or 'unid stop' to stop it."
                    .to_string()
            }
            DaemonError::LockFailed(_) | DaemonError::SocketBind(_) => {
                "Check that the socket directory is writable, or point UNID_SOCKET at another location."
                    .to_string()
            }
            DaemonError::SignalSetup(_) | DaemonError::ThreadPool(_) => {
                "Retry, and inspect system resource limits if the failure persists.".to_string()
            }
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, DaemonError::ThreadPool(_))
    }
}
