use thiserror::Error;

use crate::error_codes;
use crate::error_codes::ErrorCategory;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Failed to connect to daemon: {0}")]
    ConnectionFailed(#[from] std::io::Error),

    #[error("Failed to serialize request: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("RPC error ({code}): {message}")]
    RpcError { code: i32, message: String },

    #[error("Daemon not running")]
    DaemonNotRunning,

    #[error("Invalid response from daemon")]
    InvalidResponse,
}

impl ClientError {
    /// True when the daemon rejected the method name itself, as opposed
    /// to failing while serving a recognized method.
    pub fn is_not_implemented(&self) -> bool {
        matches!(
            self,
            ClientError::RpcError { code, .. } if *code == error_codes::METHOD_NOT_FOUND
        )
    }

    pub fn category(&self) -> Option<ErrorCategory> {
        match self {
            ClientError::RpcError { code, .. } => Some(error_codes::category_for_code(*code)),
            _ => None,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ClientError::RpcError { code, .. } if error_codes::is_retryable(*code)
        )
    }

    pub fn suggestion(&self) -> Option<String> {
        match self {
            ClientError::DaemonNotRunning => Some(
                "Start the daemon with 'unid daemon', or let 'unid id' start it for you."
                    .to_string(),
            ),
            ClientError::RpcError { code, .. } if *code == error_codes::METHOD_NOT_FOUND => Some(
                "The daemon recognizes only 'getUnixId'; check for a client/daemon version mismatch."
                    .to_string(),
            ),
            _ => None,
        }
    }
}
