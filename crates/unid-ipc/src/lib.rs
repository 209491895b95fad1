#![deny(clippy::all)]

mod client;
mod error;
pub mod error_codes;
mod mock_client;
mod socket;
mod types;

pub use client::DaemonClient;
pub use client::StopResult;
pub use client::UnixSocketClient;
pub use client::ensure_daemon;
pub use client::read_daemon_pid;
pub use client::start_daemon_background;
pub use client::stop_daemon;
pub use error::ClientError;
pub use mock_client::MockClient;
pub use socket::lock_path;
pub use socket::socket_path;
pub use types::RpcRequest;
pub use types::RpcResponse;

pub type Result<T> = std::result::Result<T, ClientError>;
