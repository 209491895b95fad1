#![deny(clippy::all)]

mod config;
mod error;
mod server;
mod transport;

pub use config::DaemonConfig;
pub use error::DaemonError;
pub use server::IdentityServer;
pub use server::start_daemon;
pub use transport::TransportConnection;
pub use transport::TransportError;
pub use transport::TransportListener;
pub use transport::UnixSocketConnection;
pub use transport::UnixSocketListener;
