#![deny(clippy::all)]

mod error;
mod identifier;
mod provider;

pub use error::IdentityError;
pub use identifier::DeviceIdentifier;
pub use provider::FixedIdentityProvider;
pub use provider::IdentityProvider;
pub use provider::OsIdentityProvider;

pub type Result<T> = std::result::Result<T, IdentityError>;
