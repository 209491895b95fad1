use crate::DeviceIdentifier;
use crate::IdentityError;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "windows")]
mod windows;

/// Read-only access to the host's best-effort device identifier.
pub trait IdentityProvider {
    /// Returns the OS device identifier, or `None` when the platform
    /// has no value to offer. Absence is a valid outcome, not an error.
    fn unix_id(&self) -> Result<Option<DeviceIdentifier>, IdentityError>;
}

/// Identity provider backed by the host operating system's store.
///
/// Reads fresh on every call; the provider never creates, caches, or
/// persists an identifier. Repeated calls within one process return the
/// same value unless the OS-level store itself is reset.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsIdentityProvider;

impl OsIdentityProvider {
    pub fn new() -> Self {
        Self
    }
}

impl IdentityProvider for OsIdentityProvider {
    fn unix_id(&self) -> Result<Option<DeviceIdentifier>, IdentityError> {
        #[cfg(target_os = "linux")]
        {
            linux::read_machine_id()
        }

        #[cfg(target_os = "macos")]
        {
            macos::read_platform_uuid()
        }

        #[cfg(target_os = "windows")]
        {
            windows::read_machine_guid()
        }

        // Platforms without a readable identifier store report absence
        // rather than minting one.
        #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
        {
            Ok(None)
        }
    }
}

/// Provider returning a preconfigured value; used in server and CLI
/// tests where the real OS store would make results nondeterministic.
#[derive(Debug, Clone)]
pub struct FixedIdentityProvider {
    value: Option<DeviceIdentifier>,
}

impl FixedIdentityProvider {
    pub fn with_value(value: &str) -> Self {
        Self {
            value: DeviceIdentifier::new(value),
        }
    }

    pub fn absent() -> Self {
        Self { value: None }
    }
}

impl IdentityProvider for FixedIdentityProvider {
    fn unix_id(&self) -> Result<Option<DeviceIdentifier>, IdentityError> {
        Ok(self.value.clone())
    }
}
