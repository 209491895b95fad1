use std::fmt;

/// An OS-supplied device identifier, opaque to callers.
///
/// Guaranteed non-empty: construction trims surrounding whitespace and
/// rejects values with nothing left, so an empty OS store can never be
/// mistaken for a real identifier. The value's format is whatever the
/// host OS uses (a UUID, 128-bit hex, etc.).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentifier(String);

impl DeviceIdentifier {
    /// Builds an identifier from a raw OS value, or `None` when the
    /// value is empty after trimming.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for DeviceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
