//! Semantic error codes for JSON-RPC failures.
//!
//! Error codes follow the JSON-RPC 2.0 specification:
//! - -32700 to -32600: Reserved protocol errors
//! - -32000 to -32099: Server errors (domain errors)

// Protocol errors
pub const PARSE_ERROR: i32 = -32700;
pub const METHOD_NOT_FOUND: i32 = -32601;

// Domain errors
pub const IDENTITY_SOURCE: i32 = -32001;

// Generic server error
pub const GENERIC_ERROR: i32 = -32000;

/// Error category for programmatic handling by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Operation name the daemon does not recognize.
    NotImplemented,
    /// Underlying OS identifier source failed.
    External,
    /// Protocol or internal failure.
    Internal,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::NotImplemented => "not_implemented",
            ErrorCategory::External => "external",
            ErrorCategory::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Returns whether an error code represents a retriable operation.
///
/// An unrecognized method or a failed OS read will not succeed on
/// retry; only generic server errors might.
pub fn is_retryable(code: i32) -> bool {
    matches!(code, GENERIC_ERROR)
}

/// Returns the error category for a given error code.
pub fn category_for_code(code: i32) -> ErrorCategory {
    match code {
        METHOD_NOT_FOUND => ErrorCategory::NotImplemented,
        IDENTITY_SOURCE => ErrorCategory::External,
        _ => ErrorCategory::Internal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_not_found_is_not_retryable() {
        assert!(!is_retryable(METHOD_NOT_FOUND));
    }

    #[test]
    fn test_generic_error_is_retryable() {
        assert!(is_retryable(GENERIC_ERROR));
    }

    #[test]
    fn test_category_for_method_not_found() {
        assert_eq!(
            category_for_code(METHOD_NOT_FOUND),
            ErrorCategory::NotImplemented
        );
    }

    #[test]
    fn test_category_for_identity_source() {
        assert_eq!(category_for_code(IDENTITY_SOURCE), ErrorCategory::External);
    }

    #[test]
    fn test_category_for_parse_error() {
        assert_eq!(category_for_code(PARSE_ERROR), ErrorCategory::Internal);
    }

    #[test]
    fn test_category_as_str() {
        assert_eq!(ErrorCategory::NotImplemented.as_str(), "not_implemented");
        assert_eq!(ErrorCategory::External.as_str(), "external");
        assert_eq!(ErrorCategory::Internal.as_str(), "internal");
    }
}
