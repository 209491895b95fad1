use thiserror::Error;

/// Failures while reading the OS identifier store.
///
/// A platform that simply has no identifier is not an error; providers
/// report that as an absent value.
#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Failed to read identifier source: {0}")]
    Io(#[from] std::io::Error),

    #[error("Identifier source produced unreadable output: {0}")]
    SourceOutput(String),
}
