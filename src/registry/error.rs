//! Registry error types

use thiserror::Error;

/// Errors returned by the room registry
///
/// The `Display` text is what the client sees in its ack.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Username or room was empty after trimming
    #[error("Username and room are required!")]
    Validation,

    /// Another user in the same room already has this name
    #[error("Username is in use!")]
    DuplicateUser,

    /// Session has no registry record
    #[error("User not found")]
    NotFound,
}

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;
