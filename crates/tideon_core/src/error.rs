//! Property access error types

use thiserror::Error;

/// Errors raised by property adapters
///
/// The animation engine itself never surfaces these: a failed read or write
/// degrades to a skipped property for that frame.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PropertyError {
    /// The target does not expose a property with this name
    #[error("Unknown property: {0}")]
    Unknown(String),

    /// A previous holder of the target lock panicked
    #[error("Target lock poisoned")]
    Poisoned,
}

/// Result type for property operations
pub type Result<T> = std::result::Result<T, PropertyError>;
