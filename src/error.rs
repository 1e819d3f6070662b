//! Error types for Parley
//!
//! This module defines all error types used throughout the session layer,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Parley operations
///
/// This enum encompasses all possible errors that can occur during
/// authentication, profile mutation, dialog creation, and message
/// submission against the external collaborators.
#[derive(Error, Debug)]
pub enum ParleyError {
    /// Authentication provider rejected the request (bad credentials,
    /// duplicate email, weak password, etc.)
    #[error("Authentication error: {0}")]
    Auth(String),

    /// An operation required an authenticated identity and none was present
    #[error("No authenticated session")]
    NoSession,

    /// A document read against the external store failed
    #[error("Store read error: {0}")]
    StoreRead(String),

    /// A document write against the external store failed
    #[error("Store write error: {0}")]
    StoreWrite(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required argument was missing or malformed
    #[error("Validation error: {0}")]
    Validation(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for Parley operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
