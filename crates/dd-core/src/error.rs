//! # AppError
//!
//! Centralized error handling for DigitalDiary.
//! Every failure a request can hit is one of these variants; the API layer
//! decides the status code.

use thiserror::Error;

/// The primary error type for all dd-core operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Missing or malformed input (e.g., empty title, bad email shape)
    #[error("{0}")]
    Validation(String),

    /// Username or email already taken
    #[error("{0}")]
    Conflict(String),

    /// Login named a user that does not exist
    #[error("Incorrect username")]
    UnknownUser,

    /// Login password did not verify
    #[error("{0}")]
    Authentication(String),

    /// No `Authorization` header on a protected request
    #[error("No authorization header")]
    MissingCredential,

    /// `Authorization` header present but no bearer token in it
    #[error("Invalid authorization header")]
    MalformedCredential,

    /// Bad signature, garbage token, or expired
    #[error("Invalid or expired token")]
    InvalidCredential,

    /// Token is fine but its user is gone
    #[error("User for this token no longer exists")]
    StaleIdentity,

    /// Ownership mismatch
    #[error("{0}")]
    Forbidden(String),

    /// Resource not found (e.g., Post, Reply)
    #[error("{0} not found")]
    NotFound(String),

    /// Infrastructure failure (e.g., DB down, hashing failure)
    #[error("store error: {0}")]
    Store(String),
}

impl AppError {
    pub fn not_found(kind: &str) -> Self {
        AppError::NotFound(kind.to_string())
    }

    pub fn store(err: impl std::fmt::Display) -> Self {
        AppError::Store(err.to_string())
    }
}

/// A specialized Result type for DigitalDiary logic.
pub type Result<T> = std::result::Result<T, AppError>;
