//! # Error Types
//!
//! This module defines error types used throughout the cometa library.
//!
//! Printer health problems (cover open, paper empty, ...) are *not* errors:
//! they come back as a normal [`SessionOutcome`](crate::session::SessionOutcome)
//! with `is_success = false`. Only transport-level failures end up here.

use thiserror::Error;

/// Main error type for cometa operations
#[derive(Debug, Error)]
pub enum CometaError {
    /// Transport-level errors (open, read, write, release)
    #[error("Transport error: {0}")]
    Transport(String),

    /// A blocking transport operation ran past its deadline
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Image decoding or rasterization error
    #[error("Image error: {0}")]
    Image(String),

    /// The print job could not be read at all (not a list of objects)
    #[error("Invalid print job: {0}")]
    InvalidJob(String),

    /// Another caller is already establishing a persistent connection,
    /// or the request queue is full
    #[error("Busy: {0}")]
    Busy(String),

    /// A persistent-connection operation needs an established connection
    #[error("No printer connected")]
    NotConnected,

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
