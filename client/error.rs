//! Errors surfaced by [`Session`](crate::Session) operations.
//!
//! Nothing is retried internally; every error aborts the operation in progress.

use cosim_core::ProtocolError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    /// Transport-level connect error
    #[error("failed to connect to bus at {address}: {source}")]
    ConnectionFailure {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// Envelope, status, or payload violation reported by the codec
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection closed by the bus")]
    ConnectionClosed,

    #[error("session is not connected")]
    NotConnected,

    /// The transport accepted fewer bytes than the frame holds; sends are never chunked
    #[error("partial write: {written} of {expected} bytes sent")]
    PartialWrite { written: usize, expected: usize },

    /// A single name was passed where an ordered list of names is required
    #[error("{0} must be a list of names, not a single string")]
    InvalidArgumentShape(&'static str),

    #[error("error occurred in retrieving variable names from the bus: component {0:?} not listed")]
    SelfNotFound(String),
}

impl SessionError {
    /// The protocol error behind this failure, if any.
    pub fn protocol(&self) -> Option<&ProtocolError> {
        match self {
            SessionError::Protocol(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;
