//! Protocol-level errors raised while encoding or decoding bus frames and payloads.

use crate::types::{FunctionCode, VariableKind};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Received buffer cannot even hold the length header and function code
    #[error("frame too short: expected at least {expected} bytes, got {actual}")]
    FrameTooShort { expected: usize, actual: usize },

    #[error("unrecognized return type for action {expected}, got {actual:#04x}")]
    FunctionCodeMismatch { expected: FunctionCode, actual: u8 },

    /// A status-asserting operation got something other than SUCCESS back
    #[error("something went wrong with action {function}: status payload {payload:02x?}")]
    UnexpectedStatus {
        function: FunctionCode,
        payload: Vec<u8>,
    },

    #[error("unknown variable kind {0}")]
    UnknownVariableKind(u8),

    #[error("value {value} does not fit in {width} length byte(s)")]
    LengthOverflow { value: usize, width: usize },

    #[error("received ERROR status from the bus, check the error register")]
    DirectoryQueryFailed,

    #[error("malformed component directory: {0}")]
    MalformedDirectory(String),

    /// Names are comma-delimited on the wire and cannot carry the delimiter
    #[error("name {0:?} contains the ',' delimiter")]
    DelimiterInName(String),

    #[error("expected {expected} values, got {actual}")]
    ValueCountMismatch { expected: usize, actual: usize },

    #[error("value {value} cannot be packed as {kind}")]
    ValueKindMismatch { kind: VariableKind, value: String },
}

pub type Result<T> = std::result::Result<T, ProtocolError>;
