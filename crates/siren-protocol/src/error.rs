//! Protocol error types.

use thiserror::Error;

/// Errors that can occur when decoding siren frames.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Frame is too short to be valid.
    #[error("frame too short: expected at least {expected} bytes, got {actual}")]
    FrameTooShort {
        /// Expected minimum length.
        expected: usize,
        /// Actual length received.
        actual: usize,
    },

    /// Frame text was not valid hexadecimal.
    #[error("invalid hex frame: {0}")]
    InvalidHex(String),

    /// A security encapsulation frame did not contain an inner command.
    #[error("security encapsulation has no inner command")]
    EmptyEncapsulation,
}
