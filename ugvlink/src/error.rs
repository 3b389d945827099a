//! Error types for session-layer operations.

use crate::session::SessionState;

/// Alias for `Result<T, ugvlink::Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by session-layer operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An inbound payload failed to decode.
    #[error(transparent)]
    Decode(#[from] ugvlink_proto::DecodeError),

    /// An outbound message failed to serialize.
    #[error(transparent)]
    Encode(#[from] ugvlink_proto::EncodeError),

    /// The requested operation is not valid in the current lifecycle state.
    #[error("{op} is not valid in the {state:?} state")]
    Lifecycle {
        /// The operation that was attempted.
        op: &'static str,
        /// The session state at the time of the attempt.
        state: SessionState,
    },

    /// An I/O error from the underlying link.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
