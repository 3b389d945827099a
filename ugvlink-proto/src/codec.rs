//! Keyed JSON codec: one message per radio payload.
//!
//! The radio link delivers each payload as an opaque, already-framed
//! unit, so there is no length prefix here — a payload is exactly one
//! UTF-8 JSON document. Decoding distinguishes the three contract
//! failure modes (unparseable payload, unknown `type`, missing fields)
//! so the caller can report each precisely in a `badMessage` reply.

use serde_json::Value;

use crate::message::{KNOWN_KINDS, Message};

/// Upper bound on an inbound payload.
///
/// Radio payloads are at most a few hundred bytes; anything larger is
/// not a protocol frame.
pub const MAX_PAYLOAD: usize = 8 * 1024;

/// Errors produced while serializing a [`Message`].
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum EncodeError {
    /// The message could not be serialized to JSON.
    #[error("message could not be serialized: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors produced while decoding an inbound payload.
///
/// Every variant maps to a `badMessage` reply on the error channel.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// Payload exceeds [`MAX_PAYLOAD`].
    #[error("payload of {0} bytes exceeds the {MAX_PAYLOAD} byte limit")]
    Oversized(usize),

    /// Payload is not parseable JSON.
    #[error("payload is not valid JSON: {0}")]
    Malformed(#[source] serde_json::Error),

    /// Payload parsed, but is not a keyed map.
    #[error("payload is not a keyed map")]
    NotAMap,

    /// The map carries no `type` key.
    #[error("payload has no \"type\" key")]
    MissingType,

    /// The `type` value is outside the closed message set.
    #[error("unrecognized message type {0:?}")]
    UnknownKind(String),

    /// Known `type`, but a required field is missing or mistyped.
    #[error("invalid fields for {kind:?} message: {source}")]
    InvalidFields {
        /// The wire tag of the offending message.
        kind: String,
        /// The underlying field error.
        #[source]
        source: serde_json::Error,
    },
}

/// Encodes `msg` as a single UTF-8 JSON payload.
pub fn encode(msg: &Message) -> Result<Vec<u8>, EncodeError> {
    Ok(serde_json::to_vec(msg)?)
}

/// Decodes one payload into a [`Message`].
///
/// Unknown keys are ignored; an unknown or absent `type` is an error,
/// never a fall-through to some generic message.
pub fn decode(payload: &[u8]) -> Result<Message, DecodeError> {
    if payload.len() > MAX_PAYLOAD {
        return Err(DecodeError::Oversized(payload.len()));
    }
    let value: Value = serde_json::from_slice(payload).map_err(DecodeError::Malformed)?;
    let kind = {
        let map = value.as_object().ok_or(DecodeError::NotAMap)?;
        let kind = map
            .get("type")
            .and_then(Value::as_str)
            .ok_or(DecodeError::MissingType)?;
        if !KNOWN_KINDS.contains(&kind) {
            return Err(DecodeError::UnknownKind(kind.to_owned()));
        }
        kind.to_owned()
    };
    serde_json::from_value(value).map_err(|source| DecodeError::InvalidFields { kind, source })
}

/// Best-effort recovery of the `id` key from a payload that failed to
/// decode, for inclusion in `badMessage` error text.
pub fn probe_id(payload: &[u8]) -> Option<i64> {
    let value: Value = serde_json::from_slice(payload).ok()?;
    value.get("id")?.as_i64()
}
