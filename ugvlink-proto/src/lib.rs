//! Wire protocol for GCS↔UGV communication.
//!
//! Messages are keyed UTF-8 JSON documents, one document per radio
//! payload: the link layer provides framing, addressing, and delivery
//! (such as it is); this crate provides the closed message catalogue
//! and its codec. Decoders ignore unknown keys, so fields may be added
//! without breaking deployed peers.

mod codec;
mod message;

pub use codec::{DecodeError, EncodeError, MAX_PAYLOAD, decode, encode, probe_id};
pub use message::{
    Body, GROUND_STATION_SID, KNOWN_KINDS, Message, MissionInfo, TASK_DELIVER, TASK_RETRIEVE,
};
