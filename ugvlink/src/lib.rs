//! Session layer for GCS↔UGV communication over addressed radio links.
//!
//! [`ugvlink_proto`] defines the message catalogue and its wire
//! encoding; this crate layers the conversation on top: correlation-id
//! stamping ([`Endpoint`]), the session/mission lifecycle state machine
//! and acknowledgment/error channel ([`Session`]), the transport
//! boundary ([`RadioTx`]/[`RadioRx`]), and a two-task peer runtime for
//! the vehicle side ([`spawn_ugv`]).
//!
//! The protocol guarantees neither delivery nor ordering — the radio
//! may drop, duplicate, or reorder payloads, and every send here is
//! fire-and-forget. Anything stronger belongs to the layers above.
//!
//! # Quick start — vehicle side
//!
//! ```no_run
//! use ugvlink::{Endpoint, Session};
//!
//! let endpoint = Endpoint::new(31, ugvlink_proto::GROUND_STATION_SID);
//! let mut session = Session::new(endpoint, vec!["deliver".into()]);
//!
//! // Announce presence; the session opens when a ConnectionAck arrives.
//! let hello = session.connect_request();
//! let payload = ugvlink_proto::encode(&hello)?;
//! // hand `payload` to the radio transport...
//! # Ok::<(), ugvlink_proto::EncodeError>(())
//! ```

mod endpoint;
mod error;
mod gcs;
mod link;
mod peer;
mod session;
mod telemetry;

pub use endpoint::Endpoint;
pub use error::{Error, Result};
pub use gcs::Gcs;
pub use link::{RadioRx, RadioTx};
pub use peer::{PeerHandle, spawn_ugv};
pub use session::{Session, SessionState, WorkPhase};
pub use telemetry::{TelemetrySample, TelemetrySource};
