//! Operator-side command handle.

use std::fmt;

use tracing::debug;

use ugvlink_proto::{Message, MissionInfo, encode};

use crate::endpoint::Endpoint;
use crate::error::Result;
use crate::link::RadioTx;

/// Typed command sender for the ground-station side of a session.
///
/// Each method stamps a message, encodes it, hands it to the link, and
/// returns the assigned correlation id. There is no blocking
/// request/response — the radio gives no synchronous reply — so the
/// matching `ack` (or `badMessage`) arrives later on the station's own
/// receive path, correlated by that id.
pub struct Gcs<T: RadioTx> {
    endpoint: Endpoint,
    tx: T,
    ugv: T::Addr,
}

impl<T: RadioTx> Gcs<T> {
    /// Creates a command handle sending to the vehicle at `ugv`.
    pub fn new(endpoint: Endpoint, tx: T, ugv: T::Addr) -> Self {
        Self { endpoint, tx, ugv }
    }

    /// Acknowledges a vehicle Connect, opening the session.
    pub async fn connection_ack(&mut self) -> Result<u32> {
        let msg = self.endpoint.connection_ack();
        self.dispatch(msg).await
    }

    /// Begins a job of the named type.
    pub async fn start(&mut self, job_type: impl Into<String>) -> Result<u32> {
        let msg = self.endpoint.start(job_type);
        self.dispatch(msg).await
    }

    /// Assigns a mission target.
    pub async fn add_mission(&mut self, mission_info: MissionInfo) -> Result<u32> {
        let msg = self.endpoint.add_mission(mission_info);
        self.dispatch(msg).await
    }

    /// Suspends the running mission.
    pub async fn pause(&mut self) -> Result<u32> {
        let msg = self.endpoint.pause();
        self.dispatch(msg).await
    }

    /// Resumes a paused mission.
    pub async fn resume(&mut self) -> Result<u32> {
        let msg = self.endpoint.resume();
        self.dispatch(msg).await
    }

    /// Aborts the mission.
    pub async fn stop(&mut self) -> Result<u32> {
        let msg = self.endpoint.stop();
        self.dispatch(msg).await
    }

    /// Acknowledges an inbound message by its id.
    pub async fn ack(&mut self, ack_id: u32) -> Result<u32> {
        let msg = self.endpoint.ack(ack_id);
        self.dispatch(msg).await
    }

    async fn dispatch(&mut self, msg: Message) -> Result<u32> {
        let payload = encode(&msg)?;
        self.tx.send(&self.ugv, &payload).await?;
        debug!(kind = msg.body.kind(), id = msg.id, "command sent");
        Ok(msg.id)
    }
}

impl<T: RadioTx> fmt::Debug for Gcs<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gcs")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}
