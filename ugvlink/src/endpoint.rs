//! Outbound message construction with correlation-id stamping.

use std::time::{SystemTime, UNIX_EPOCH};

use ugvlink_proto::{Body, GROUND_STATION_SID, Message, MissionInfo};

use crate::telemetry::TelemetrySample;

/// Stamps outbound messages for one station.
///
/// Holds the station's own id (`sid`), its peer's id (`tid`), and the
/// monotonic counter that keeps correlation ids unique per sender
/// within the session. The decoder does not enforce that uniqueness;
/// the counter is the sender discipline that provides it.
#[derive(Debug)]
pub struct Endpoint {
    sid: u32,
    tid: u32,
    next_id: u32,
}

impl Endpoint {
    /// Creates an endpoint for station `sid` talking to station `tid`.
    pub fn new(sid: u32, tid: u32) -> Self {
        Self {
            sid,
            tid,
            next_id: 1,
        }
    }

    /// Creates the ground-station endpoint: `sid` takes its reserved
    /// default of [`GROUND_STATION_SID`].
    pub fn ground_station(tid: u32) -> Self {
        Self::new(GROUND_STATION_SID, tid)
    }

    /// This station's id.
    pub fn sid(&self) -> u32 {
        self.sid
    }

    /// The peer station's id.
    pub fn tid(&self) -> u32 {
        self.tid
    }

    /// Wraps `body` in a freshly stamped header.
    pub fn message(&mut self, body: Body) -> Message {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        Message {
            id,
            sid: self.sid,
            tid: self.tid,
            time: unix_now(),
            body,
        }
    }

    /// Builds a Connect announcement advertising `jobs_available`.
    pub fn connect(&mut self, jobs_available: Vec<String>) -> Message {
        self.message(Body::Connect { jobs_available })
    }

    /// Builds the reply that opens a session.
    pub fn connection_ack(&mut self) -> Message {
        self.message(Body::ConnectionAck)
    }

    /// Builds a telemetry Update from `sample`.
    pub fn update(&mut self, sample: &TelemetrySample) -> Message {
        self.message(Body::Update {
            lat: sample.lat,
            lng: sample.lng,
            heading: sample.heading,
            battery: sample.battery,
            status: sample.status.clone(),
        })
    }

    /// Builds a point-of-interest report.
    pub fn poi(&mut self, lat: impl Into<String>, lng: impl Into<String>) -> Message {
        self.message(Body::Poi {
            lat: lat.into(),
            lng: lng.into(),
        })
    }

    /// Builds a mission-finished report.
    pub fn complete(&mut self) -> Message {
        self.message(Body::Complete)
    }

    /// Builds a Start command for `job_type`.
    pub fn start(&mut self, job_type: impl Into<String>) -> Message {
        self.message(Body::Start {
            job_type: job_type.into(),
        })
    }

    /// Builds an AddMission command carrying `mission_info`.
    pub fn add_mission(&mut self, mission_info: MissionInfo) -> Message {
        self.message(Body::AddMission { mission_info })
    }

    /// Builds a Pause command.
    pub fn pause(&mut self) -> Message {
        self.message(Body::Pause)
    }

    /// Builds a Resume command.
    pub fn resume(&mut self) -> Message {
        self.message(Body::Resume)
    }

    /// Builds a Stop command.
    pub fn stop(&mut self) -> Message {
        self.message(Body::Stop)
    }

    /// Builds an acknowledgment of the message carrying `ack_id`.
    pub fn ack(&mut self, ack_id: u32) -> Message {
        self.message(Body::Ack { ack_id })
    }

    /// Builds a malformed-input report with a human-readable `error`.
    pub fn bad_message(&mut self, error: impl Into<String>) -> Message {
        self.message(Body::BadMessage {
            error: error.into(),
        })
    }
}

/// The sender's clock, seconds since the Unix epoch.
fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}
