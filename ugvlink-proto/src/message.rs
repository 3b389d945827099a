//! Protocol message types for GCS↔UGV communication.

use serde::{Deserialize, Serialize};

/// Reserved station id for the ground control station.
///
/// A message constructed without an explicit `sid` belongs to the GCS.
pub const GROUND_STATION_SID: u32 = 200;

/// Task type for a mission whose target is to be retrieved.
pub const TASK_RETRIEVE: &str = "retrieveTarget";

/// Task type for a mission whose target is a delivery point.
pub const TASK_DELIVER: &str = "deliverTarget";

/// Every wire tag in the closed message set, in catalogue order.
///
/// The decoder rejects any `type` value outside this list.
pub const KNOWN_KINDS: [&str; 12] = [
    "connect",
    "connectionAck",
    "update",
    "poi",
    "complete",
    "start",
    "addMission",
    "pause",
    "resume",
    "stop",
    "ack",
    "badMessage",
];

/// A single protocol message: the shared header plus one [`Body`] variant.
///
/// `id` is unique per sender within a session and is what a later
/// [`Body::Ack`] refers back to. `sid`/`tid` are the sender and target
/// station ids; `time` is the sender's clock at construction, in
/// seconds since the Unix epoch.
#[allow(clippy::exhaustive_structs)] // header shape is part of the wire contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Sender-assigned correlation id.
    pub id: u32,
    /// Sender station id; the ground station (200) when unspecified.
    #[serde(default = "ground_station_sid")]
    pub sid: u32,
    /// Target station id.
    pub tid: u32,
    /// Sender's clock at construction, seconds since the Unix epoch.
    pub time: f64,
    /// Variant-specific payload, tagged on the wire under `type`.
    #[serde(flatten)]
    pub body: Body,
}

fn ground_station_sid() -> u32 {
    GROUND_STATION_SID
}

/// The closed set of message variants, tagged on the wire by `type`.
#[allow(clippy::exhaustive_enums)] // adding a variant is a wire-breaking change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Body {
    /// Announce presence and the job types this vehicle can run.
    #[serde(rename = "connect")]
    Connect {
        /// Job types the sender is able to execute.
        #[serde(rename = "jobsAvailable")]
        jobs_available: Vec<String>,
    },

    /// Reply to [`Body::Connect`]; opens the session.
    #[serde(rename = "connectionAck")]
    ConnectionAck,

    /// Periodic telemetry report.
    #[serde(rename = "update")]
    Update {
        /// Latitude in decimal degrees.
        lat: f64,
        /// Longitude in decimal degrees.
        lng: f64,
        /// Heading in degrees clockwise from true north.
        heading: f64,
        /// Battery charge remaining, 0–100.
        battery: f64,
        /// Free-form vehicle status text.
        status: String,
    },

    /// Report a point of interest. Coordinates travel as text.
    #[serde(rename = "poi")]
    Poi {
        /// Latitude, as the vehicle's sensor formatted it.
        lat: String,
        /// Longitude, as the vehicle's sensor formatted it.
        lng: String,
    },

    /// Mission finished.
    #[serde(rename = "complete")]
    Complete,

    /// Begin a job of the named type.
    #[serde(rename = "start")]
    Start {
        /// One of the job types the vehicle advertised in Connect.
        #[serde(rename = "jobType")]
        job_type: String,
    },

    /// Assign a mission target.
    #[serde(rename = "addMission")]
    AddMission {
        /// The target to enqueue.
        #[serde(rename = "missionInfo")]
        mission_info: MissionInfo,
    },

    /// Suspend the running mission.
    #[serde(rename = "pause")]
    Pause,

    /// Resume a paused mission.
    #[serde(rename = "resume")]
    Resume,

    /// Abort the mission and return to the connected-idle state.
    #[serde(rename = "stop")]
    Stop,

    /// Positive acknowledgment of a prior message.
    #[serde(rename = "ack")]
    Ack {
        /// The `id` of the message being acknowledged.
        #[serde(rename = "ackId")]
        ack_id: u32,
    },

    /// Report of a malformed or unrecognized inbound payload.
    #[serde(rename = "badMessage")]
    BadMessage {
        /// Human-readable description of what was wrong.
        error: String,
    },
}

impl Body {
    /// The wire tag written under the `type` key for this variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connect { .. } => "connect",
            Self::ConnectionAck => "connectionAck",
            Self::Update { .. } => "update",
            Self::Poi { .. } => "poi",
            Self::Complete => "complete",
            Self::Start { .. } => "start",
            Self::AddMission { .. } => "addMission",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Stop => "stop",
            Self::Ack { .. } => "ack",
            Self::BadMessage { .. } => "badMessage",
        }
    }
}

/// A mission target embedded in [`Body::AddMission`].
///
/// The same value object serves retrieval and delivery targets;
/// `task_type` ([`TASK_RETRIEVE`] / [`TASK_DELIVER`]) tells the
/// consumer which.
#[allow(clippy::exhaustive_structs)] // value object constructed by GCS applications
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionInfo {
    /// What to do at the target.
    #[serde(rename = "taskType")]
    pub task_type: String,
    /// Target latitude in decimal degrees.
    pub lat: f64,
    /// Target longitude in decimal degrees.
    pub lng: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_is_known() {
        let bodies = [
            Body::Connect {
                jobs_available: vec![],
            },
            Body::ConnectionAck,
            Body::Update {
                lat: 0.0,
                lng: 0.0,
                heading: 0.0,
                battery: 0.0,
                status: String::new(),
            },
            Body::Poi {
                lat: String::new(),
                lng: String::new(),
            },
            Body::Complete,
            Body::Start {
                job_type: String::new(),
            },
            Body::AddMission {
                mission_info: MissionInfo {
                    task_type: TASK_RETRIEVE.into(),
                    lat: 0.0,
                    lng: 0.0,
                },
            },
            Body::Pause,
            Body::Resume,
            Body::Stop,
            Body::Ack { ack_id: 0 },
            Body::BadMessage {
                error: String::new(),
            },
        ];
        assert_eq!(bodies.len(), KNOWN_KINDS.len());
        for body in &bodies {
            assert!(KNOWN_KINDS.contains(&body.kind()), "{}", body.kind());
        }
    }
}
