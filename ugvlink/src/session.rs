//! Session/mission lifecycle state machine and acknowledgment channel.
//!
//! A [`Session`] tracks one GCS↔UGV conversation. Inbound handling is
//! the single state writer: [`Session::receive_payload`] decodes,
//! transitions, and produces the replies owed to the peer (a
//! `connectionAck`, an `ack`, or a `badMessage`). Outbound construction
//! for the vehicle's own reports goes through the typed methods below,
//! which read state but only the autonomous completion path transitions
//! it.

use std::collections::VecDeque;

use tracing::{debug, warn};

use ugvlink_proto::{Body, Message, MissionInfo, decode, probe_id};

use crate::endpoint::Endpoint;
use crate::error::{Error, Result};
use crate::telemetry::TelemetrySample;

/// Lifecycle position of a session.
///
/// Mission completion has no stored state of its own: finishing a
/// mission emits `complete` and folds straight back to
/// [`SessionState::Connected`], so a session can run any number of
/// mission cycles.
#[allow(clippy::exhaustive_enums)] // the lifecycle is a closed contract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No session open; Connect/ConnectionAck not yet exchanged.
    Disconnected,
    /// Session open, no job running.
    Connected,
    /// A job is running.
    Working(WorkPhase),
}

/// Phase of a running job.
#[allow(clippy::exhaustive_enums)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkPhase {
    /// Executing; telemetry flows.
    Active,
    /// Suspended by a Pause command.
    Paused,
}

/// One GCS↔UGV conversation: lifecycle state, the mission queue, and
/// the endpoint that stamps every reply and report.
#[derive(Debug)]
pub struct Session {
    state: SessionState,
    endpoint: Endpoint,
    jobs: Vec<String>,
    active_job: Option<String>,
    missions: VecDeque<MissionInfo>,
}

impl Session {
    /// Creates a closed session that will advertise `jobs` when it
    /// announces itself.
    pub fn new(endpoint: Endpoint, jobs: Vec<String>) -> Self {
        Self {
            state: SessionState::Disconnected,
            endpoint,
            jobs,
            active_job: None,
            missions: VecDeque::new(),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The job started by the GCS, while one is running.
    pub fn active_job(&self) -> Option<&str> {
        self.active_job.as_deref()
    }

    /// Number of queued mission targets.
    pub fn missions_pending(&self) -> usize {
        self.missions.len()
    }

    /// Handles one raw inbound payload and returns the replies owed.
    ///
    /// A payload that fails to decode draws a single `badMessage` whose
    /// text names the failure and, when recoverable, the offending
    /// message's id; lifecycle state is untouched.
    pub fn receive_payload(&mut self, payload: &[u8]) -> Vec<Message> {
        match decode(payload) {
            Ok(msg) => self.receive(&msg),
            Err(err) => {
                warn!(%err, "undecodable payload");
                let text = match probe_id(payload) {
                    Some(id) => format!("{err} (id {id})"),
                    None => err.to_string(),
                };
                vec![self.endpoint.bad_message(text)]
            }
        }
    }

    /// Handles one decoded inbound message and returns the replies owed.
    ///
    /// This is the only place lifecycle state transitions on peer
    /// input. `ack` and `badMessage` are terminal: they never generate
    /// a reply, so no acknowledgment loops form. Duplicates of
    /// idempotent messages (the radio may deliver a payload twice) are
    /// re-acknowledged without effect; genuinely out-of-order commands
    /// are rejected with `badMessage`.
    pub fn receive(&mut self, msg: &Message) -> Vec<Message> {
        match &msg.body {
            Body::Ack { ack_id } => {
                debug!(ack_id = *ack_id, from = msg.sid, "peer acknowledged");
                Vec::new()
            }
            Body::BadMessage { error } => {
                warn!(from = msg.sid, error = %error, "peer rejected a message");
                Vec::new()
            }
            Body::Connect { jobs_available } => {
                debug!(from = msg.sid, jobs = ?jobs_available, "connect announcement");
                if self.state == SessionState::Disconnected {
                    self.transition(SessionState::Connected, "connect");
                }
                vec![self.endpoint.connection_ack()]
            }
            Body::ConnectionAck => {
                if self.state == SessionState::Disconnected {
                    self.transition(SessionState::Connected, "connectionAck");
                }
                Vec::new()
            }
            Body::Start { job_type } => match self.state {
                SessionState::Connected => {
                    self.active_job = Some(job_type.clone());
                    self.transition(SessionState::Working(WorkPhase::Active), "start");
                    vec![self.endpoint.ack(msg.id)]
                }
                state => vec![self.out_of_order("start", msg.id, state)],
            },
            Body::AddMission { mission_info } => match self.state {
                SessionState::Working(_) => {
                    self.missions.push_back(mission_info.clone());
                    debug!(
                        task = %mission_info.task_type,
                        pending = self.missions.len(),
                        "mission enqueued"
                    );
                    vec![self.endpoint.ack(msg.id)]
                }
                state => vec![self.out_of_order("addMission", msg.id, state)],
            },
            Body::Pause => match self.state {
                SessionState::Working(_) => {
                    self.transition(SessionState::Working(WorkPhase::Paused), "pause");
                    vec![self.endpoint.ack(msg.id)]
                }
                state => vec![self.out_of_order("pause", msg.id, state)],
            },
            Body::Resume => match self.state {
                SessionState::Working(_) => {
                    self.transition(SessionState::Working(WorkPhase::Active), "resume");
                    vec![self.endpoint.ack(msg.id)]
                }
                state => vec![self.out_of_order("resume", msg.id, state)],
            },
            Body::Stop => match self.state {
                SessionState::Working(_) => {
                    self.abort_mission();
                    self.transition(SessionState::Connected, "stop");
                    vec![self.endpoint.ack(msg.id)]
                }
                // Duplicate of a stop that already took effect.
                SessionState::Connected => vec![self.endpoint.ack(msg.id)],
                state @ SessionState::Disconnected => {
                    vec![self.out_of_order("stop", msg.id, state)]
                }
            },
            Body::Update { .. } | Body::Poi { .. } => vec![self.endpoint.ack(msg.id)],
            Body::Complete => {
                if let SessionState::Working(_) = self.state {
                    self.active_job = None;
                    self.transition(SessionState::Connected, "complete");
                }
                vec![self.endpoint.ack(msg.id)]
            }
        }
    }

    /// Builds the Connect announcement carrying this session's jobs.
    ///
    /// Announcing does not transition: the session opens when the
    /// peer's `connectionAck` comes back.
    pub fn connect_request(&mut self) -> Message {
        self.endpoint.connect(self.jobs.clone())
    }

    /// Builds a telemetry Update from `sample`, if one is due.
    ///
    /// Telemetry flows only while a job is actively running; in every
    /// other state this returns `None` and the caller skips the tick.
    pub fn telemetry_update(&mut self, sample: &TelemetrySample) -> Option<Message> {
        match self.state {
            SessionState::Working(WorkPhase::Active) => Some(self.endpoint.update(sample)),
            _ => None,
        }
    }

    /// Builds a point-of-interest report.
    pub fn report_poi(
        &mut self,
        lat: impl Into<String>,
        lng: impl Into<String>,
    ) -> Result<Message> {
        match self.state {
            SessionState::Working(_) => Ok(self.endpoint.poi(lat, lng)),
            state => Err(Error::Lifecycle { op: "poi", state }),
        }
    }

    /// Finishes the running job: emits `complete` and folds back to
    /// [`SessionState::Connected`] for the next mission cycle.
    pub fn finish_mission(&mut self) -> Result<Message> {
        match self.state {
            SessionState::Working(WorkPhase::Active) => {
                self.active_job = None;
                self.transition(SessionState::Connected, "complete");
                Ok(self.endpoint.complete())
            }
            state => Err(Error::Lifecycle {
                op: "complete",
                state,
            }),
        }
    }

    /// Pops the next queued mission target.
    pub fn next_mission(&mut self) -> Option<MissionInfo> {
        self.missions.pop_front()
    }

    fn transition(&mut self, next: SessionState, cause: &'static str) {
        if self.state != next {
            debug!(from = ?self.state, to = ?next, cause, "session transition");
            self.state = next;
        }
    }

    fn abort_mission(&mut self) {
        self.active_job = None;
        if !self.missions.is_empty() {
            debug!(dropped = self.missions.len(), "mission queue aborted");
            self.missions.clear();
        }
    }

    fn out_of_order(&mut self, kind: &str, id: u32, state: SessionState) -> Message {
        warn!(kind, id, ?state, "out-of-order message rejected");
        self.endpoint
            .bad_message(format!("{kind} (id {id}) is not valid in the {state:?} state"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ugvlink_proto::{GROUND_STATION_SID, TASK_RETRIEVE, encode};

    const UGV_SID: u32 = 31;

    fn ugv_session() -> Session {
        Session::new(
            Endpoint::new(UGV_SID, GROUND_STATION_SID),
            vec!["deliver".into()],
        )
    }

    /// An inbound command as the GCS would stamp it.
    fn from_gcs(id: u32, body: Body) -> Message {
        Message {
            id,
            sid: GROUND_STATION_SID,
            tid: UGV_SID,
            time: 100.5,
            body,
        }
    }

    fn sample() -> TelemetrySample {
        TelemetrySample {
            lat: 40.0,
            lng: -80.0,
            heading: 90.0,
            battery: 75.0,
            status: "nominal".into(),
        }
    }

    #[test]
    fn full_lifecycle_scenario() {
        let mut session = ugv_session();
        assert_eq!(session.state(), SessionState::Disconnected);

        // The GCS view: a connect announcement opens the session.
        let replies = session.receive(&from_gcs(1, Body::Connect {
            jobs_available: vec!["deliver".into()],
        }));
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].body, Body::ConnectionAck);
        assert_eq!(session.state(), SessionState::Connected);

        let replies = session.receive(&from_gcs(2, Body::Start {
            job_type: "deliver".into(),
        }));
        assert_eq!(replies[0].body, Body::Ack { ack_id: 2 });
        assert_eq!(session.state(), SessionState::Working(WorkPhase::Active));
        assert_eq!(session.active_job(), Some("deliver"));

        session.receive(&from_gcs(3, Body::Pause));
        assert_eq!(session.state(), SessionState::Working(WorkPhase::Paused));

        session.receive(&from_gcs(4, Body::Resume));
        assert_eq!(session.state(), SessionState::Working(WorkPhase::Active));

        // Autonomous completion emits Complete and folds back to Connected.
        let complete = session.finish_mission().unwrap();
        assert_eq!(complete.body, Body::Complete);
        assert_eq!(session.state(), SessionState::Connected);
        assert_eq!(session.active_job(), None);
    }

    #[test]
    fn connection_ack_opens_the_initiating_side() {
        let mut session = ugv_session();
        let announce = session.connect_request();
        assert_eq!(announce.body, Body::Connect {
            jobs_available: vec!["deliver".into()],
        });
        assert_eq!(session.state(), SessionState::Disconnected);

        let replies = session.receive(&from_gcs(1, Body::ConnectionAck));
        assert!(replies.is_empty());
        assert_eq!(session.state(), SessionState::Connected);
    }

    #[test]
    fn ack_correlates_by_inbound_id() {
        let mut session = ugv_session();
        session.receive(&from_gcs(1, Body::Connect {
            jobs_available: vec![],
        }));
        let replies = session.receive(&from_gcs(42, Body::Start {
            job_type: "deliver".into(),
        }));
        assert_eq!(replies[0].body, Body::Ack { ack_id: 42 });
    }

    #[test]
    fn add_mission_enqueues_in_either_working_phase() {
        let mut session = ugv_session();
        session.receive(&from_gcs(1, Body::Connect {
            jobs_available: vec![],
        }));
        session.receive(&from_gcs(2, Body::Start {
            job_type: "retrieve".into(),
        }));

        let info = MissionInfo {
            task_type: TASK_RETRIEVE.into(),
            lat: 40.44,
            lng: -79.99,
        };
        let replies = session.receive(&from_gcs(3, Body::AddMission {
            mission_info: info.clone(),
        }));
        assert_eq!(replies[0].body, Body::Ack { ack_id: 3 });

        session.receive(&from_gcs(4, Body::Pause));
        session.receive(&from_gcs(5, Body::AddMission {
            mission_info: info.clone(),
        }));
        assert_eq!(session.missions_pending(), 2);
        assert_eq!(session.next_mission(), Some(info));
    }

    #[test]
    fn stop_aborts_the_mission_queue() {
        let mut session = ugv_session();
        session.receive(&from_gcs(1, Body::Connect {
            jobs_available: vec![],
        }));
        session.receive(&from_gcs(2, Body::Start {
            job_type: "deliver".into(),
        }));
        session.receive(&from_gcs(3, Body::AddMission {
            mission_info: MissionInfo {
                task_type: TASK_RETRIEVE.into(),
                lat: 1.0,
                lng: 2.0,
            },
        }));

        let replies = session.receive(&from_gcs(4, Body::Stop));
        assert_eq!(replies[0].body, Body::Ack { ack_id: 4 });
        assert_eq!(session.state(), SessionState::Connected);
        assert_eq!(session.missions_pending(), 0);
        assert_eq!(session.active_job(), None);

        // A duplicated Stop is re-acked, not rejected.
        let replies = session.receive(&from_gcs(4, Body::Stop));
        assert_eq!(replies[0].body, Body::Ack { ack_id: 4 });
    }

    #[test]
    fn out_of_order_commands_are_rejected_with_bad_message() {
        let mut session = ugv_session();

        let replies = session.receive(&from_gcs(9, Body::Start {
            job_type: "deliver".into(),
        }));
        assert!(
            matches!(&replies[0].body, Body::BadMessage { error } if error.contains("id 9")),
            "{:?}",
            replies[0].body
        );
        assert_eq!(session.state(), SessionState::Disconnected);

        session.receive(&from_gcs(1, Body::Connect {
            jobs_available: vec![],
        }));
        let replies = session.receive(&from_gcs(10, Body::AddMission {
            mission_info: MissionInfo {
                task_type: TASK_RETRIEVE.into(),
                lat: 1.0,
                lng: 2.0,
            },
        }));
        assert!(matches!(&replies[0].body, Body::BadMessage { .. }));
        assert_eq!(session.missions_pending(), 0);
    }

    #[test]
    fn duplicate_connect_is_reacked_without_state_regression() {
        let mut session = ugv_session();
        session.receive(&from_gcs(1, Body::Connect {
            jobs_available: vec![],
        }));
        session.receive(&from_gcs(2, Body::Start {
            job_type: "deliver".into(),
        }));

        let replies = session.receive(&from_gcs(1, Body::Connect {
            jobs_available: vec![],
        }));
        assert_eq!(replies[0].body, Body::ConnectionAck);
        assert_eq!(session.state(), SessionState::Working(WorkPhase::Active));
    }

    #[test]
    fn acks_and_bad_messages_are_never_reacknowledged() {
        let mut session = ugv_session();
        assert!(session.receive(&from_gcs(1, Body::Ack { ack_id: 7 })).is_empty());
        assert!(
            session
                .receive(&from_gcs(2, Body::BadMessage {
                    error: "bad".into(),
                }))
                .is_empty()
        );
    }

    #[test]
    fn undecodable_payload_draws_bad_message_and_leaves_state_alone() {
        let mut session = ugv_session();

        let replies = session.receive_payload(b"{\"truncated");
        assert!(matches!(&replies[0].body, Body::BadMessage { .. }));
        assert_eq!(session.state(), SessionState::Disconnected);

        // Unknown kind, with a recoverable id quoted in the error text.
        let replies = session
            .receive_payload(br#"{"type":"unknownKind","id":77,"sid":200,"tid":31,"time":1.0}"#);
        assert!(
            matches!(&replies[0].body, Body::BadMessage { error }
                if error.contains("unknownKind") && error.contains("id 77")),
            "{:?}",
            replies[0].body
        );
        assert_eq!(session.state(), SessionState::Disconnected);
    }

    #[test]
    fn decoded_payload_routes_like_a_typed_message() {
        let mut session = ugv_session();
        let payload = encode(&from_gcs(1, Body::Connect {
            jobs_available: vec![],
        }))
        .unwrap();
        let replies = session.receive_payload(&payload);
        assert_eq!(replies[0].body, Body::ConnectionAck);
        assert_eq!(session.state(), SessionState::Connected);
    }

    #[test]
    fn telemetry_flows_only_while_active() {
        let mut session = ugv_session();
        assert!(session.telemetry_update(&sample()).is_none());

        session.receive(&from_gcs(1, Body::Connect {
            jobs_available: vec![],
        }));
        assert!(session.telemetry_update(&sample()).is_none());

        session.receive(&from_gcs(2, Body::Start {
            job_type: "deliver".into(),
        }));
        let update = session.telemetry_update(&sample()).unwrap();
        assert!(matches!(update.body, Body::Update { battery, .. } if battery == 75.0));

        session.receive(&from_gcs(3, Body::Pause));
        assert!(session.telemetry_update(&sample()).is_none());
    }

    #[test]
    fn finishing_requires_an_active_job() {
        let mut session = ugv_session();
        assert!(matches!(
            session.finish_mission(),
            Err(Error::Lifecycle { op: "complete", .. })
        ));

        session.receive(&from_gcs(1, Body::Connect {
            jobs_available: vec![],
        }));
        session.receive(&from_gcs(2, Body::Start {
            job_type: "deliver".into(),
        }));
        session.receive(&from_gcs(3, Body::Pause));
        assert!(session.finish_mission().is_err());

        session.receive(&from_gcs(4, Body::Resume));
        assert!(session.finish_mission().is_ok());
    }

    #[test]
    fn poi_reports_require_a_running_job() {
        let mut session = ugv_session();
        assert!(session.report_poi("40.44N", "79.99W").is_err());

        session.receive(&from_gcs(1, Body::Connect {
            jobs_available: vec![],
        }));
        session.receive(&from_gcs(2, Body::Start {
            job_type: "retrieve".into(),
        }));
        let poi = session.report_poi("40.44N", "79.99W").unwrap();
        assert_eq!(poi.body, Body::Poi {
            lat: "40.44N".into(),
            lng: "79.99W".into(),
        });

        // Still allowed while paused; the find already happened.
        session.receive(&from_gcs(3, Body::Pause));
        assert!(session.report_poi("1N", "2W").is_ok());
    }
}
