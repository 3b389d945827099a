//! Vehicle-side peer runtime: inbound listener, scheduler, send pump.
//!
//! Three tasks share nothing but the guarded [`Session`] and an
//! outbound queue:
//!
//! - the **listener** waits on [`RadioRx`] and is the only writer of
//!   lifecycle state;
//! - the **scheduler** ticks on a fixed period, reads state, and emits
//!   whichever message is due — a Connect announcement while
//!   disconnected, a telemetry Update while a job runs;
//! - the **send pump** owns [`RadioTx`] and drains the queue,
//!   fire-and-forget.
//!
//! Neither task can block another: a quiet radio stalls only the
//! listener, and a slow send only backs up the queue.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use ugvlink_proto::{Message, encode};

use crate::link::{RadioRx, RadioTx};
use crate::session::{Session, SessionState, WorkPhase};
use crate::telemetry::TelemetrySource;

/// Depth of the outbound queue feeding the send pump.
const OUTBOUND_DEPTH: usize = 32;

/// Handle to a running vehicle peer.
///
/// Dropping the handle does not stop the tasks; call
/// [`PeerHandle::stop`] for an orderly teardown. No in-flight message
/// is guaranteed to have been acknowledged by then.
#[derive(Debug)]
pub struct PeerHandle {
    session: Arc<Mutex<Session>>,
    outbound: mpsc::Sender<Message>,
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl PeerHandle {
    /// The shared session, for mission runners and state inspection.
    pub fn session(&self) -> Arc<Mutex<Session>> {
        Arc::clone(&self.session)
    }

    /// A handle onto the outbound queue, for sending the vehicle's own
    /// reports (mission completion, points of interest).
    pub fn sender(&self) -> mpsc::Sender<Message> {
        self.outbound.clone()
    }

    /// Stops all three tasks and waits for them to finish.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        for task in self.tasks {
            let _ = task.await;
        }
    }
}

/// Spawns the vehicle-side peer onto the current tokio runtime.
///
/// `gcs` is the link address the pump sends every outbound message to;
/// `period` is the scheduler tick (the announcement/telemetry
/// interval).
pub fn spawn_ugv<Tx, Rx, S>(
    tx: Tx,
    rx: Rx,
    gcs: Tx::Addr,
    session: Session,
    telemetry: S,
    period: Duration,
) -> PeerHandle
where
    Tx: RadioTx + Send + 'static,
    Tx::Addr: Send + Sync + 'static,
    Rx: RadioRx + Send + 'static,
    S: TelemetrySource + Send + 'static,
{
    let session = Arc::new(Mutex::new(session));
    let (out_tx, out_rx) = mpsc::channel(OUTBOUND_DEPTH);
    let (shutdown, _) = watch::channel(false);

    let tasks = vec![
        tokio::spawn(listen(
            rx,
            Arc::clone(&session),
            out_tx.clone(),
            shutdown.subscribe(),
        )),
        tokio::spawn(schedule(
            Arc::clone(&session),
            telemetry,
            period,
            out_tx.clone(),
            shutdown.subscribe(),
        )),
        tokio::spawn(pump(tx, gcs, out_rx, shutdown.subscribe())),
    ];

    PeerHandle {
        session,
        outbound: out_tx,
        shutdown,
        tasks,
    }
}

/// Inbound listener: the sole writer of lifecycle state.
async fn listen<Rx: RadioRx>(
    mut rx: Rx,
    session: Arc<Mutex<Session>>,
    out: mpsc::Sender<Message>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        let payload = tokio::select! {
            _ = shutdown.changed() => return,
            received = rx.recv() => match received {
                Ok(payload) => payload,
                Err(e) => {
                    warn!(%e, "inbound side of the link closed");
                    return;
                }
            },
        };
        let replies = session.lock().await.receive_payload(&payload);
        for reply in replies {
            if out.send(reply).await.is_err() {
                return;
            }
        }
    }
}

/// Periodic scheduler: reads state, never writes it.
async fn schedule<S: TelemetrySource>(
    session: Arc<Mutex<Session>>,
    mut telemetry: S,
    period: Duration,
    out: mpsc::Sender<Message>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(period);
    loop {
        tokio::select! {
            _ = shutdown.changed() => return,
            _ = ticker.tick() => {}
        }
        let due = {
            let mut locked = session.lock().await;
            match locked.state() {
                // Keep announcing until a connectionAck opens the session.
                SessionState::Disconnected => Some(locked.connect_request()),
                SessionState::Working(WorkPhase::Active) => {
                    let sample = telemetry.sample();
                    locked.telemetry_update(&sample)
                }
                _ => None,
            }
        };
        if let Some(msg) = due {
            if out.send(msg).await.is_err() {
                return;
            }
        }
    }
}

/// Send pump: sole owner of the outbound link half.
async fn pump<Tx: RadioTx>(
    mut tx: Tx,
    dest: Tx::Addr,
    mut out: mpsc::Receiver<Message>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        let msg = tokio::select! {
            _ = shutdown.changed() => return,
            queued = out.recv() => match queued {
                Some(msg) => msg,
                None => return,
            },
        };
        match encode(&msg) {
            Ok(payload) => {
                if let Err(e) = tx.send(&dest, &payload).await {
                    // Fire-and-forget: a failed send is a dropped message.
                    warn!(kind = msg.body.kind(), id = msg.id, %e, "send failed, message dropped");
                } else {
                    debug!(kind = msg.body.kind(), id = msg.id, "sent");
                }
            }
            Err(e) => warn!(kind = msg.body.kind(), %e, "unencodable message dropped"),
        }
    }
}
