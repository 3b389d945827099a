//! ugvlink field agent — the vehicle side of a GCS radio link.
//!
//! Speaks the ugvlink protocol to a ground station over UDP (standing
//! in for the addressed radio), announces itself, publishes telemetry
//! from a simulated source, and works through whatever missions the
//! station assigns. Configuration comes from the `UGVLINK_*`
//! environment variables below.

mod sim;
mod udp;

use std::fmt::Display;
use std::io;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, mpsc};
use tracing::info;

use ugvlink::{Endpoint, Session, SessionState, WorkPhase, spawn_ugv};
use ugvlink_proto::{GROUND_STATION_SID, Message, TASK_RETRIEVE};

/// Bind address for the local UDP socket.
const ENV_BIND: &str = "UGVLINK_BIND";
/// Address of the ground control station.
const ENV_GCS: &str = "UGVLINK_GCS";
/// Station id of this vehicle.
const ENV_SID: &str = "UGVLINK_SID";
/// Station id of the GCS (defaults to the reserved ground-station id).
const ENV_GCS_SID: &str = "UGVLINK_GCS_SID";
/// Scheduler period in milliseconds (announcements and telemetry).
const ENV_UPDATE_MS: &str = "UGVLINK_UPDATE_MS";
/// Comma-separated job types to advertise in the Connect announcement.
const ENV_JOBS: &str = "UGVLINK_JOBS";

#[tokio::main]
async fn main() -> io::Result<()> {
    tracing_subscriber::fmt().init();

    let gcs_addr: SocketAddr = env_parse(ENV_GCS, "127.0.0.1:14550".parse().map_err(invalid)?)?;
    let sid: u32 = env_parse(ENV_SID, 31)?;
    let gcs_sid: u32 = env_parse(ENV_GCS_SID, GROUND_STATION_SID)?;
    let period = Duration::from_millis(env_parse(ENV_UPDATE_MS, 5_000)?);
    let jobs: Vec<String> = env_or(ENV_JOBS, "deliver,retrieve")
        .split(',')
        .map(|job| job.trim().to_owned())
        .filter(|job| !job.is_empty())
        .collect();

    let link = udp::UdpLink::bind(&env_or(ENV_BIND, "0.0.0.0:14650")).await?;
    info!(local = %link.local_addr()?, gcs = %gcs_addr, sid, "agent up");
    let (tx, rx) = link.split();

    let session = Session::new(Endpoint::new(sid, gcs_sid), jobs);
    let handle = spawn_ugv(tx, rx, gcs_addr, session, sim::SimTelemetry::new(), period);

    let runner = tokio::spawn(run_missions(handle.session(), handle.sender()));

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    runner.abort();
    handle.stop().await;
    Ok(())
}

/// Works through queued mission targets: drive to each (simulated),
/// report a point of interest for retrievals, and mark the job
/// complete once the queue drains.
async fn run_missions(session: Arc<Mutex<Session>>, out: mpsc::Sender<Message>) {
    /// Simulated time to drive to a target.
    const TRAVERSE: Duration = Duration::from_secs(10);

    loop {
        tokio::time::sleep(Duration::from_millis(500)).await;
        let mission = {
            let mut locked = session.lock().await;
            if locked.state() == SessionState::Working(WorkPhase::Active) {
                locked.next_mission()
            } else {
                None
            }
        };
        let Some(mission) = mission else { continue };
        info!(task = %mission.task_type, lat = mission.lat, lng = mission.lng, "driving to target");
        tokio::time::sleep(TRAVERSE).await;

        if mission.task_type == TASK_RETRIEVE {
            let poi = {
                let mut locked = session.lock().await;
                locked
                    .report_poi(format!("{:.6}", mission.lat), format!("{:.6}", mission.lng))
                    .ok()
            };
            if let Some(poi) = poi {
                if out.send(poi).await.is_err() {
                    return;
                }
            }
        }

        let complete = {
            let mut locked = session.lock().await;
            if locked.missions_pending() == 0 {
                locked.finish_mission().ok()
            } else {
                None
            }
        };
        if let Some(msg) = complete {
            info!("mission cycle complete");
            if out.send(msg).await.is_err() {
                return;
            }
        }
    }
}

/// Reads `key` from the environment, falling back to `default`.
fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Reads and parses `key` from the environment, falling back to `default`.
fn env_parse<T>(key: &str, default: T) -> io::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, format!("{key}: {e}"))),
        Err(_) => Ok(default),
    }
}

/// Maps a configuration parse error to `InvalidInput`.
fn invalid(e: impl Display) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
}
