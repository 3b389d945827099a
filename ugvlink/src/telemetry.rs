//! Telemetry source seam.

/// One telemetry reading, as reported in an `update` message.
#[allow(clippy::exhaustive_structs)] // mirrors the update wire fields
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetrySample {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lng: f64,
    /// Heading in degrees clockwise from true north.
    pub heading: f64,
    /// Battery charge remaining, 0–100.
    pub battery: f64,
    /// Free-form vehicle status text.
    pub status: String,
}

/// Source of telemetry readings.
///
/// A minimal read interface so hardware sensors, SITL models, and test
/// stubs interchange under the scheduler without it knowing which it
/// has.
pub trait TelemetrySource {
    /// Takes the current reading.
    fn sample(&mut self) -> TelemetrySample;
}
