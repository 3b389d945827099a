//! Simulated telemetry for link bring-up and soak testing.

use ugvlink::{TelemetrySample, TelemetrySource};

/// Deterministic telemetry walk: a slow arc with a draining battery.
#[derive(Debug)]
pub struct SimTelemetry {
    lat: f64,
    lng: f64,
    heading: f64,
    battery: f64,
}

impl SimTelemetry {
    /// Starts the walk from a fixed reference point.
    pub fn new() -> Self {
        Self {
            lat: 40.442,
            lng: -79.943,
            heading: 0.0,
            battery: 100.0,
        }
    }
}

impl Default for SimTelemetry {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetrySource for SimTelemetry {
    fn sample(&mut self) -> TelemetrySample {
        self.heading = (self.heading + 5.0) % 360.0;
        self.lat += 0.000_05 * self.heading.to_radians().cos();
        self.lng += 0.000_05 * self.heading.to_radians().sin();
        self.battery = (self.battery - 0.01).max(5.0);
        TelemetrySample {
            lat: self.lat,
            lng: self.lng,
            heading: self.heading,
            battery: self.battery,
            status: if self.battery > 20.0 {
                "nominal"
            } else {
                "battery low"
            }
            .to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_walk_moves_and_drains() {
        let mut sim = SimTelemetry::new();
        let first = sim.sample();
        let second = sim.sample();
        assert_ne!(first.lat, second.lat);
        assert!(second.battery < first.battery);
        assert_eq!(first.status, "nominal");
    }
}
