//! Scripted sensor feed for tests and development

use std::collections::VecDeque;

use nalgebra::Vector3;

use crate::core::types::{Location, LocationFix};
use crate::sensors::{SensorError, SensorFeed, SensorResult, SensorSample};

/// Queue-backed [`SensorFeed`] that replays whatever the test pushes into it
#[derive(Debug, Default)]
pub struct MockSensorFeed {
    queue: VecDeque<SensorSample>,
    running: bool,
    fail_on_start: Option<String>,
}

impl MockSensorFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `start` call fail with the given reason
    pub fn fail_on_start(&mut self, reason: impl Into<String>) {
        self.fail_on_start = Some(reason.into());
    }

    pub fn push_sample(&mut self, sample: SensorSample) {
        self.queue.push_back(sample);
    }

    pub fn push_fix(&mut self, location: Location, accuracy_m: f64, timestamp_ms: u64) {
        self.push_sample(SensorSample::Fix(LocationFix::new(
            location,
            accuracy_m,
            timestamp_ms,
        )));
    }

    pub fn push_heading(&mut self, heading: f64) {
        self.push_sample(SensorSample::Heading(heading));
    }

    pub fn push_acceleration(&mut self, raw: Vector3<f64>) {
        self.push_sample(SensorSample::Acceleration(raw));
    }

    pub fn queued_len(&self) -> usize {
        self.queue.len()
    }
}

impl SensorFeed for MockSensorFeed {
    fn start(&mut self) -> SensorResult<()> {
        if let Some(reason) = self.fail_on_start.take() {
            return Err(SensorError::StartFailed { reason });
        }
        self.running = true;
        Ok(())
    }

    fn stop(&mut self) {
        self.running = false;
        self.queue.clear();
    }

    fn drain(&mut self) -> Vec<SensorSample> {
        if !self.running {
            return Vec::new();
        }
        self.queue.drain(..).collect()
    }

    fn is_running(&self) -> bool {
        self.running
    }
}
