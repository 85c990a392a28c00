//! Sensor-data processing: the tracking state machine and pitch filtering

pub mod pitch;
pub mod tracker;

pub use pitch::PitchEstimator;
pub use tracker::{SensorTracker, TrackerConfig, TrackerEvent, TrackerState, TrackingPhase};
