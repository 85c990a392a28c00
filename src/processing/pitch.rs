//! Pitch estimation from low-pass-filtered accelerometer samples.
//!
//! Raw accelerometer data is noisy at frame rate; a first-order low-pass
//! with a small coefficient keeps the gravity vector and discards shake.
//! The pitch angle itself is additionally averaged 50/50 with the previous
//! value so the overlay does not jitter vertically.

use nalgebra::Vector3;

use crate::core::types::DeviceOrientation;

/// Low-pass coefficient for accelerometer smoothing:
/// `filtered = FACTOR * raw + (1 - FACTOR) * filtered`
pub const ACCELERATION_FILTER_FACTOR: f64 = 0.05;

/// Gravity-vector pitch estimator
#[derive(Debug, Clone)]
pub struct PitchEstimator {
    filter_factor: f64,
    filtered: Vector3<f64>,
    previous_pitch: f64,
}

impl Default for PitchEstimator {
    fn default() -> Self {
        Self {
            filter_factor: ACCELERATION_FILTER_FACTOR,
            filtered: Vector3::zeros(),
            previous_pitch: 0.0,
        }
    }
}

impl PitchEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Estimator with a custom low-pass coefficient in (0, 1]
    pub fn with_filter_factor(filter_factor: f64) -> Self {
        Self {
            filter_factor: filter_factor.clamp(f64::MIN_POSITIVE, 1.0),
            ..Self::default()
        }
    }

    /// Feed one raw accelerometer sample (device axes, any unit)
    pub fn add_sample(&mut self, raw: Vector3<f64>) {
        self.filtered = raw * self.filter_factor + self.filtered * (1.0 - self.filter_factor);
    }

    /// Current filtered acceleration vector
    pub fn filtered_acceleration(&self) -> Vector3<f64> {
        self.filtered
    }

    /// Current pitch in degrees for the given device orientation.
    ///
    /// The gravity direction is read off the axis pair that is vertical in
    /// that orientation, offset by 90° so a device held upright reads 0,
    /// then averaged with the previous pitch.
    pub fn pitch(&mut self, orientation: DeviceOrientation) -> f64 {
        let f = &self.filtered;
        let angle = match orientation {
            DeviceOrientation::Portrait => f.z.atan2(f.y),
            DeviceOrientation::PortraitUpsideDown => f.z.atan2(-f.y),
            DeviceOrientation::LandscapeLeft => f.z.atan2(f.x),
            DeviceOrientation::LandscapeRight => f.z.atan2(-f.x),
        };

        let pitch = (self.previous_pitch + (angle.to_degrees() + 90.0)) / 2.0;
        self.previous_pitch = pitch;
        pitch
    }

    /// Drop all filter state
    pub fn reset(&mut self) {
        self.filtered = Vector3::zeros();
        self.previous_pitch = 0.0;
    }
}
