//! Core data types for the overlay engine

use serde::{Deserialize, Serialize};

/// Geodetic coordinate with altitude in meters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
    pub altitude: f64,
}

impl Location {
    /// Create a location at zero altitude
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            altitude: 0.0,
        }
    }

    /// Create a location with an explicit altitude
    pub fn with_altitude(lat: f64, lon: f64, altitude: f64) -> Self {
        Self { lat, lon, altitude }
    }

    /// Whether the coordinate is finite and within geodetic range
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && self.altitude.is_finite()
            && self.lat.abs() <= 90.0
            && self.lon.abs() <= 180.0
    }
}

/// Raw location fix as delivered by a positioning sensor, prior to
/// acceptance filtering
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationFix {
    pub location: Location,
    /// Horizontal accuracy radius in meters; negative means the sensor
    /// could not estimate one
    pub horizontal_accuracy_m: f64,
    /// Fix timestamp, milliseconds since the Unix epoch
    pub timestamp_ms: u64,
}

impl LocationFix {
    pub fn new(location: Location, horizontal_accuracy_m: f64, timestamp_ms: u64) -> Self {
        Self {
            location,
            horizontal_accuracy_m,
            timestamp_ms,
        }
    }

    /// Fix age relative to `now_ms`, saturating at zero for clock skew
    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.timestamp_ms)
    }
}

/// A geolocated point of interest rendered as an overlay marker.
///
/// The derived fields (`distance_from_user`, `azimuth`, `vertical_level`,
/// `active`) are recomputed on every reload cycle and are meaningful only
/// once a user location is known; until then distance and azimuth stay 0
/// and the annotation cannot become active.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Annotation {
    /// Stable identity within the current set, assigned at ingestion
    #[serde(skip)]
    pub id: u32,
    pub title: String,
    pub location: Location,
    /// Great-circle distance from the user in meters
    #[serde(skip)]
    pub distance_from_user: f64,
    /// Compass bearing from user to annotation, degrees [0, 360)
    #[serde(skip)]
    pub azimuth: f64,
    /// Stacking tier; 0 is closest to the horizon line
    #[serde(skip)]
    pub vertical_level: u32,
    /// Whether the annotation is currently eligible to render
    #[serde(skip)]
    pub active: bool,
}

impl Annotation {
    pub fn new(title: impl Into<String>, location: Location) -> Self {
        Self {
            id: 0,
            title: title.into(),
            location,
            distance_from_user: 0.0,
            azimuth: 0.0,
            vertical_level: 0,
            active: false,
        }
    }

    /// Reset the derived fields to their unknown-location state
    pub fn reset_derived(&mut self) {
        self.distance_from_user = 0.0;
        self.azimuth = 0.0;
        self.vertical_level = 0;
        self.active = false;
    }
}

/// Physical device orientation, used to select the accelerometer axes that
/// map to pitch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceOrientation {
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
}

impl Default for DeviceOrientation {
    fn default() -> Self {
        DeviceOrientation::Portrait
    }
}
