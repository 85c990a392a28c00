//! Core data types and constants

pub mod constants;
pub mod types;

pub use constants::{EARTH_RADIUS_M, H_PIXELS_PER_DEGREE, LAT_LON_FACTOR};
pub use types::{Annotation, DeviceOrientation, Location, LocationFix};
