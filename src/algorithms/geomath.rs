//! Angular and geodetic math shared by the tracker and the layout engine.
//!
//! The azimuth here is intentionally not a spherical bearing: it is a
//! flat-earth approximation scaled by [`LAT_LON_FACTOR`], kept for
//! compatibility with existing marker placements and because it is cheap
//! enough to run for every annotation on every reload.

use crate::core::constants::{EARTH_RADIUS_M, LAT_LON_FACTOR};
use crate::core::types::Location;

/// Great-circle distance between two locations in meters (haversine)
pub fn distance(a: &Location, b: &Location) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();

    let h = (d_lat * 0.5).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Compass bearing from `user` to `target` in degrees, [0, 360), 0 = north.
///
/// Longitude and latitude deltas are combined as
/// `atan2(lon_delta, lat_delta * LAT_LON_FACTOR)` and the result is rotated
/// by 180° into compass convention. The longitude delta is wrapped into
/// (-180, 180] first so coordinates on either side of the antimeridian
/// produce the same bearing.
pub fn azimuth(user: &Location, target: &Location) -> f64 {
    let d_lat = user.lat - target.lat;
    let d_lon = angular_delta(target.lon, user.lon);

    let angle = d_lon.atan2(d_lat * LAT_LON_FACTOR).to_degrees() + 180.0;
    normalize_degrees(angle)
}

/// Signed smallest difference from angle `a` to angle `b` in degrees,
/// range (-180, 180]
pub fn angular_delta(a: f64, b: f64) -> f64 {
    let mut delta = (b - a).rem_euclid(360.0);
    if delta > 180.0 {
        delta -= 360.0;
    }
    delta
}

/// Wrap an angle into [0, 360)
pub fn normalize_degrees(degrees: f64) -> f64 {
    degrees.rem_euclid(360.0)
}

/// Map an azimuth span to overlay pixels
pub fn degrees_to_pixels(degrees: f64, pixels_per_degree: f64) -> f64 {
    degrees * pixels_per_degree
}

/// Map an overlay pixel span back to degrees of azimuth
pub fn pixels_to_degrees(pixels: f64, pixels_per_degree: f64) -> f64 {
    pixels / pixels_per_degree
}

/// One step of exponential heading smoothing.
///
/// Moves `previous` toward `target` along the shortest angular arc by
/// `factor` of the remaining delta. A factor of 1 snaps to the target;
/// values near 0 smooth heavily. The result is wrapped into [0, 360).
pub fn smoothed_heading(previous: f64, target: f64, factor: f64) -> f64 {
    normalize_degrees(previous + angular_delta(previous, target) * factor)
}
