/// Latitude/longitude scaling constant used by the flat-earth azimuth
/// approximation. Must not change: consumers depend on the exact bearings
/// this value produces.
pub const LAT_LON_FACTOR: f64 = 1.33975031663018;

/// Mean Earth radius in meters, used by the haversine distance.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Horizontal pixels of virtual overlay per degree of azimuth. A full 360°
/// of azimuth spans `360 * H_PIXELS_PER_DEGREE` pixels of overlay strip.
pub const H_PIXELS_PER_DEGREE: f64 = 14.0;

/// Lower bound on the angular width attributed to one annotation view when
/// testing for horizontal collisions (degrees).
pub const MIN_COLLISION_DEGREES: f64 = 5.0;

/// Half-width of the "near north" heading band (degrees). Controls both the
/// x wraparound correction at the 0°/360° seam and region-change detection.
pub const NORTH_REGION_SPAN_DEGREES: f64 = 40.0;
