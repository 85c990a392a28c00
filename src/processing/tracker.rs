//! Location/heading tracking state machine.
//!
//! The tracker sits between the raw sensor feed and the layout engine: it
//! filters degraded fixes, debounces "the user moved" reporting, watches
//! for a location search that never succeeds, and keeps the smoothed
//! accelerometer state that pitch is derived from.
//!
//! All timers are polled deadlines: the host calls [`SensorTracker::poll`]
//! (typically from its frame tick) and due deadlines fire there. Nothing
//! runs off-thread.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::algorithms::geomath;
use crate::core::types::{DeviceOrientation, Location, LocationFix};
use crate::processing::pitch::PitchEstimator;
use crate::sensors::{SensorFeed, SensorResult, SensorSample};
use crate::validation::fix::{FixValidationConfig, FixValidator};

/// Tracker tuning knobs
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Minimum spacing between debounced location reports
    pub report_interval: Duration,
    /// Spacing of "still searching" notifications while no fix is accepted
    pub watchdog_interval: Duration,
    /// How far the user must move from the reload anchor before a
    /// reload-location event fires (meters)
    pub reload_distance_filter_m: f64,
    /// Rewrite accepted fixes to altitude 0 (for hosts that render
    /// annotations as if on the user's horizontal plane)
    pub zero_altitude: bool,
    /// Acceptance bounds for raw fixes
    #[serde(skip)]
    pub fix_validation: FixValidationConfig,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            report_interval: Duration::from_secs(5),
            watchdog_interval: Duration::from_secs(5),
            reload_distance_filter_m: 75.0,
            zero_altitude: true,
            fix_validation: FixValidationConfig::default(),
        }
    }
}

/// Sub-state while tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingPhase {
    SearchingForLocation,
    HasLocation,
}

/// Tracker lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    Stopped,
    Tracking(TrackingPhase),
}

/// Events the tracker emits toward the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerEvent {
    /// New raw heading stored (degrees, [0, 360))
    HeadingUpdated { heading: f64 },
    /// Debounced location report
    UserLocationUpdated { location: Location },
    /// The user moved past the reload distance filter; annotation data
    /// should be refreshed and recomputed from scratch
    ReloadLocationUpdated { location: Location },
    /// Still no accepted fix; advisory only
    LocationSearchFailing {
        elapsed_s: u64,
        has_ever_found_location: bool,
    },
}

/// Debounced, filtered sensor tracking state machine
pub struct SensorTracker {
    config: TrackerConfig,
    validator: FixValidator,
    state: TrackerState,
    feed: Option<Box<dyn SensorFeed>>,
    pitch: PitchEstimator,
    orientation: DeviceOrientation,
    heading: f64,
    user_location: Option<Location>,
    reload_anchor: Option<Location>,
    debug_location: Option<Location>,
    has_ever_found_location: bool,
    started_at: Option<Instant>,
    last_report_at: Option<Instant>,
    report_deadline: Option<Instant>,
    watchdog_deadline: Option<Instant>,
}

impl SensorTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            validator: FixValidator::with_config(config.fix_validation),
            config,
            state: TrackerState::Stopped,
            feed: None,
            pitch: PitchEstimator::new(),
            orientation: DeviceOrientation::default(),
            heading: 0.0,
            user_location: None,
            reload_anchor: None,
            debug_location: None,
            has_ever_found_location: false,
            started_at: None,
            last_report_at: None,
            report_deadline: None,
            watchdog_deadline: None,
        }
    }

    /// Attach the sensor source the tracker will own. Replaces any
    /// previously attached feed.
    pub fn attach_feed(&mut self, feed: Box<dyn SensorFeed>) {
        self.feed = Some(feed);
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    pub fn heading(&self) -> f64 {
        self.heading
    }

    pub fn user_location(&self) -> Option<Location> {
        self.user_location
    }

    pub fn reload_anchor(&self) -> Option<Location> {
        self.reload_anchor
    }

    pub fn set_orientation(&mut self, orientation: DeviceOrientation) {
        self.orientation = orientation;
    }

    /// Current smoothed pitch in degrees
    pub fn pitch(&mut self) -> f64 {
        self.pitch.pitch(self.orientation)
    }

    /// Begin tracking. When `notify_failure_on_timeout` is set, a
    /// search-failing event fires immediately (elapsed 0) and then every
    /// watchdog interval until a fix is accepted.
    pub fn start(&mut self, notify_failure_on_timeout: bool) -> SensorResult<Vec<TrackerEvent>> {
        if matches!(self.state, TrackerState::Tracking(_)) {
            return Ok(Vec::new());
        }

        if let Some(feed) = self.feed.as_mut() {
            feed.start()?;
        }

        let now = Instant::now();
        self.state = TrackerState::Tracking(TrackingPhase::SearchingForLocation);
        self.started_at = Some(now);
        debug!(notify_failure_on_timeout, "tracking started");

        let mut events = Vec::new();
        if notify_failure_on_timeout {
            events.push(TrackerEvent::LocationSearchFailing {
                elapsed_s: 0,
                has_ever_found_location: self.has_ever_found_location,
            });
            self.watchdog_deadline = Some(now + self.config.watchdog_interval);
        }
        Ok(events)
    }

    /// Stop tracking: cancel subscriptions and timers, forget the current
    /// and anchor locations
    pub fn stop(&mut self) {
        if let Some(feed) = self.feed.as_mut() {
            feed.stop();
        }
        self.state = TrackerState::Stopped;
        self.user_location = None;
        self.reload_anchor = None;
        self.started_at = None;
        self.last_report_at = None;
        self.report_deadline = None;
        self.watchdog_deadline = None;
        debug!("tracking stopped");
    }

    /// Drain the attached feed and route every sample
    pub fn pump(&mut self) -> Vec<TrackerEvent> {
        let samples = match self.feed.as_mut() {
            Some(feed) => feed.drain(),
            None => return Vec::new(),
        };

        let mut events = Vec::new();
        for sample in samples {
            match sample {
                SensorSample::Fix(fix) => events.extend(self.process_fix(fix)),
                SensorSample::Heading(heading) => events.extend(self.process_heading(heading)),
                SensorSample::Acceleration(raw) => self.process_acceleration(raw),
            }
        }
        events
    }

    /// Fire any due debounce or watchdog deadline
    pub fn poll(&mut self) -> Vec<TrackerEvent> {
        if !matches!(self.state, TrackerState::Tracking(_)) {
            return Vec::new();
        }

        let now = Instant::now();
        let mut events = Vec::new();

        if self.report_deadline.is_some_and(|deadline| now >= deadline) {
            events.extend(self.report_location());
        }

        if self.watchdog_deadline.is_some_and(|deadline| now >= deadline) {
            let elapsed_s = self
                .started_at
                .map(|at| at.elapsed().as_secs())
                .unwrap_or(0);
            events.push(TrackerEvent::LocationSearchFailing {
                elapsed_s,
                has_ever_found_location: self.has_ever_found_location,
            });
            self.watchdog_deadline = Some(now + self.config.watchdog_interval);
            trace!(elapsed_s, "location search still failing");
        }

        events
    }

    /// Handle one raw location fix.
    ///
    /// Degraded fixes are dropped silently. Accepted fixes disarm the
    /// watchdog, update the current location (subject to the altitude
    /// policy and the debug override) and feed the debounced reporter: the
    /// first fix ever reports immediately, later ones coalesce into a
    /// report scheduled one interval ahead.
    pub fn process_fix(&mut self, fix: LocationFix) -> Vec<TrackerEvent> {
        if !matches!(self.state, TrackerState::Tracking(_)) {
            return Vec::new();
        }

        if let Err(rejection) = self.validator.validate(&fix, current_time_ms()) {
            trace!(%rejection, "location fix dropped");
            return Vec::new();
        }

        self.watchdog_deadline = None;

        let mut location = fix.location;
        if self.config.zero_altitude {
            location.altitude = 0.0;
        }
        if let Some(debug_location) = self.debug_location {
            location = debug_location;
        }

        self.user_location = Some(location);
        if self.reload_anchor.is_none() {
            self.reload_anchor = Some(location);
        }
        self.state = TrackerState::Tracking(TrackingPhase::HasLocation);
        self.has_ever_found_location = true;

        if self.last_report_at.is_none() && self.report_deadline.is_none() {
            return self.report_location();
        }
        if self.report_deadline.is_none() {
            self.report_deadline = Some(Instant::now() + self.config.report_interval);
        }
        Vec::new()
    }

    /// Store a new raw heading, wrapped into [0, 360)
    pub fn process_heading(&mut self, true_heading: f64) -> Vec<TrackerEvent> {
        if !matches!(self.state, TrackerState::Tracking(_)) {
            return Vec::new();
        }
        self.heading = geomath::normalize_degrees(true_heading);
        vec![TrackerEvent::HeadingUpdated {
            heading: self.heading,
        }]
    }

    /// Feed one raw accelerometer sample into the pitch filter
    pub fn process_acceleration(&mut self, raw: Vector3<f64>) {
        self.pitch.add_sample(raw);
    }

    /// Pin the user location to a fixed value, bypassing sensor filtering.
    /// Live fixes keep arriving but are overridden until
    /// [`SensorTracker::stop_debug_mode`].
    pub fn start_debug_mode(&mut self, location: Location) -> Vec<TrackerEvent> {
        debug!(lat = location.lat, lon = location.lon, "debug location armed");
        self.debug_location = Some(location);
        self.user_location = Some(location);
        if self.reload_anchor.is_none() {
            self.reload_anchor = Some(location);
        }
        self.has_ever_found_location = true;
        self.watchdog_deadline = None;
        if matches!(self.state, TrackerState::Tracking(_)) {
            self.state = TrackerState::Tracking(TrackingPhase::HasLocation);
        }
        vec![TrackerEvent::UserLocationUpdated { location }]
    }

    /// Clear the debug override and the live location; tracking resumes
    /// from a fresh search
    pub fn stop_debug_mode(&mut self) {
        debug!("debug location cleared");
        self.debug_location = None;
        self.user_location = None;
        if matches!(self.state, TrackerState::Tracking(_)) {
            self.state = TrackerState::Tracking(TrackingPhase::SearchingForLocation);
        }
    }

    fn report_location(&mut self) -> Vec<TrackerEvent> {
        let Some(location) = self.user_location else {
            return Vec::new();
        };

        self.last_report_at = Some(Instant::now());
        self.report_deadline = None;

        let mut events = vec![TrackerEvent::UserLocationUpdated { location }];
        if let Some(anchor) = self.reload_anchor {
            let moved = geomath::distance(&anchor, &location);
            if moved > self.config.reload_distance_filter_m {
                self.reload_anchor = Some(location);
                debug!(moved_m = moved, "reload anchor moved");
                events.push(TrackerEvent::ReloadLocationUpdated { location });
            }
        }
        events
    }
}

/// Milliseconds since the Unix epoch
pub(crate) fn current_time_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
