//! Overlay engine facade.
//!
//! Ties the tracker, the annotation store and the layout passes together
//! the way a camera view controller drives them: sensor events route into
//! reload passes of the right depth, and every frame tick yields the
//! placements the presentation layer applies to its views.

use tracing::{debug, trace};

use crate::algorithms::geomath;
use crate::algorithms::layout::{self, HeadingRegion, Viewport};
use crate::api::events::{CallbackHandle, EventCallback, EventDispatcher};
use crate::api::types::Placement;
use crate::core::types::{Annotation, DeviceOrientation, Location};
use crate::processing::tracker::{SensorTracker, TrackerEvent};
use crate::sensors::{SensorFeed, SensorResult, SensorSample};
use crate::store::{AnnotationStore, RecomputeScope};
use crate::utils::config::{
    OverlayConfig, MAX_VERTICAL_LEVEL_LIMIT, MAX_VISIBLE_ANNOTATIONS_LIMIT,
};

/// How deep a reload pass goes. Ordered weakest to strongest so a pending
/// request coalesces to the deepest one asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReloadKind {
    /// Heading crossed a north-band boundary; placements shift but no
    /// geometry changes
    RegionCrossed,
    /// Debounced user movement; refresh distance/azimuth of the active
    /// subset without reordering anything
    UserLocationMoved,
    /// The reload anchor moved (or no layout exists yet); recompute and
    /// re-sort everything, reselect the active subset, restack levels
    ReloadLocationChanged,
    /// The annotation set itself was replaced
    AnnotationsReplaced,
}

/// Initial stacking tier for every active annotation; collision
/// resolution spreads the rest
fn default_classifier(_: &Annotation) -> u32 {
    0
}

/// Single-threaded orchestrator for annotation tracking and layout
pub struct OverlayEngine {
    config: OverlayConfig,
    tracker: SensorTracker,
    store: AnnotationStore,
    dispatcher: EventDispatcher,
    classifier: Box<dyn Fn(&Annotation) -> u32>,
    smoothed_heading: f64,
    heading_initialized: bool,
    region: HeadingRegion,
    reloading: bool,
    reload_pending: Option<ReloadKind>,
}

impl OverlayEngine {
    pub fn new(config: OverlayConfig) -> Self {
        let config = config.clamped();
        Self {
            tracker: SensorTracker::new(config.tracker),
            config,
            store: AnnotationStore::new(),
            dispatcher: EventDispatcher::new(),
            classifier: Box::new(default_classifier),
            smoothed_heading: 0.0,
            heading_initialized: false,
            region: HeadingRegion::NorthRight,
            reloading: false,
            reload_pending: None,
        }
    }

    /// Replace the initial-tier classifier consulted on full reloads
    pub fn set_classifier(&mut self, classifier: Box<dyn Fn(&Annotation) -> u32>) {
        self.classifier = classifier;
    }

    /// Attach the sensor source the engine's tracker will own
    pub fn attach_feed(&mut self, feed: Box<dyn SensorFeed>) {
        self.tracker.attach_feed(feed);
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    // Configuration knobs, clamped like the constructor clamps them

    pub fn set_max_vertical_level(&mut self, level: u32) {
        self.config.max_vertical_level = level.min(MAX_VERTICAL_LEVEL_LIMIT);
    }

    pub fn set_max_visible_annotations(&mut self, count: usize) {
        self.config.max_visible_annotations = count.min(MAX_VISIBLE_ANNOTATIONS_LIMIT);
    }

    pub fn set_max_distance(&mut self, meters: f64) {
        self.config.max_distance_m = meters.max(0.0);
    }

    pub fn set_heading_smoothing_factor(&mut self, factor: f64) {
        self.config.heading_smoothing_factor = if factor.is_finite() {
            factor.clamp(f64::MIN_POSITIVE, 1.0)
        } else {
            1.0
        };
    }

    /// Replace the whole annotation set; invalid coordinates are dropped
    /// and a full reload runs
    pub fn set_annotations(&mut self, annotations: Vec<Annotation>) {
        self.store.set_annotations(annotations);
        self.request_reload(ReloadKind::AnnotationsReplaced);
    }

    pub fn annotations(&self) -> &[Annotation] {
        self.store.annotations()
    }

    /// Ids of the currently active annotations, in master order
    pub fn active_annotation_ids(&self) -> Vec<u32> {
        self.store
            .annotations()
            .iter()
            .filter(|a| a.active)
            .map(|a| a.id)
            .collect()
    }

    /// Force a full recompute of the annotation layout
    pub fn reload(&mut self) {
        self.request_reload(ReloadKind::AnnotationsReplaced);
    }

    /// Begin sensor tracking; see
    /// [`SensorTracker::start`](crate::processing::tracker::SensorTracker::start)
    pub fn start(&mut self, notify_failure_on_timeout: bool) -> SensorResult<()> {
        let events = self.tracker.start(notify_failure_on_timeout)?;
        self.handle_events(&events);
        Ok(())
    }

    /// Stop tracking and deactivate everything
    pub fn stop(&mut self) {
        self.tracker.stop();
        self.store.deactivate_all();
    }

    pub fn set_orientation(&mut self, orientation: DeviceOrientation) {
        self.tracker.set_orientation(orientation);
    }

    /// Current smoothed pitch in degrees
    pub fn pitch(&mut self) -> f64 {
        self.tracker.pitch()
    }

    /// Smoothed heading used for rendering
    pub fn heading(&self) -> f64 {
        self.smoothed_heading
    }

    pub fn user_location(&self) -> Option<Location> {
        self.tracker.user_location()
    }

    pub fn region(&self) -> HeadingRegion {
        self.region
    }

    /// Pin a fake user location, bypassing live sensor filtering
    pub fn start_debug_mode(&mut self, location: Location) {
        let events = self.tracker.start_debug_mode(location);
        self.handle_events(&events);
    }

    /// Clear the fake location and the live one with it
    pub fn stop_debug_mode(&mut self) {
        self.tracker.stop_debug_mode();
        self.store.deactivate_all();
    }

    pub fn add_event_callback(&mut self, callback: EventCallback) -> CallbackHandle {
        self.dispatcher.add_callback(callback)
    }

    pub fn remove_event_callback(&mut self, handle: CallbackHandle) -> bool {
        self.dispatcher.remove_callback(handle)
    }

    /// Route one sensor sample delivered directly by the host (for
    /// platforms whose sensor callbacks bypass a [`SensorFeed`])
    pub fn handle_sample(&mut self, sample: SensorSample) {
        let events = match sample {
            SensorSample::Fix(fix) => self.tracker.process_fix(fix),
            SensorSample::Heading(heading) => self.tracker.process_heading(heading),
            SensorSample::Acceleration(raw) => {
                self.tracker.process_acceleration(raw);
                Vec::new()
            }
        };
        self.handle_events(&events);
    }

    /// One frame tick: drain sensors, fire due timers, advance the
    /// smoothed heading, track region crossings and produce placements
    /// for every active annotation.
    pub fn tick(&mut self, viewport: Viewport) -> Vec<Placement> {
        let mut events = self.tracker.pump();
        events.extend(self.tracker.poll());
        self.handle_events(&events);

        if self.heading_initialized {
            self.smoothed_heading = geomath::smoothed_heading(
                self.smoothed_heading,
                self.tracker.heading(),
                self.config.heading_smoothing_factor,
            );
        }

        let region = HeadingRegion::from_heading(self.smoothed_heading);
        if region != self.region {
            trace!(?region, "heading region crossed");
            self.region = region;
            self.request_reload(ReloadKind::RegionCrossed);
        }

        self.placements(&viewport)
    }

    fn handle_events(&mut self, events: &[TrackerEvent]) {
        for event in events {
            self.dispatcher.dispatch(event);
        }
        for event in events {
            match event {
                TrackerEvent::HeadingUpdated { heading } => {
                    if !self.heading_initialized {
                        // First heading snaps; smoothing from an arbitrary
                        // initial value would sweep markers across the
                        // screen at startup
                        self.smoothed_heading = *heading;
                        self.region = HeadingRegion::from_heading(*heading);
                        self.heading_initialized = true;
                    }
                }
                TrackerEvent::UserLocationUpdated { .. } => {
                    // With no layout yet, or nothing active (fresh start,
                    // debug mode just cleared), an active-only refresh
                    // would do nothing; run the full pass instead
                    let has_active = self.store.annotations().iter().any(|a| a.active);
                    let kind = if self.store.derived_for().is_none() || !has_active {
                        ReloadKind::ReloadLocationChanged
                    } else {
                        ReloadKind::UserLocationMoved
                    };
                    self.request_reload(kind);
                }
                TrackerEvent::ReloadLocationUpdated { .. } => {
                    self.request_reload(ReloadKind::ReloadLocationChanged);
                }
                TrackerEvent::LocationSearchFailing { .. } => {}
            }
        }
    }

    /// Run a reload, or defer it if one is already in flight. A deferred
    /// request keeps the deepest kind asked for and runs as soon as the
    /// in-flight pass finishes.
    fn request_reload(&mut self, kind: ReloadKind) {
        if self.reloading {
            self.reload_pending = Some(match self.reload_pending {
                Some(pending) => pending.max(kind),
                None => kind,
            });
            return;
        }

        self.reloading = true;
        let mut next = Some(kind);
        while let Some(kind) = next {
            self.run_reload(kind);
            next = self.reload_pending.take();
        }
        self.reloading = false;
    }

    fn run_reload(&mut self, kind: ReloadKind) {
        let Some(user) = self.tracker.user_location() else {
            self.store.deactivate_all();
            return;
        };

        match kind {
            ReloadKind::AnnotationsReplaced | ReloadKind::ReloadLocationChanged => {
                debug!(?kind, annotations = self.store.len(), "full reload");
                self.store
                    .recompute_distance_and_azimuth(&user, true, RecomputeScope::All);
                self.store.select_active(
                    self.config.max_visible_annotations,
                    self.config.max_vertical_level,
                    self.config.max_distance_m,
                );

                let params = self.config.layout_params();
                layout::set_initial_vertical_levels(
                    self.store.annotations_mut(),
                    params.max_vertical_level,
                    self.classifier.as_ref(),
                );
                layout::calculate_vertical_levels(
                    self.store.annotations_mut(),
                    params.max_vertical_level,
                    params.collision_threshold_degrees(),
                );
            }
            ReloadKind::UserLocationMoved => {
                self.store
                    .recompute_distance_and_azimuth(&user, false, RecomputeScope::ActiveOnly);
            }
            ReloadKind::RegionCrossed => {
                // Placements are recomputed on the tick that detected the
                // crossing; nothing else moves
            }
        }
    }

    fn placements(&self, viewport: &Viewport) -> Vec<Placement> {
        let params = self.config.layout_params();
        self.store
            .annotations()
            .iter()
            .filter(|a| a.active)
            .map(|a| {
                let pos = layout::position(a, self.smoothed_heading, viewport, &params);
                Placement {
                    annotation_id: a.id,
                    x: pos.x,
                    y: pos.y,
                    vertical_level: a.vertical_level,
                    visible: layout::is_visible(a, self.smoothed_heading, viewport, &params),
                }
            })
            .collect()
    }
}
