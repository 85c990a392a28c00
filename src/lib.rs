//! AR Annotation Overlay Engine
//!
//! Renders geolocated points of interest as overlay markers on a live
//! camera feed, positioned by compass heading and decluttered through a
//! vertical-stacking collision pass. Sensor input flows through a
//! debounced, filtered tracking state machine; the host drives one frame
//! tick per display refresh and applies the resulting placements to its
//! views.

pub mod algorithms;
pub mod api;
pub mod core;
pub mod processing;
pub mod sensors;
pub mod store;
pub mod utils;
pub mod validation;

// Re-export commonly used types
pub use algorithms::layout::{HeadingRegion, LayoutParams, ScreenPosition, Viewport};
pub use api::{
    CallbackHandle, CaptureSetupError, EventDispatcher, OverlayEngine, Placement, ReloadKind,
    ViewBindings,
};
pub use core::types::{Annotation, DeviceOrientation, Location, LocationFix};
pub use processing::pitch::PitchEstimator;
pub use processing::tracker::{
    SensorTracker, TrackerConfig, TrackerEvent, TrackerState, TrackingPhase,
};
pub use sensors::{MockSensorFeed, SensorError, SensorFeed, SensorResult, SensorSample};
pub use store::{AnnotationStore, RecomputeScope};
pub use utils::config::{ConfigError, OverlayConfig};
pub use validation::fix::{FixRejection, FixValidationConfig, FixValidator};
