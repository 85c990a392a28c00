//! Public engine API: facade, events, view bindings and shared types

pub mod binding;
pub mod events;
pub mod overlay;
pub mod types;

pub use binding::{ViewBindings, ViewFactory};
pub use events::{CallbackHandle, EventCallback, EventDispatcher};
pub use overlay::{OverlayEngine, ReloadKind};
pub use types::{CaptureSetupError, Placement};
