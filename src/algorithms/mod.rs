//! Geometry and layout algorithms

pub mod geomath;
pub mod layout;

pub use layout::{HeadingRegion, LayoutParams, ScreenPosition, Viewport};
