//! Input acceptance rules

pub mod fix;

pub use fix::{FixRejection, FixValidationConfig, FixValidator};
