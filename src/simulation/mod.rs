//! Synthetic inputs for tests and benchmarks.

mod layout;
mod shadowing;

pub use layout::{LayoutConfig, generate_layout};
pub use shadowing::{ShadowingConfig, apply_shadowing};
