pub mod config;
pub mod constants;
pub mod coverage;
pub mod emitter;
pub mod error;
pub mod field;
pub mod geometry;
pub mod output;
pub mod propagation;
pub mod quality;
pub mod render;
pub mod settings;

#[cfg(feature = "simulation")]
pub mod simulation;

pub use config::EngineSettings;
pub use error::{CoverageError, Result};
