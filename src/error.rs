use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoverageError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(
        "Thresholds must be strictly decreasing: excellent={excellent}, good={good}, fair={fair}, poor={poor}"
    )]
    InvalidThresholds {
        excellent: f64,
        good: f64,
        fair: f64,
        poor: f64,
    },

    #[error("Degenerate coverage shape: {0}")]
    DegenerateShape(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Settings unavailable: {0}")]
    Settings(String),

    #[error("Field worker has stopped")]
    WorkerStopped,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoverageError>;
