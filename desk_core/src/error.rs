//! Error types for the desk_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for desk_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A device could not be brought up
    #[error("Device initialization failed: {0}")]
    DeviceInit(String),

    /// Distance sensor read failed
    #[error("Sensor read failed: {0}")]
    Sensor(String),

    /// Indicator write failed
    #[error("Indicator write failed: {0}")]
    Indicator(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
