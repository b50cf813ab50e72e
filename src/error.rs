//! Error types for the voice tracker

use thiserror::Error;

/// Result type alias for tracker operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the voice tracker
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Camera produced no frame or could not be opened
    #[error("camera error: {0}")]
    Camera(String),

    /// Speech backend failed to initialize
    #[error("speech model failed to load: {0}")]
    ModelLoad(String),

    /// Speech input/output error
    #[error("speech error: {0}")]
    Speech(String),

    /// Display sink error
    #[error("display error: {0}")]
    Display(String),

    /// Still capture could not be written
    #[error("capture error: {0}")]
    Capture(String),

    /// A worker task panicked or was cancelled
    #[error("task error: {0}")]
    Task(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding/encoding error
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
