//! Error types for PetalCue

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PetalCueError {
    #[error("Engine is not initialized")]
    NotInitialized,

    #[error("Reverb is not available on this engine")]
    ReverbUnavailable,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Spatial audio error: {0}")]
    SpatialAudio(String),

    #[error("Reverb error: {0}")]
    Reverb(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Audio loading error: {0}")]
    AudioLoading(String),

    #[error("Audio device error: {0}")]
    AudioDevice(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PetalCueError>;
