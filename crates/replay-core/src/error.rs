//! Error types for the replay engine.

use thiserror::Error;

/// Main error type for replay operations.
///
/// Running out of index entries is not an error: the navigator reports it as
/// a regular end-of-data state and playback freezes on the last frame.
#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Essence or index file is absent.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The index exists but stayed empty for the whole open backoff window.
    #[error("Resource temporarily unavailable: {0}")]
    TransientUnavailable(String),

    /// Malformed control command or parameter.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Decoder error: {0}")]
    Decoder(String),

    /// Two images that must share a geometry do not.
    #[error("Dimension mismatch: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("Configuration error: {0}")]
    Config(String),

    /// The producer behind a control handle has been dropped.
    #[error("Replay producer has shut down")]
    Disconnected,
}

/// Result type alias for replay operations.
pub type Result<T> = std::result::Result<T, ReplayError>;
