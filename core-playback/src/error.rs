//! # Playback Error Types
//!
//! Errors raised inside the playback session. None of them reach callers of
//! the command surface: the session logs them, reports them on the event bus
//! and degrades to a safe stopped state.

use bridge_traits::BridgeError;
use thiserror::Error;

/// Errors that can occur during playback operations.
#[derive(Error, Debug)]
pub enum PlaybackError {
    // ========================================================================
    // Source Errors
    // ========================================================================
    /// The song's audio reference could not be turned into a media source.
    #[error("Unusable audio source for {track_id}: {message}")]
    InvalidSource { track_id: String, message: String },

    /// The engine failed to load the source.
    #[error("Failed to acquire media for {track_id}: {message}")]
    AcquireFailed { track_id: String, message: String },

    // ========================================================================
    // Playback Control Errors
    // ========================================================================
    /// A command against the live handle failed.
    #[error("Engine command '{command}' failed: {message}")]
    CommandFailed {
        command: &'static str,
        message: String,
    },

    /// The engine is not available on this platform.
    #[error("Media engine unavailable: {0}")]
    EngineUnavailable(String),

    /// Invalid volume value (must be in range [0.0, 1.0]).
    #[error("Invalid volume: {0} (must be between 0.0 and 1.0)")]
    InvalidVolume(f32),

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Invalid playback configuration.
    #[error("Invalid playback configuration: {0}")]
    Config(String),
}

impl PlaybackError {
    /// Classify an engine failure for `command`.
    pub fn from_engine(command: &'static str, err: BridgeError) -> Self {
        match err {
            BridgeError::NotAvailable(message) => PlaybackError::EngineUnavailable(message),
            other => PlaybackError::CommandFailed {
                command,
                message: other.to_string(),
            },
        }
    }

    /// Returns `true` if retrying the same command could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PlaybackError::AcquireFailed { .. } | PlaybackError::CommandFailed { .. }
        )
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
