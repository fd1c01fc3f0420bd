//! Media engine bridge and supporting playback types.
//!
//! The core never decodes audio. It hands a [`MediaSource`] to the host's
//! [`MediaEngine`], receives an opaque [`MediaHandle`] back, and from then on
//! drives that handle with simple commands. Status flows the other way through a
//! [`StatusSink`]: every sink is stamped with the generation the core assigned to
//! the acquisition, so updates from a superseded handle can be recognised and
//! dropped mechanically.

use crate::error::{BridgeError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Opaque identifier for one loaded audio source inside a [`MediaEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MediaHandle(Uuid);

impl MediaHandle {
    /// Generate a new handle identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

}

impl Default for MediaHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MediaHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where the engine should load audio from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaSource {
    /// HTTP(S) resource streamed by the host.
    Remote { url: String },
    /// File on the device.
    LocalFile { path: PathBuf },
}

impl MediaSource {
    /// Parse a song's audio reference into a source.
    ///
    /// `http://` and `https://` become [`MediaSource::Remote`], `file://` URIs
    /// and absolute paths become [`MediaSource::LocalFile`]. Anything else,
    /// including an empty reference, is rejected.
    pub fn from_uri(uri: &str) -> Result<Self> {
        let uri = uri.trim();
        if uri.is_empty() {
            return Err(BridgeError::UnsupportedSource(
                "empty audio reference".to_string(),
            ));
        }

        let lower = uri.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return Ok(Self::Remote {
                url: uri.to_string(),
            });
        }

        if lower.starts_with("file://") {
            return Ok(Self::LocalFile {
                path: PathBuf::from(&uri["file://".len()..]),
            });
        }

        if uri.starts_with('/') {
            return Ok(Self::LocalFile {
                path: PathBuf::from(uri),
            });
        }

        Err(BridgeError::UnsupportedSource(uri.to_string()))
    }

    /// Determine whether the source represents remote content.
    pub fn is_remote(&self) -> bool {
        matches!(self, MediaSource::Remote { .. })
    }
}

impl fmt::Display for MediaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaSource::Remote { url } => write!(f, "{}", url),
            MediaSource::LocalFile { path } => write!(f, "file://{}", path.display()),
        }
    }
}

/// Options supplied alongside an acquisition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcquireOptions {
    /// Initial volume (0.0 = muted, 1.0 = unity gain).
    pub initial_volume: f32,
    /// Whether the engine should loop the source on completion.
    pub looping: bool,
    /// Start playing as soon as the source is loaded.
    pub autoplay: bool,
    /// Duration known from the catalog, for engines that cannot probe it.
    pub duration_hint_ms: Option<u64>,
}

impl Default for AcquireOptions {
    fn default() -> Self {
        Self {
            initial_volume: 1.0,
            looping: false,
            autoplay: true,
            duration_hint_ms: None,
        }
    }
}

/// Platform audio session behaviour requested once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioSessionMode {
    pub play_in_background: bool,
    pub play_in_silent_mode: bool,
    pub duck_others: bool,
}

impl Default for AudioSessionMode {
    fn default() -> Self {
        Self {
            play_in_background: true,
            play_in_silent_mode: true,
            duck_others: true,
        }
    }
}

/// Snapshot reported by the engine for a loaded handle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStatus {
    pub loaded: bool,
    pub position_ms: u64,
    pub duration_ms: Option<u64>,
    pub playing: bool,
    pub did_just_finish: bool,
    pub looping: bool,
}

/// A status report tagged with the generation of the acquisition it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusUpdate {
    pub generation: u64,
    pub status: EngineStatus,
}

/// Sending half of the status channel, bound to one acquisition.
///
/// Engines clone and keep the sink for as long as the handle lives and call
/// [`StatusSink::emit`] periodically and on completion. Emitting after the core
/// has gone away is silently ignored.
#[derive(Debug, Clone)]
pub struct StatusSink {
    generation: u64,
    tx: mpsc::UnboundedSender<StatusUpdate>,
}

impl StatusSink {
    pub fn new(generation: u64, tx: mpsc::UnboundedSender<StatusUpdate>) -> Self {
        Self { generation, tx }
    }

    /// Generation this sink stamps on every update.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Report a status. Returns `false` once the receiving side is closed.
    pub fn emit(&self, status: EngineStatus) -> bool {
        self.tx
            .send(StatusUpdate {
                generation: self.generation,
                status,
            })
            .is_ok()
    }

    /// Whether the receiving side has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Platform media playback capability.
///
/// # Contract
///
/// - `acquire` loads the source and returns a handle; with
///   [`AcquireOptions::autoplay`] the handle starts playing immediately.
/// - Commands against a released or unknown handle fail with
///   [`BridgeError::HandleNotLoaded`].
/// - `release` is best effort; callers do not wait for the engine to finish
///   tearing down before acquiring the next handle.
/// - Status reports go through the sink passed to `acquire`, never through any
///   other channel.
///
/// # Example
///
/// ```ignore
/// let handle = engine.acquire(&source, options, sink).await?;
/// engine.set_volume(handle, 0.5).await?;
/// engine.seek(handle, 30_000).await?;
/// ```
#[async_trait]
pub trait MediaEngine: Send + Sync {
    /// Apply platform audio session settings (background playback, ducking).
    async fn configure_session(&self, _mode: AudioSessionMode) -> Result<()> {
        Ok(())
    }

    /// Load `source` and return a handle for it.
    async fn acquire(
        &self,
        source: &MediaSource,
        options: AcquireOptions,
        sink: StatusSink,
    ) -> Result<MediaHandle>;

    /// Unload the handle and free its resources.
    async fn release(&self, handle: MediaHandle) -> Result<()>;

    /// Start or resume playback.
    async fn play(&self, handle: MediaHandle) -> Result<()>;

    /// Pause playback. Pausing a paused handle succeeds.
    async fn pause(&self, handle: MediaHandle) -> Result<()>;

    /// Move to an absolute position in milliseconds.
    async fn seek(&self, handle: MediaHandle, position_ms: u64) -> Result<()>;

    /// Set the handle's volume in `[0.0, 1.0]`.
    async fn set_volume(&self, handle: MediaHandle, volume: f32) -> Result<()>;

    /// Toggle looping on a live handle.
    async fn set_looping(&self, _handle: MediaHandle, _looping: bool) -> Result<()> {
        Ok(())
    }
}
