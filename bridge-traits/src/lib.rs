//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the streaming core and the
//! platform-specific capabilities it drives. Each trait represents something the
//! core needs but cannot do by itself: play audio, persist a small key-value
//! profile blob, forward logs to the host, tell time.
//!
//! ## Traits
//!
//! ### Media
//! - [`MediaEngine`](playback::MediaEngine) - Loads an audio source into a handle,
//!   issues play/pause/seek/volume commands and reports status through a
//!   generation-tagged [`StatusSink`](playback::StatusSink)
//!
//! ### Storage
//! - [`SettingsStore`](storage::SettingsStore) - Key-value preferences storage
//!   (AsyncStorage, UserDefaults, SharedPreferences, SQLite on desktop)
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Status |
//! |----------|---------------------|--------|
//! | Desktop  | `bridge-desktop`    | ✅ Simulated engine + SQLite settings |
//! | iOS      | TBD                 | 📋 Planned |
//! | Android  | TBD                 | 📋 Planned |
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type. Platform
//! implementations should convert native failures into it with an actionable
//! message. The playback core never propagates these to its own callers; it
//! logs them and degrades to a stopped state.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so they can be shared behind `Arc`
//! across async tasks.
//!
//! ## Example
//!
//! ```ignore
//! use bridge_traits::playback::{AcquireOptions, MediaEngine, MediaSource, StatusSink};
//!
//! async fn load(engine: &dyn MediaEngine, sink: StatusSink) -> bridge_traits::error::Result<()> {
//!     let source = MediaSource::from_uri("https://cdn.example.com/track.mp3")?;
//!     let handle = engine.acquire(&source, AcquireOptions::default(), sink).await?;
//!     engine.pause(handle).await?;
//!     engine.release(handle).await
//! }
//! ```

pub mod error;
pub mod playback;
pub mod storage;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use playback::{
    AcquireOptions, AudioSessionMode, EngineStatus, MediaEngine, MediaHandle, MediaSource,
    StatusSink, StatusUpdate,
};
pub use storage::{SettingsStore, SettingsTransaction};
pub use time::{Clock, ConsoleLogger, LogEntry, LogLevel, LoggerSink, SystemClock};
