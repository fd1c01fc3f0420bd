//! # Playback Session Module
//!
//! The playback core of the streaming client.
//!
//! ## Overview
//!
//! This module handles:
//! - The playback session: one live media handle, queue, shuffle and repeat
//! - Generation-tagged status updates from the host media engine
//! - Bounded, de-duplicated playback history
//! - Pluggable queue traversal (`shuffle-traversal` adds a random policy)
//! - Resetting everything on sign-out through the auth `SignOutHook`

pub mod config;
pub mod error;
pub mod history;
pub mod queue;
pub mod session;
pub mod traversal;
pub mod types;

pub use config::PlaybackConfig;
pub use error::{PlaybackError, Result};
pub use history::History;
pub use queue::{Cursor, PlayQueue};
pub use session::PlaybackSession;
#[cfg(feature = "shuffle-traversal")]
pub use traversal::ShuffleTraversal;
pub use traversal::{default_traversal, QueueTraversal, SequentialTraversal, Step, TraversalContext};
pub use types::{PlaybackPhase, PlaybackSnapshot, RepeatMode};
