//! Playback state types shared by the session and its observers.

use core_catalog::Song;
use serde::{Deserialize, Serialize};
use std::fmt;

/// End-of-track and end-of-queue behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    #[default]
    Off,
    /// Wrap to the start of the queue after the last song.
    All,
    /// Loop the current song.
    One,
}

impl RepeatMode {
    /// Next mode in the `off -> all -> one -> off` cycle.
    pub fn cycle(self) -> Self {
        match self {
            RepeatMode::Off => RepeatMode::All,
            RepeatMode::All => RepeatMode::One,
            RepeatMode::One => RepeatMode::Off,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RepeatMode::Off => "off",
            RepeatMode::All => "all",
            RepeatMode::One => "one",
        }
    }

    /// Whether a freshly acquired handle should loop.
    pub fn loops_track(&self) -> bool {
        matches!(self, RepeatMode::One)
    }
}

impl fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse state of the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackPhase {
    /// No song loaded.
    #[default]
    Idle,
    /// Acquisition in flight.
    Loading,
    Playing,
    Paused,
    /// The engine reported completion and the session has not moved on yet.
    Ended,
}

/// Immutable view of the session published to renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    pub phase: PlaybackPhase,
    pub current_song: Option<Song>,
    pub playing: bool,
    pub position_secs: u64,
    pub duration_secs: u64,
    pub volume: f32,
    pub queue: Vec<Song>,
    /// Queue position of the current song. `None` when the queue is empty,
    /// nothing has been played yet, or the playing entry was removed.
    pub current_index: Option<usize>,
    pub shuffle: bool,
    pub repeat: RepeatMode,
}

impl PlaybackSnapshot {
    /// Snapshot of a fresh session.
    pub fn initial(volume: f32) -> Self {
        Self {
            phase: PlaybackPhase::Idle,
            current_song: None,
            playing: false,
            position_secs: 0,
            duration_secs: 0,
            volume,
            queue: Vec::new(),
            current_index: None,
            shuffle: false,
            repeat: RepeatMode::Off,
        }
    }

    /// Id of the current song, if any.
    pub fn current_id(&self) -> Option<&str> {
        self.current_song.as_ref().map(|song| song.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeat_cycle() {
        let mut mode = RepeatMode::default();
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(mode.as_str());
            mode = mode.cycle();
        }
        assert_eq!(seen, vec!["off", "all", "one", "off"]);
    }

    #[test]
    fn test_repeat_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&RepeatMode::All).unwrap(), "\"all\"");
        assert!(RepeatMode::One.loops_track());
        assert!(!RepeatMode::All.loops_track());
    }

    #[test]
    fn test_initial_snapshot() {
        let snapshot = PlaybackSnapshot::initial(1.0);
        assert_eq!(snapshot.phase, PlaybackPhase::Idle);
        assert!(!snapshot.playing);
        assert!(snapshot.current_id().is_none());
    }
}
