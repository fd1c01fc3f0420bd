//! Domain models for the catalog
//!
//! Records are immutable once created; identity is the `id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

// =============================================================================
// Song
// =============================================================================

/// A playable song.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub genre: String,
    /// Length in whole seconds
    pub duration_secs: u32,
    pub cover_url: String,
    /// Audio reference: `http(s)://` URL, `file://` URI or absolute path.
    /// Empty means the song has no audio of its own.
    pub audio_url: String,
    pub release_year: i32,
}

impl Song {
    pub fn duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.duration_secs))
    }

    pub fn has_audio(&self) -> bool {
        !self.audio_url.trim().is_empty()
    }

    /// Whether title, artist or album contains `needle`, which must already be
    /// normalized with [`Song::normalize`].
    pub fn matches(&self, needle: &str) -> bool {
        [&self.title, &self.artist, &self.album]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }

    /// Validate song data
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("Song id cannot be empty".to_string());
        }

        if self.title.trim().is_empty() {
            return Err("Song title cannot be empty".to_string());
        }

        if self.artist.trim().is_empty() {
            return Err("Song artist cannot be empty".to_string());
        }

        Ok(())
    }

    /// Normalize a string for searching (lowercase, trimmed)
    pub fn normalize(s: &str) -> String {
        s.trim().to_lowercase()
    }
}

// =============================================================================
// Playlist
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub description: String,
    pub cover_url: String,
    pub songs: Vec<Song>,
    pub created_at: DateTime<Utc>,
}

impl Playlist {
    pub fn total_duration_secs(&self) -> u64 {
        self.songs.iter().map(|s| u64::from(s.duration_secs)).sum()
    }

    /// Index of the first entry with `song_id`.
    pub fn position_of(&self, song_id: &str) -> Option<usize> {
        self.songs.iter().position(|s| s.id == song_id)
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }
}
