//! User-contributed songs
//!
//! A [`SongDraft`] holds the raw form fields a user typed. [`SongDraft::validate`]
//! reports the first problem; [`SongDraft::into_song`] validates, trims and
//! fills defaults.

use bridge_traits::Clock;
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CatalogError, Result};
use crate::models::Song;

pub const DEFAULT_ALBUM: &str = "Unknown Album";
pub const DEFAULT_GENRE: &str = "Unknown";
pub const DEFAULT_COVER_URL: &str =
    "https://via.placeholder.com/300x300/1DB954/000000?text=Music";

/// Raw form input. Every field is free text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongDraft {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub genre: String,
    pub audio_url: String,
    pub cover_url: String,
    /// Whole seconds, required
    pub duration: String,
    /// Empty or unparsable means the current year
    pub release_year: String,
}

impl SongDraft {
    pub fn new(
        title: impl Into<String>,
        artist: impl Into<String>,
        audio_url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            audio_url: audio_url.into(),
            ..Self::default()
        }
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = album.into();
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = genre.into();
        self
    }

    pub fn with_cover_url(mut self, url: impl Into<String>) -> Self {
        self.cover_url = url.into();
        self
    }

    pub fn with_duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = duration.into();
        self
    }

    pub fn with_release_year(mut self, year: impl Into<String>) -> Self {
        self.release_year = year.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(CatalogError::invalid("title", "Song title is required"));
        }
        if self.artist.trim().is_empty() {
            return Err(CatalogError::invalid("artist", "Artist name is required"));
        }
        if self.audio_url.trim().is_empty() {
            return Err(CatalogError::invalid("audio_url", "Audio URL is required"));
        }
        self.parse_duration()?;
        Ok(())
    }

    fn parse_duration(&self) -> Result<u32> {
        let raw = self.duration.trim();
        if raw.is_empty() {
            return Err(CatalogError::invalid(
                "duration",
                "Valid duration in seconds is required",
            ));
        }
        raw.parse::<u32>().map_err(|_| {
            CatalogError::invalid(
                "duration",
                format!("Duration must be a whole number of seconds (got {:?})", raw),
            )
        })
    }

    /// Build the song with a fresh id. Blank optional fields take their defaults.
    pub fn into_song(self, clock: &dyn Clock) -> Result<Song> {
        self.validate()?;
        let duration_secs = self.parse_duration()?;
        let release_year = self
            .release_year
            .trim()
            .parse::<i32>()
            .ok()
            .filter(|year| *year > 0)
            .unwrap_or_else(|| clock.now().year());

        Ok(Song {
            id: Uuid::new_v4().to_string(),
            title: self.title.trim().to_string(),
            artist: self.artist.trim().to_string(),
            album: or_default(&self.album, DEFAULT_ALBUM),
            genre: or_default(&self.genre, DEFAULT_GENRE),
            duration_secs,
            cover_url: or_default(&self.cover_url, DEFAULT_COVER_URL),
            audio_url: self.audio_url.trim().to_string(),
            release_year,
        })
    }
}

fn or_default(value: &str, default: &str) -> String {
    match value.trim() {
        "" => default.to_string(),
        trimmed => trimmed.to_string(),
    }
}
