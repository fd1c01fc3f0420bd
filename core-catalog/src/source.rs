//! Catalog sources
//!
//! [`CatalogSource`] is the read-only contract the rest of the core consumes.
//! Only `songs`, `playlists` and `genres` are required; lookups and search are
//! provided on top of them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{CatalogError, Result};
use crate::models::{Playlist, Song};

#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn songs(&self) -> Result<Vec<Song>>;

    async fn playlists(&self) -> Result<Vec<Playlist>>;

    async fn genres(&self) -> Result<Vec<String>>;

    /// Find a song by id
    ///
    /// # Errors
    ///
    /// `CatalogError::NotFound` when no song has this id.
    async fn song(&self, id: &str) -> Result<Song> {
        self.songs()
            .await?
            .into_iter()
            .find(|song| song.id == id)
            .ok_or_else(|| CatalogError::NotFound {
                entity_type: "Song".to_string(),
                id: id.to_string(),
            })
    }

    /// Find a playlist by id
    async fn playlist(&self, id: &str) -> Result<Playlist> {
        self.playlists()
            .await?
            .into_iter()
            .find(|playlist| playlist.id == id)
            .ok_or_else(|| CatalogError::NotFound {
                entity_type: "Playlist".to_string(),
                id: id.to_string(),
            })
    }

    /// Case-insensitive substring search over title, artist and album.
    ///
    /// A blank query returns no results rather than the whole catalog.
    async fn search(&self, query: &str) -> Result<Vec<Song>> {
        let needle = Song::normalize(query);
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let results: Vec<Song> = self
            .songs()
            .await?
            .into_iter()
            .filter(|song| song.matches(&needle))
            .collect();

        debug!(query = %needle, results = results.len(), "Catalog search");
        Ok(results)
    }
}

// =============================================================================
// In-memory catalog
// =============================================================================

/// Catalog backed by vectors held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    songs: Vec<Song>,
    playlists: Vec<Playlist>,
    genres: Vec<String>,
}

impl InMemoryCatalog {
    pub fn new(songs: Vec<Song>, playlists: Vec<Playlist>, genres: Vec<String>) -> Self {
        Self {
            songs,
            playlists,
            genres,
        }
    }

    /// The fixed demo catalog shipped with the client.
    pub fn sample() -> Self {
        let songs = vec![
            sample_song("1", "Blinding Lights", "The Weeknd", "After Hours", "Pop", 200, 2019),
            sample_song("2", "Levitating", "Dua Lipa", "Future Nostalgia", "Pop", 203, 2020),
            sample_song("3", "Anti-Hero", "Taylor Swift", "Midnights", "Pop", 200, 2022),
            sample_song("4", "As It Was", "Harry Styles", "Harry's House", "Pop", 167, 2022),
            sample_song("5", "Flowers", "Miley Cyrus", "Endless Summer Vacation", "Pop", 200, 2023),
            sample_song("6", "Bohemian Rhapsody", "Queen", "A Night at the Opera", "Rock", 354, 1975),
            sample_song("7", "Smells Like Teen Spirit", "Nirvana", "Nevermind", "Rock", 301, 1991),
            sample_song("8", "One More Time", "Daft Punk", "Discovery", "Electronic", 320, 2000),
        ];

        let playlists = vec![
            sample_playlist(
                "p1",
                "Today's Top Hits",
                "The biggest songs right now",
                &songs[..5],
                1_704_067_200,
            ),
            sample_playlist(
                "p2",
                "Rock Classics",
                "Rock legends and epic songs",
                &songs[5..7],
                1_704_153_600,
            ),
            sample_playlist(
                "p3",
                "Electronic Essentials",
                "Dance floor staples",
                &songs[7..],
                1_704_240_000,
            ),
        ];

        let genres = ["Pop", "Rock", "Hip-Hop", "Electronic", "Jazz", "Classical", "R&B", "Country"]
            .into_iter()
            .map(str::to_string)
            .collect();

        Self::new(songs, playlists, genres)
    }
}

fn sample_song(
    id: &str,
    title: &str,
    artist: &str,
    album: &str,
    genre: &str,
    duration_secs: u32,
    release_year: i32,
) -> Song {
    Song {
        id: id.to_string(),
        title: title.to_string(),
        artist: artist.to_string(),
        album: album.to_string(),
        genre: genre.to_string(),
        duration_secs,
        cover_url: format!("https://picsum.photos/seed/song{}/300/300", id),
        audio_url: format!(
            "https://www.soundhelix.com/examples/mp3/SoundHelix-Song-{}.mp3",
            id
        ),
        release_year,
    }
}

fn sample_playlist(
    id: &str,
    name: &str,
    description: &str,
    songs: &[Song],
    created_at: i64,
) -> Playlist {
    Playlist {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        cover_url: format!("https://picsum.photos/seed/{}/300/300", id),
        songs: songs.to_vec(),
        created_at: DateTime::<Utc>::from_timestamp(created_at, 0).unwrap_or_default(),
    }
}

#[async_trait]
impl CatalogSource for InMemoryCatalog {
    async fn songs(&self) -> Result<Vec<Song>> {
        Ok(self.songs.clone())
    }

    async fn playlists(&self) -> Result<Vec<Playlist>> {
        Ok(self.playlists.clone())
    }

    async fn genres(&self) -> Result<Vec<String>> {
        Ok(self.genres.clone())
    }
}
