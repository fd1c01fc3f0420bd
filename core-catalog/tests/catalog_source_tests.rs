//! Provided `CatalogSource` methods over a host-defined source

use async_trait::async_trait;
use core_catalog::{CatalogError, CatalogSource, Playlist, Result, Song, SongDraft};
use bridge_traits::SystemClock;

/// A source that fails on playlists, as a flaky backend would.
struct UserSongsOnly {
    songs: Vec<Song>,
}

#[async_trait]
impl CatalogSource for UserSongsOnly {
    async fn songs(&self) -> Result<Vec<Song>> {
        Ok(self.songs.clone())
    }

    async fn playlists(&self) -> Result<Vec<Playlist>> {
        Err(CatalogError::NotFound {
            entity_type: "Playlist".to_string(),
            id: "*".to_string(),
        })
    }

    async fn genres(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

fn user_songs() -> Vec<Song> {
    vec![
        SongDraft::new("Bedroom Demo", "Me", "file:///home/me/demo.mp3")
            .with_duration("95")
            .into_song(&SystemClock)
            .unwrap(),
        SongDraft::new("Live at the Pub", "Me & Friends", "https://example.com/live.mp3")
            .with_album("Bootlegs")
            .with_duration("312")
            .into_song(&SystemClock)
            .unwrap(),
    ]
}

#[tokio::test]
async fn test_search_uses_host_songs() {
    let source = UserSongsOnly { songs: user_songs() };

    let results = source.search("friends").await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title, "Live at the Pub");

    let results = source.search("me").await.unwrap();
    assert_eq!(results.len(), 2);
}

#[tokio::test]
async fn test_song_lookup_by_generated_id() {
    let songs = user_songs();
    let id = songs[0].id.clone();
    let source = UserSongsOnly { songs };

    assert_eq!(source.song(&id).await.unwrap().title, "Bedroom Demo");
}

#[tokio::test]
async fn test_playlist_error_propagates() {
    let source = UserSongsOnly { songs: Vec::new() };
    assert!(source.playlist("p1").await.is_err());
}

#[test]
fn test_song_serializes_with_snake_case_fields() {
    let song = &user_songs()[0];
    let json = serde_json::to_value(song).unwrap();
    assert_eq!(json["duration_secs"], 95);
    assert_eq!(json["album"], "Unknown Album");
}
