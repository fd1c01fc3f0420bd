//! Playback history
//!
//! Bounded, most-recent-first list of songs that started playing. A song
//! appears at most once; playing it again moves it to the front.

use core_catalog::Song;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct History {
    /// Most recent at the front
    songs: VecDeque<Song>,
    max_size: usize,
}

impl History {
    /// A `max_size` of 0 is treated as 1.
    pub fn new(max_size: usize) -> Self {
        let max_size = max_size.max(1);
        Self {
            songs: VecDeque::with_capacity(max_size),
            max_size,
        }
    }

    /// Record a play. Any earlier entry with the same id is dropped and the
    /// oldest entries fall off past `max_size`.
    pub fn push(&mut self, song: Song) {
        self.songs.retain(|existing| existing.id != song.id);
        self.songs.push_front(song);
        self.songs.truncate(self.max_size);
    }

    pub fn most_recent(&self) -> Option<&Song> {
        self.songs.front()
    }

    /// All entries, most recent first.
    pub fn to_vec(&self) -> Vec<Song> {
        self.songs.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn clear(&mut self) {
        self.songs.clear();
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(id: &str) -> Song {
        Song {
            id: id.to_string(),
            title: format!("Song {}", id),
            artist: "Artist".to_string(),
            album: "Album".to_string(),
            genre: "Pop".to_string(),
            duration_secs: 180,
            cover_url: String::new(),
            audio_url: format!("https://cdn.example.com/{}.mp3", id),
            release_year: 2020,
        }
    }

    fn ids(history: &History) -> Vec<String> {
        history.to_vec().into_iter().map(|s| s.id).collect()
    }

    #[test]
    fn test_most_recent_first() {
        let mut history = History::new(50);
        history.push(song("a"));
        history.push(song("b"));
        history.push(song("c"));

        assert_eq!(ids(&history), vec!["c", "b", "a"]);
        assert_eq!(history.most_recent().unwrap().id, "c");
    }

    #[test]
    fn test_replay_moves_to_front() {
        let mut history = History::new(50);
        history.push(song("a"));
        history.push(song("b"));
        history.push(song("a"));

        assert_eq!(ids(&history), vec!["a", "b"]);
    }

    #[test]
    fn test_bounded_size() {
        let mut history = History::new(3);
        for id in ["a", "b", "c", "d"] {
            history.push(song(id));
        }

        assert_eq!(history.len(), 3);
        assert_eq!(ids(&history), vec!["d", "c", "b"]);
    }

    #[test]
    fn test_zero_size_keeps_one() {
        let mut history = History::new(0);
        history.push(song("a"));
        history.push(song("b"));
        assert_eq!(history.max_size(), 1);
        assert_eq!(ids(&history), vec!["b"]);
    }

    #[test]
    fn test_clear() {
        let mut history = History::new(5);
        history.push(song("a"));
        history.clear();
        assert!(history.is_empty());
    }
}
