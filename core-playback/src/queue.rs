//! Play queue
//!
//! An ordered list of songs and a cursor. The cursor follows the song that is
//! playing: removing an entry before it shifts it down, and removing the
//! playing entry itself detaches it while remembering which entry came next.

use core_catalog::Song;
use serde::{Deserialize, Serialize};

/// Where the queue stands relative to the playing song.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cursor {
    /// Nothing from this queue has been played.
    #[default]
    Unset,
    /// The song at this index is the current one.
    At(usize),
    /// The current song was removed; `follower` is the index of the entry
    /// that came after it (may equal the queue length).
    Detached { follower: usize },
}

#[derive(Debug, Clone, Default)]
pub struct PlayQueue {
    songs: Vec<Song>,
    cursor: Cursor,
}

impl PlayQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the queue `song` is played from.
    ///
    /// When `queue` does not contain `song` (or is empty), the song is played
    /// as a queue of one instead of leaving the cursor dangling.
    pub fn resolve(song: &Song, queue: Option<Vec<Song>>) -> Self {
        let songs = queue.unwrap_or_default();
        match songs.iter().position(|s| s.id == song.id) {
            Some(index) => Self {
                songs,
                cursor: Cursor::At(index),
            },
            None => Self {
                songs: vec![song.clone()],
                cursor: Cursor::At(0),
            },
        }
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub fn get(&self, index: usize) -> Option<&Song> {
        self.songs.get(index)
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Index of the current song, if it is still in the queue.
    pub fn current_index(&self) -> Option<usize> {
        match self.cursor {
            Cursor::At(index) => Some(index),
            _ => None,
        }
    }

    /// Song under the cursor, if it is still in the queue.
    pub fn current(&self) -> Option<&Song> {
        self.current_index().and_then(|index| self.songs.get(index))
    }

    /// Point the cursor at `index`. Returns `false` when out of range.
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.songs.len() {
            return false;
        }
        self.cursor = Cursor::At(index);
        true
    }

    pub fn push(&mut self, song: Song) {
        self.songs.push(song);
    }

    /// Remove the entry at `index`, keeping the cursor on the playing song.
    ///
    /// Out-of-range indices are ignored.
    pub fn remove(&mut self, index: usize) -> Option<Song> {
        if index >= self.songs.len() {
            return None;
        }
        let removed = self.songs.remove(index);

        self.cursor = match self.cursor {
            Cursor::At(current) if index < current => Cursor::At(current - 1),
            Cursor::At(current) if index == current => Cursor::Detached { follower: index },
            Cursor::Detached { follower } if index < follower => Cursor::Detached {
                follower: follower - 1,
            },
            other => other,
        };
        if self.songs.is_empty() {
            self.cursor = Cursor::Unset;
        }

        Some(removed)
    }

    pub fn clear(&mut self) {
        self.songs.clear();
        self.cursor = Cursor::Unset;
    }
}
