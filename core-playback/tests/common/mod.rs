//! Recording media engine and song fixtures shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use bridge_traits::{
    error::Result, AcquireOptions, AudioSessionMode, BridgeError, EngineStatus, MediaEngine,
    MediaHandle, MediaSource, StatusSink,
};
use core_catalog::Song;
use core_playback::{PlaybackConfig, PlaybackSession};
use core_runtime::events::EventBus;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Configure,
    Acquire {
        source: String,
        volume: f32,
        looping: bool,
    },
    Release(MediaHandle),
    Play(MediaHandle),
    Pause(MediaHandle),
    Seek(MediaHandle, u64),
    Volume(MediaHandle, f32),
    Looping(MediaHandle, bool),
}

#[derive(Default)]
struct Inner {
    calls: Vec<Call>,
    live: HashSet<MediaHandle>,
    /// Sink of every acquisition, in order.
    sinks: Vec<StatusSink>,
    failing_sources: HashSet<String>,
    fail_commands: bool,
}

/// Engine that records every call and never emits status on its own.
#[derive(Clone, Default)]
pub struct RecordingEngine {
    inner: Arc<Mutex<Inner>>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_source(&self, url: &str) {
        self.inner.lock().failing_sources.insert(url.to_string());
    }

    pub fn fail_commands(&self, fail: bool) {
        self.inner.lock().fail_commands = fail;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().calls.clone()
    }

    pub fn live_count(&self) -> usize {
        self.inner.lock().live.len()
    }

    pub fn acquisitions(&self) -> Vec<(String, f32, bool)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Acquire {
                    source,
                    volume,
                    looping,
                } => Some((source, volume, looping)),
                _ => None,
            })
            .collect()
    }

    /// Sink of the `n`th acquisition.
    pub fn sink(&self, n: usize) -> StatusSink {
        self.inner.lock().sinks[n].clone()
    }

    /// Report `status` through the most recent acquisition's sink.
    pub fn emit_latest(&self, status: EngineStatus) {
        let sink = self.inner.lock().sinks.last().cloned();
        if let Some(sink) = sink {
            sink.emit(status);
        }
    }

    fn command(&self, call: Call, handle: MediaHandle) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.calls.push(call);
        if inner.fail_commands {
            return Err(BridgeError::OperationFailed("injected failure".to_string()));
        }
        if !inner.live.contains(&handle) {
            return Err(BridgeError::HandleNotLoaded(handle.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl MediaEngine for RecordingEngine {
    async fn configure_session(&self, _mode: AudioSessionMode) -> Result<()> {
        self.inner.lock().calls.push(Call::Configure);
        Ok(())
    }

    async fn acquire(
        &self,
        source: &MediaSource,
        options: AcquireOptions,
        sink: StatusSink,
    ) -> Result<MediaHandle> {
        let mut inner = self.inner.lock();
        let source = source.to_string();
        inner.calls.push(Call::Acquire {
            source: source.clone(),
            volume: options.initial_volume,
            looping: options.looping,
        });
        inner.sinks.push(sink);

        if inner.failing_sources.contains(&source) {
            return Err(BridgeError::OperationFailed(format!("cannot load {}", source)));
        }

        let handle = MediaHandle::new();
        inner.live.insert(handle);
        Ok(handle)
    }

    async fn release(&self, handle: MediaHandle) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.calls.push(Call::Release(handle));
        inner.live.remove(&handle);
        Ok(())
    }

    async fn play(&self, handle: MediaHandle) -> Result<()> {
        self.command(Call::Play(handle), handle)
    }

    async fn pause(&self, handle: MediaHandle) -> Result<()> {
        self.command(Call::Pause(handle), handle)
    }

    async fn seek(&self, handle: MediaHandle, position_ms: u64) -> Result<()> {
        self.command(Call::Seek(handle, position_ms), handle)
    }

    async fn set_volume(&self, handle: MediaHandle, volume: f32) -> Result<()> {
        self.command(Call::Volume(handle, volume), handle)
    }

    async fn set_looping(&self, handle: MediaHandle, looping: bool) -> Result<()> {
        self.command(Call::Looping(handle, looping), handle)
    }
}

pub fn song(id: &str) -> Song {
    Song {
        id: id.to_string(),
        title: format!("Song {}", id.to_uppercase()),
        artist: "Artist".to_string(),
        album: "Album".to_string(),
        genre: "Pop".to_string(),
        duration_secs: 180,
        cover_url: String::new(),
        audio_url: audio_url(id),
        release_year: 2020,
    }
}

pub fn audio_url(id: &str) -> String {
    format!("https://cdn.example.com/{}.mp3", id)
}

pub fn songs(ids: &[&str]) -> Vec<Song> {
    ids.iter().map(|id| song(id)).collect()
}

pub fn loaded(position_ms: u64, playing: bool) -> EngineStatus {
    EngineStatus {
        loaded: true,
        position_ms,
        duration_ms: Some(180_000),
        playing,
        did_just_finish: false,
        looping: false,
    }
}

pub fn finished() -> EngineStatus {
    EngineStatus {
        loaded: true,
        position_ms: 180_000,
        duration_ms: Some(180_000),
        playing: false,
        did_just_finish: true,
        looping: false,
    }
}

pub fn session_with(engine: &RecordingEngine, bus: EventBus) -> PlaybackSession {
    PlaybackSession::new(Arc::new(engine.clone()), bus, PlaybackConfig::default())
        .expect("default config is valid")
}
