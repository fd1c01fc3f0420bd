//! Simulated media engine for desktop hosts and integration tests.
//!
//! No audio is produced. Each acquired handle gets a Tokio ticker that advances
//! a virtual play head while the handle is playing and reports status through
//! the handle's [`StatusSink`], including the completion report when the play
//! head reaches the end.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    playback::{
        AcquireOptions, AudioSessionMode, EngineStatus, MediaEngine, MediaHandle, MediaSource,
        StatusSink,
    },
};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const DEFAULT_TICK: Duration = Duration::from_millis(500);
const MIN_TICK: Duration = Duration::from_millis(1);
const DEFAULT_TRACK_LENGTH: Duration = Duration::from_secs(180);

struct SimulatedTrack {
    sink: StatusSink,
    position_ms: u64,
    duration_ms: u64,
    playing: bool,
    looping: bool,
    volume: f32,
    ticker: Option<JoinHandle<()>>,
}

impl SimulatedTrack {
    fn status(&self, did_just_finish: bool) -> EngineStatus {
        EngineStatus {
            loaded: true,
            position_ms: self.position_ms,
            duration_ms: Some(self.duration_ms),
            playing: self.playing,
            did_just_finish,
            looping: self.looping,
        }
    }

    /// Advance the play head by `elapsed_ms`, returning whether the track just ended.
    fn advance(&mut self, elapsed_ms: u64) -> bool {
        if !self.playing {
            return false;
        }

        self.position_ms = self.position_ms.saturating_add(elapsed_ms);
        if self.position_ms < self.duration_ms {
            return false;
        }

        if self.looping {
            self.position_ms = 0;
        } else {
            self.position_ms = self.duration_ms;
            self.playing = false;
        }
        true
    }
}

type TrackTable = Mutex<HashMap<MediaHandle, SimulatedTrack>>;

/// Timer-driven [`MediaEngine`] that never touches an audio device.
pub struct SimulatedMediaEngine {
    tracks: Arc<TrackTable>,
    tick: Duration,
    playback_rate: f32,
    default_length: Duration,
    unavailable: Mutex<HashSet<String>>,
    session_mode: Mutex<Option<AudioSessionMode>>,
}

impl Default for SimulatedMediaEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedMediaEngine {
    pub fn new() -> Self {
        Self {
            tracks: Arc::new(Mutex::new(HashMap::new())),
            tick: DEFAULT_TICK,
            playback_rate: 1.0,
            default_length: DEFAULT_TRACK_LENGTH,
            unavailable: Mutex::new(HashSet::new()),
            session_mode: Mutex::new(None),
        }
    }

    /// Interval between status reports, at least one millisecond.
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick.max(MIN_TICK);
        self
    }

    /// Virtual milliseconds played per real millisecond.
    pub fn with_playback_rate(mut self, rate: f32) -> Self {
        self.playback_rate = rate.max(0.0);
        self
    }

    /// Length used when the caller gives no duration hint.
    pub fn with_default_length(mut self, length: Duration) -> Self {
        self.default_length = length;
        self
    }

    /// Make acquisitions of `uri` fail, as an unreachable source would.
    pub fn mark_unavailable(&self, uri: impl Into<String>) {
        self.unavailable.lock().insert(uri.into());
    }

    /// Number of handles currently loaded.
    pub fn loaded_handles(&self) -> usize {
        self.tracks.lock().len()
    }

    /// Audio session mode applied by the last `configure_session` call.
    pub fn session_mode(&self) -> Option<AudioSessionMode> {
        *self.session_mode.lock()
    }

    /// Volume of a loaded handle.
    pub fn volume_of(&self, handle: MediaHandle) -> Option<f32> {
        self.tracks.lock().get(&handle).map(|track| track.volume)
    }

    fn with_track<T>(
        &self,
        handle: MediaHandle,
        f: impl FnOnce(&mut SimulatedTrack) -> T,
    ) -> Result<T> {
        let mut tracks = self.tracks.lock();
        let track = tracks
            .get_mut(&handle)
            .ok_or_else(|| BridgeError::HandleNotLoaded(handle.to_string()))?;
        Ok(f(track))
    }

    fn spawn_ticker(&self, handle: MediaHandle) -> JoinHandle<()> {
        let weak: Weak<TrackTable> = Arc::downgrade(&self.tracks);
        let tick = self.tick;
        let step_ms = (tick.as_millis() as f64 * f64::from(self.playback_rate)) as u64;

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            // First tick completes immediately
            interval.tick().await;

            loop {
                interval.tick().await;

                let Some(table) = weak.upgrade() else {
                    break;
                };
                if !Self::tick_track(&table, handle, step_ms) {
                    break;
                }
            }
        })
    }

    /// Advance one handle by a tick. Returns `false` when its ticker should stop.
    fn tick_track(table: &TrackTable, handle: MediaHandle, step_ms: u64) -> bool {
        let mut tracks = table.lock();
        let Some(track) = tracks.get_mut(&handle) else {
            return false;
        };

        if !track.playing {
            return true;
        }

        let finished = track.advance(step_ms);
        if !track.sink.emit(track.status(finished)) {
            debug!(handle = %handle, "Status receiver gone, stopping ticker");
            return false;
        }
        true
    }
}

#[async_trait]
impl MediaEngine for SimulatedMediaEngine {
    async fn configure_session(&self, mode: AudioSessionMode) -> Result<()> {
        info!(
            background = mode.play_in_background,
            silent_mode = mode.play_in_silent_mode,
            duck_others = mode.duck_others,
            "Configured simulated audio session"
        );
        *self.session_mode.lock() = Some(mode);
        Ok(())
    }

    async fn acquire(
        &self,
        source: &MediaSource,
        options: AcquireOptions,
        sink: StatusSink,
    ) -> Result<MediaHandle> {
        let uri = source.to_string();
        if self.unavailable.lock().contains(&uri) {
            warn!(source = %uri, "Simulated source unavailable");
            return Err(BridgeError::OperationFailed(format!(
                "Source unavailable: {}",
                uri
            )));
        }

        let handle = MediaHandle::new();
        let generation = sink.generation();
        let duration_ms = options
            .duration_hint_ms
            .filter(|ms| *ms > 0)
            .unwrap_or(self.default_length.as_millis() as u64);

        let mut track = SimulatedTrack {
            sink,
            position_ms: 0,
            duration_ms,
            playing: options.autoplay,
            looping: options.looping,
            volume: options.initial_volume.clamp(0.0, 1.0),
            ticker: None,
        };
        track.sink.emit(track.status(false));

        track.ticker = Some(self.spawn_ticker(handle));
        self.tracks.lock().insert(handle, track);

        debug!(
            handle = %handle,
            source = %uri,
            generation,
            duration_ms,
            "Acquired simulated handle"
        );
        Ok(handle)
    }

    async fn release(&self, handle: MediaHandle) -> Result<()> {
        let track = self
            .tracks
            .lock()
            .remove(&handle)
            .ok_or_else(|| BridgeError::HandleNotLoaded(handle.to_string()))?;

        if let Some(ticker) = track.ticker {
            ticker.abort();
        }
        debug!(handle = %handle, "Released simulated handle");
        Ok(())
    }

    async fn play(&self, handle: MediaHandle) -> Result<()> {
        self.with_track(handle, |track| {
            if track.position_ms >= track.duration_ms {
                track.position_ms = 0;
            }
            track.playing = true;
            track.sink.emit(track.status(false));
        })
    }

    async fn pause(&self, handle: MediaHandle) -> Result<()> {
        self.with_track(handle, |track| {
            track.playing = false;
            track.sink.emit(track.status(false));
        })
    }

    async fn seek(&self, handle: MediaHandle, position_ms: u64) -> Result<()> {
        self.with_track(handle, |track| {
            track.position_ms = position_ms.min(track.duration_ms);
            track.sink.emit(track.status(false));
        })
    }

    async fn set_volume(&self, handle: MediaHandle, volume: f32) -> Result<()> {
        self.with_track(handle, |track| {
            track.volume = volume.clamp(0.0, 1.0);
        })
    }

    async fn set_looping(&self, handle: MediaHandle, looping: bool) -> Result<()> {
        self.with_track(handle, |track| {
            track.looping = looping;
        })
    }
}
