//! # Playback Session
//!
//! The session owns the single live media handle, the play queue, shuffle and
//! repeat flags, the playback history and the user's own song list. It issues
//! commands to the [`MediaEngine`] and reacts to the status updates the engine
//! sends back.
//!
//! ## Status flow
//!
//! Every acquisition gets a new generation number. The [`StatusSink`] handed
//! to the engine stamps that generation on each update, and the session only
//! applies updates whose generation matches the live handle. Updates from a
//! released or superseded handle are dropped.
//!
//! Updates are delivered by the pump task spawned in [`PlaybackSession::start`],
//! or on demand with [`PlaybackSession::pump_pending`].
//!
//! ## Failures
//!
//! Commands never return errors. Engine failures are logged, reported as
//! [`PlaybackEvent::Error`] and leave the session in a consistent, non-playing
//! state where relevant. Observe [`PlaybackSession::snapshot`] or
//! [`PlaybackSession::subscribe`] to learn the outcome.
//!
//! ## Usage
//!
//! ```no_run
//! use core_playback::{PlaybackConfig, PlaybackSession};
//! use core_runtime::events::EventBus;
//! use std::sync::Arc;
//! # use bridge_traits::MediaEngine;
//! # use core_catalog::Song;
//! # async fn example(engine: Arc<dyn MediaEngine>, album: Vec<Song>) -> core_playback::Result<()> {
//! let session = Arc::new(PlaybackSession::new(engine, EventBus::default(), PlaybackConfig::default())?);
//! session.initialize().await;
//! session.start();
//!
//! session.play_song(album[0].clone(), Some(album.clone())).await;
//! session.next().await;
//! assert!(session.snapshot().current_song.is_some());
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use bridge_traits::{
    AcquireOptions, AudioSessionMode, MediaEngine, MediaHandle, MediaSource, StatusSink,
    StatusUpdate,
};
use core_auth::{HookResult, SignOutHook};
use core_catalog::Song;
use core_runtime::events::{CoreEvent, EventBus, LibraryEvent, PlaybackEvent};
use core_runtime::logging::strip_path;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, trace, warn};

use crate::config::PlaybackConfig;
use crate::error::{PlaybackError, Result};
use crate::history::History;
use crate::queue::PlayQueue;
use crate::traversal::{default_traversal, QueueTraversal, Step, TraversalContext};
use crate::types::{PlaybackPhase, PlaybackSnapshot, RepeatMode};

/// The live handle and the generation it was acquired under.
#[derive(Debug, Clone, Copy)]
struct ActiveMedia {
    handle: MediaHandle,
    generation: u64,
}

struct SessionState {
    phase: PlaybackPhase,
    current_song: Option<Song>,
    media: Option<ActiveMedia>,
    playing: bool,
    position_secs: u64,
    duration_secs: u64,
    volume: f32,
    queue: PlayQueue,
    shuffle: bool,
    repeat: RepeatMode,
    history: History,
    user_songs: Vec<Song>,
}

impl SessionState {
    fn new(config: &PlaybackConfig) -> Self {
        Self {
            phase: PlaybackPhase::Idle,
            current_song: None,
            media: None,
            playing: false,
            position_secs: 0,
            duration_secs: 0,
            volume: config.initial_volume,
            queue: PlayQueue::new(),
            shuffle: false,
            repeat: RepeatMode::Off,
            history: History::new(config.history_limit),
            user_songs: Vec::new(),
        }
    }

    fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            phase: self.phase,
            current_song: self.current_song.clone(),
            playing: self.playing,
            position_secs: self.position_secs,
            duration_secs: self.duration_secs,
            volume: self.volume,
            queue: self.queue.songs().to_vec(),
            current_index: self.queue.current_index(),
            shuffle: self.shuffle,
            repeat: self.repeat,
        }
    }

    fn current_id(&self) -> Option<String> {
        self.current_song.as_ref().map(|song| song.id.clone())
    }

    fn traversal_context(&self) -> TraversalContext {
        TraversalContext {
            len: self.queue.len(),
            cursor: self.queue.cursor(),
            repeat: self.repeat,
            shuffle: self.shuffle,
        }
    }

    /// Forget the live handle and stop. Returns the handle to release.
    fn detach_media(&mut self) -> Option<MediaHandle> {
        self.playing = false;
        self.phase = PlaybackPhase::Idle;
        self.media.take().map(|media| media.handle)
    }
}

pub struct PlaybackSession {
    engine: Arc<dyn MediaEngine>,
    event_bus: EventBus,
    config: PlaybackConfig,
    traversal: Arc<dyn QueueTraversal>,
    state: RwLock<SessionState>,
    /// Serializes commands and status handling.
    op_lock: tokio::sync::Mutex<()>,
    generation: AtomicU64,
    status_tx: mpsc::UnboundedSender<StatusUpdate>,
    /// Taken by the pump task once started.
    status_rx: Mutex<Option<mpsc::UnboundedReceiver<StatusUpdate>>>,
    snapshot_tx: watch::Sender<PlaybackSnapshot>,
}

impl PlaybackSession {
    /// Create a session with the default traversal policy.
    ///
    /// # Errors
    ///
    /// `PlaybackError::Config` when `config` fails validation.
    pub fn new(
        engine: Arc<dyn MediaEngine>,
        event_bus: EventBus,
        config: PlaybackConfig,
    ) -> Result<Self> {
        Self::with_traversal(engine, event_bus, config, default_traversal())
    }

    pub fn with_traversal(
        engine: Arc<dyn MediaEngine>,
        event_bus: EventBus,
        config: PlaybackConfig,
        traversal: Arc<dyn QueueTraversal>,
    ) -> Result<Self> {
        config.check()?;

        let state = SessionState::new(&config);
        let (snapshot_tx, _) = watch::channel(state.snapshot());
        let (status_tx, status_rx) = mpsc::unbounded_channel();

        Ok(Self {
            engine,
            event_bus,
            config,
            traversal,
            state: RwLock::new(state),
            op_lock: tokio::sync::Mutex::new(()),
            generation: AtomicU64::new(0),
            status_tx,
            status_rx: Mutex::new(Some(status_rx)),
            snapshot_tx,
        })
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Apply the platform audio session settings. Failures are logged only.
    #[instrument(skip(self))]
    pub async fn initialize(&self) {
        match self
            .engine
            .configure_session(AudioSessionMode::default())
            .await
        {
            Ok(()) => debug!("Audio session configured"),
            Err(e) => warn!(error = %e, "Failed to configure audio session, continuing"),
        }
    }

    /// Spawn the task that applies engine status updates as they arrive.
    ///
    /// Returns `None` when already started or when called outside a Tokio
    /// runtime. The task stops once the session is dropped.
    pub fn start(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                warn!("No Tokio runtime, status updates must be pumped manually");
                return None;
            }
        };

        let Some(mut rx) = self.status_rx.lock().take() else {
            debug!("Status pump already running");
            return None;
        };

        let session = Arc::downgrade(self);
        Some(runtime.spawn(async move {
            while let Some(update) = rx.recv().await {
                let Some(session) = session.upgrade() else {
                    break;
                };
                session.on_engine_status(update).await;
            }
            debug!("Status pump stopped");
        }))
    }

    /// Apply every buffered status update now. Returns how many were read.
    ///
    /// Does nothing once the pump task owns the channel.
    pub async fn pump_pending(&self) -> usize {
        let pending = {
            let mut guard = self.status_rx.lock();
            let mut pending = Vec::new();
            if let Some(rx) = guard.as_mut() {
                while let Ok(update) = rx.try_recv() {
                    pending.push(update);
                }
            }
            pending
        };

        let count = pending.len();
        for update in pending {
            self.on_engine_status(update).await;
        }
        count
    }

    /// Release the live handle. The rest of the state is kept.
    #[instrument(skip(self))]
    pub async fn shutdown(&self) {
        let _guard = self.op_lock.lock().await;
        let (handle, track_id) = {
            let mut state = self.state.write();
            (state.detach_media(), state.current_id())
        };
        if let Some(handle) = handle {
            self.release_quietly(handle).await;
            self.emit(PlaybackEvent::Stopped { track_id });
        }
        self.publish();
        info!("Playback session shut down");
    }

    // ========================================================================
    // Observation
    // ========================================================================

    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.state.read().snapshot()
    }

    /// Receiver that always holds the latest snapshot.
    pub fn subscribe(&self) -> watch::Receiver<PlaybackSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Played songs, most recent first.
    pub fn history(&self) -> Vec<Song> {
        self.state.read().history.to_vec()
    }

    pub fn user_songs(&self) -> Vec<Song> {
        self.state.read().user_songs.clone()
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    // ========================================================================
    // Transport
    // ========================================================================

    /// Play `song` from `queue` (a queue of just `song` when `None`).
    ///
    /// If `queue` does not contain `song`, the song is played on its own.
    /// Load failures leave the session stopped and are reported as events.
    #[instrument(skip(self, song, queue), fields(track_id = %song.id))]
    pub async fn play_song(&self, song: Song, queue: Option<Vec<Song>>) {
        let _guard = self.op_lock.lock().await;
        self.load(PlayQueue::resolve(&song, queue)).await;
    }

    #[instrument(skip(self))]
    pub async fn pause(&self) {
        let _guard = self.op_lock.lock().await;
        let Some((handle, track_id)) = self.live_media() else {
            trace!("Pause without media");
            return;
        };

        match self.engine.pause(handle).await {
            Ok(()) => {
                let position_secs = {
                    let mut state = self.state.write();
                    state.playing = false;
                    state.phase = PlaybackPhase::Paused;
                    state.position_secs
                };
                self.publish();
                self.emit(PlaybackEvent::Paused {
                    track_id: track_id.unwrap_or_default(),
                    position_secs,
                });
            }
            Err(e) => self.report(track_id, PlaybackError::from_engine("pause", e)),
        }
    }

    #[instrument(skip(self))]
    pub async fn resume(&self) {
        let _guard = self.op_lock.lock().await;
        let Some((handle, track_id)) = self.live_media() else {
            trace!("Resume without media");
            return;
        };

        match self.engine.play(handle).await {
            Ok(()) => {
                let position_secs = {
                    let mut state = self.state.write();
                    state.playing = true;
                    state.phase = PlaybackPhase::Playing;
                    state.position_secs
                };
                self.publish();
                self.emit(PlaybackEvent::Resumed {
                    track_id: track_id.unwrap_or_default(),
                    position_secs,
                });
            }
            Err(e) => self.report(track_id, PlaybackError::from_engine("play", e)),
        }
    }

    pub async fn toggle_play_pause(&self) {
        let playing = self.state.read().playing;
        if playing {
            self.pause().await;
        } else {
            self.resume().await;
        }
    }

    /// Move forward in the queue.
    ///
    /// Past the last entry this wraps with [`RepeatMode::All`] and otherwise
    /// stops playback without moving the cursor.
    #[instrument(skip(self))]
    pub async fn next(&self) {
        let _guard = self.op_lock.lock().await;
        self.advance().await;
    }

    /// Move back in the queue, wrapping from the first entry to the last.
    #[instrument(skip(self))]
    pub async fn previous(&self) {
        let _guard = self.op_lock.lock().await;
        let (ctx, queue) = {
            let state = self.state.read();
            (state.traversal_context(), state.queue.clone())
        };
        if ctx.len == 0 {
            trace!("Previous on empty queue");
            return;
        }

        if let Some(index) = self.traversal.previous(&ctx) {
            self.load_at(queue, index).await;
        }
    }

    /// Seek to `position`, clamped to the song's duration when known.
    #[instrument(skip(self), fields(position_secs = position.as_secs()))]
    pub async fn seek_to(&self, position: Duration) {
        let _guard = self.op_lock.lock().await;
        let Some((handle, track_id)) = self.live_media() else {
            trace!("Seek without media");
            return;
        };

        let duration_secs = self.state.read().duration_secs;
        let target = if duration_secs > 0 {
            position.min(Duration::from_secs(duration_secs))
        } else {
            position
        };
        let position_ms = u64::try_from(target.as_millis()).unwrap_or(u64::MAX);

        match self.engine.seek(handle, position_ms).await {
            Ok(()) => {
                let position_secs = target.as_secs();
                self.state.write().position_secs = position_secs;
                self.publish();
                self.emit(PlaybackEvent::PositionChanged {
                    track_id: track_id.unwrap_or_default(),
                    position_secs,
                    duration_secs,
                });
            }
            Err(e) => self.report(track_id, PlaybackError::from_engine("seek", e)),
        }
    }

    /// Set the session volume, clamped to `[0.0, 1.0]`.
    ///
    /// Without a live handle only the session value changes; the next
    /// acquisition starts at it.
    #[instrument(skip(self))]
    pub async fn set_volume(&self, volume: f32) {
        if volume.is_nan() {
            warn!(error = %PlaybackError::InvalidVolume(volume), "Ignoring volume");
            return;
        }
        let volume = volume.clamp(0.0, 1.0);

        let _guard = self.op_lock.lock().await;
        if let Some((handle, track_id)) = self.live_media() {
            if let Err(e) = self.engine.set_volume(handle, volume).await {
                self.report(track_id, PlaybackError::from_engine("set_volume", e));
                return;
            }
        }

        self.state.write().volume = volume;
        self.publish();
        self.emit(PlaybackEvent::VolumeChanged {
            volume_percent: (volume * 100.0).round() as u8,
        });
    }

    // ========================================================================
    // Modes
    // ========================================================================

    /// Flip the shuffle flag. The queue order is left alone.
    pub async fn toggle_shuffle(&self) {
        let _guard = self.op_lock.lock().await;
        self.state.write().shuffle ^= true;
        self.publish();
        self.emit_mode();
    }

    /// Cycle `off -> all -> one -> off` and update looping on the live handle.
    #[instrument(skip(self))]
    pub async fn toggle_repeat(&self) {
        let _guard = self.op_lock.lock().await;
        let repeat = {
            let mut state = self.state.write();
            state.repeat = state.repeat.cycle();
            state.repeat
        };

        if let Some((handle, track_id)) = self.live_media() {
            if let Err(e) = self.engine.set_looping(handle, repeat.loops_track()).await {
                self.report(track_id, PlaybackError::from_engine("set_looping", e));
            }
        }

        self.publish();
        self.emit_mode();
    }

    // ========================================================================
    // Queue
    // ========================================================================

    /// Append to the queue. Playback is not affected.
    pub async fn add_to_queue(&self, song: Song) {
        let _guard = self.op_lock.lock().await;
        self.state.write().queue.push(song);
        self.queue_changed();
    }

    /// Remove the entry at `index`. Playback is not affected.
    ///
    /// Removing the playing entry keeps it playing; `next()` then moves to the
    /// entry that followed it.
    pub async fn remove_from_queue(&self, index: usize) -> Option<Song> {
        let _guard = self.op_lock.lock().await;
        let removed = self.state.write().queue.remove(index);
        match &removed {
            Some(song) => {
                debug!(index, track_id = %song.id, "Removed from queue");
                self.queue_changed();
            }
            None => debug!(index, "Queue index out of range"),
        }
        removed
    }

    /// Stop playback and empty the queue.
    #[instrument(skip(self))]
    pub async fn clear_queue(&self) {
        let _guard = self.op_lock.lock().await;
        let (handle, track_id) = {
            let mut state = self.state.write();
            let track_id = state.current_id();
            let handle = state.detach_media();
            state.queue.clear();
            state.current_song = None;
            state.position_secs = 0;
            state.duration_secs = 0;
            (handle, track_id)
        };

        if let Some(handle) = handle {
            self.release_quietly(handle).await;
        }
        if track_id.is_some() {
            self.emit(PlaybackEvent::Stopped { track_id });
        }
        self.queue_changed();
    }

    // ========================================================================
    // User songs
    // ========================================================================

    pub async fn add_user_song(&self, song: Song) {
        let event = LibraryEvent::UserSongAdded {
            song_id: song.id.clone(),
            title: song.title.clone(),
        };
        self.state.write().user_songs.push(song);
        let _ = self.event_bus.emit(CoreEvent::Library(event));
    }

    /// Returns `true` when a song with `song_id` was removed.
    pub async fn remove_user_song(&self, song_id: &str) -> bool {
        let removed = {
            let mut state = self.state.write();
            let before = state.user_songs.len();
            state.user_songs.retain(|song| song.id != song_id);
            state.user_songs.len() != before
        };
        if removed {
            let _ = self.event_bus.emit(CoreEvent::Library(LibraryEvent::UserSongRemoved {
                song_id: song_id.to_string(),
            }));
        }
        removed
    }

    // ========================================================================
    // Engine status
    // ========================================================================

    /// Apply one status update from the engine.
    ///
    /// Updates for anything but the live handle are ignored. Completion of a
    /// non-looping song advances the queue unless repeat is
    /// [`RepeatMode::One`].
    pub async fn on_engine_status(&self, update: StatusUpdate) {
        let _guard = self.op_lock.lock().await;
        let status = update.status;

        let applied = {
            let mut state = self.state.write();
            match state.media {
                Some(media) if media.generation == update.generation => {}
                _ => {
                    trace!(generation = update.generation, "Discarding stale status");
                    return;
                }
            }
            if !status.loaded {
                return;
            }

            if let Some(duration_ms) = status.duration_ms {
                state.duration_secs = duration_ms / 1000;
            }
            let position_secs = status.position_ms / 1000;
            state.position_secs = if state.duration_secs > 0 {
                position_secs.min(state.duration_secs)
            } else {
                position_secs
            };
            state.playing = status.playing;
            if status.playing {
                state.phase = PlaybackPhase::Playing;
            } else if state.phase == PlaybackPhase::Playing {
                state.phase = PlaybackPhase::Paused;
            }

            let finished =
                status.did_just_finish && !status.looping && state.repeat != RepeatMode::One;
            if finished {
                state.phase = PlaybackPhase::Ended;
                state.playing = false;
            }

            (
                state.current_id().unwrap_or_default(),
                state.position_secs,
                state.duration_secs,
                finished,
            )
        };

        let (track_id, position_secs, duration_secs, finished) = applied;
        self.publish();
        self.emit(PlaybackEvent::PositionChanged {
            track_id: track_id.clone(),
            position_secs,
            duration_secs,
        });

        if finished {
            debug!(track_id = %track_id, "Track completed");
            self.emit(PlaybackEvent::Completed { track_id });
            self.advance().await;
        }
    }

    // ========================================================================
    // Reset
    // ========================================================================

    /// Release the handle and restore every field to its initial value,
    /// including history, user songs, volume and modes.
    #[instrument(skip(self))]
    pub async fn clear_all_data(&self) {
        let _guard = self.op_lock.lock().await;
        let (handle, track_id) = {
            let mut state = self.state.write();
            let track_id = state.current_id();
            let handle = state.detach_media();
            *state = SessionState::new(&self.config);
            (handle, track_id)
        };

        if let Some(handle) = handle {
            self.release_quietly(handle).await;
        }
        if track_id.is_some() {
            self.emit(PlaybackEvent::Stopped { track_id });
        }
        self.publish();
        info!("Playback data cleared");
    }

    // ========================================================================
    // Internals (op_lock held)
    // ========================================================================

    async fn advance(&self) {
        let (ctx, queue) = {
            let state = self.state.read();
            (state.traversal_context(), state.queue.clone())
        };
        if ctx.len == 0 {
            trace!("Next on empty queue");
            return;
        }

        match self.traversal.next(&ctx) {
            Step::Play(index) => self.load_at(queue, index).await,
            Step::EndOfQueue => self.stop_at_end().await,
        }
    }

    async fn load_at(&self, mut queue: PlayQueue, index: usize) {
        if queue.select(index) {
            self.load(queue).await;
        } else {
            warn!(index, len = queue.len(), "Traversal chose an index outside the queue");
        }
    }

    /// Stop at the end of the queue. The cursor stays on the last song.
    async fn stop_at_end(&self) {
        let (handle, track_id) = {
            let mut state = self.state.write();
            (state.detach_media(), state.current_id())
        };
        if let Some(handle) = handle {
            self.release_quietly(handle).await;
        }
        debug!("Reached end of queue");
        self.publish();
        self.emit(PlaybackEvent::Stopped { track_id });
    }

    /// Replace the live handle with one for the queue's current song.
    ///
    /// The queue is adopted even when loading fails, so `next()` can move
    /// past a broken entry.
    async fn load(&self, queue: PlayQueue) {
        let Some(song) = queue.current().cloned() else {
            warn!("Queue has no current song");
            return;
        };

        let (previous, volume, looping) = {
            let mut state = self.state.write();
            let previous = state.detach_media();
            state.phase = PlaybackPhase::Loading;
            (previous, state.volume, state.repeat.loops_track())
        };
        self.publish();

        if let Some(handle) = previous {
            self.release_quietly(handle).await;
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let options = AcquireOptions {
            initial_volume: volume,
            looping,
            autoplay: true,
            duration_hint_ms: (song.duration_secs > 0).then(|| u64::from(song.duration_secs) * 1000),
        };

        let acquired = match self.source_for(&song) {
            Ok(source) => {
                let label = source.to_string();
                debug!(
                    track_id = %song.id,
                    source = strip_path(&label),
                    generation,
                    "Acquiring media"
                );
                let sink = StatusSink::new(generation, self.status_tx.clone());
                self.engine
                    .acquire(&source, options, sink)
                    .await
                    .map_err(|e| PlaybackError::AcquireFailed {
                        track_id: song.id.clone(),
                        message: e.to_string(),
                    })
            }
            Err(e) => Err(e),
        };

        match acquired {
            Ok(handle) => {
                {
                    let mut state = self.state.write();
                    state.media = Some(ActiveMedia { handle, generation });
                    state.current_song = Some(song.clone());
                    state.queue = queue;
                    state.playing = true;
                    state.phase = PlaybackPhase::Playing;
                    state.position_secs = 0;
                    state.duration_secs = u64::from(song.duration_secs);
                    state.history.push(song.clone());
                }
                info!(track_id = %song.id, title = %song.title, "Playback started");
                self.emit(PlaybackEvent::Started {
                    track_id: song.id,
                    title: song.title,
                });
            }
            Err(err) => {
                {
                    let mut state = self.state.write();
                    state.current_song = None;
                    state.queue = queue;
                    state.playing = false;
                    state.phase = PlaybackPhase::Idle;
                    state.position_secs = 0;
                    state.duration_secs = 0;
                }
                self.report(Some(song.id), err);
            }
        }
        self.queue_changed();
    }

    fn source_for(&self, song: &Song) -> Result<MediaSource> {
        let reference = if song.has_audio() {
            song.audio_url.as_str()
        } else {
            match self.config.fallback_audio_url.as_deref() {
                Some(url) => {
                    debug!(track_id = %song.id, "No audio reference, using fallback");
                    url
                }
                None => {
                    return Err(PlaybackError::InvalidSource {
                        track_id: song.id.clone(),
                        message: "no audio reference and no fallback".to_string(),
                    })
                }
            }
        };

        MediaSource::from_uri(reference).map_err(|e| PlaybackError::InvalidSource {
            track_id: song.id.clone(),
            message: e.to_string(),
        })
    }

    fn live_media(&self) -> Option<(MediaHandle, Option<String>)> {
        let state = self.state.read();
        state
            .media
            .map(|media| (media.handle, state.current_id()))
    }

    async fn release_quietly(&self, handle: MediaHandle) {
        if let Err(e) = self.engine.release(handle).await {
            warn!(%handle, error = %e, "Failed to release media handle");
        }
    }

    // ========================================================================
    // Notifications
    // ========================================================================

    fn publish(&self) {
        let snapshot = self.snapshot();
        self.snapshot_tx.send_replace(snapshot);
    }

    fn queue_changed(&self) {
        let (length, current_index) = {
            let state = self.state.read();
            (state.queue.len(), state.queue.current_index())
        };
        self.publish();
        self.emit(PlaybackEvent::QueueChanged {
            length,
            current_index,
        });
    }

    fn emit_mode(&self) {
        let (shuffle, repeat) = {
            let state = self.state.read();
            (state.shuffle, state.repeat)
        };
        self.emit(PlaybackEvent::ModeChanged {
            shuffle,
            repeat: repeat.as_str().to_string(),
        });
    }

    fn emit(&self, event: PlaybackEvent) {
        let _ = self.event_bus.emit(CoreEvent::Playback(event));
    }

    fn report(&self, track_id: Option<String>, err: PlaybackError) {
        warn!(track_id = ?track_id, error = %err, "Playback command failed");
        self.emit(PlaybackEvent::Error {
            track_id,
            message: err.to_string(),
            recoverable: err.is_transient(),
        });
    }
}

#[async_trait]
impl SignOutHook for PlaybackSession {
    async fn on_sign_out(&self) -> HookResult {
        self.clear_all_data().await;
        Ok(())
    }
}
