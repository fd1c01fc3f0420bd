//! Core service façade and bootstrap helpers.
//!
//! This crate wires the host-provided bridges from a [`CoreConfig`] into the
//! authentication session, the playback session and the catalog, and hands
//! the host one [`CoreService`] to drive them. Desktop apps typically enable
//! the `desktop-shims` feature, which lets the configuration fall back to the
//! SQLite settings store and the simulated media engine from `bridge-desktop`.
//!
//! Logging stays the host's call; see [`core_runtime::logging::init_logging`].

pub mod error;

pub use error::{CoreError, Result};

use std::sync::Arc;

use bridge_traits::{Clock, SystemClock};
use core_auth::{AuthConfig, AuthSession};
use core_catalog::{CatalogSource, InMemoryCatalog, Song, SongDraft};
use core_playback::{PlaybackConfig, PlaybackSession};
use core_runtime::config::CoreConfig;
use core_runtime::events::EventBus;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, instrument};

struct ServiceInner {
    event_bus: EventBus,
    auth: Arc<AuthSession>,
    playback: Arc<PlaybackSession>,
    catalog: Arc<dyn CatalogSource>,
    clock: Arc<dyn Clock>,
    status_pump: Mutex<Option<JoinHandle<()>>>,
}

/// Primary façade exposed to host applications.
///
/// Cloning is cheap; clones share the same sessions.
#[derive(Clone)]
pub struct CoreService {
    inner: Arc<ServiceInner>,
}

impl CoreService {
    /// Build every session on top of `config`, using the sample catalog.
    ///
    /// ```no_run
    /// # async fn example() -> core_service::Result<()> {
    /// use core_runtime::config::CoreConfig;
    /// use core_service::CoreService;
    ///
    /// let config = CoreConfig::builder().data_dir("/tmp/musicstream").build()?;
    /// let core = CoreService::bootstrap(config).await?;
    ///
    /// let hits = core.search("queen").await?;
    /// core.playback().play_song(hits[0].clone(), Some(hits)).await;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn bootstrap(config: CoreConfig) -> Result<Self> {
        Self::bootstrap_with_catalog(config, Arc::new(InMemoryCatalog::sample())).await
    }

    /// Like [`bootstrap`](Self::bootstrap) with a host-provided catalog.
    ///
    /// Order matters: the playback session is registered as the sign-out hook
    /// and its status pump is running before the persisted login is restored.
    #[instrument(skip_all)]
    pub async fn bootstrap_with_catalog(
        config: CoreConfig,
        catalog: Arc<dyn CatalogSource>,
    ) -> Result<Self> {
        config.validate()?;

        let event_bus = EventBus::new(config.event_buffer_size);
        let auth = Arc::new(AuthSession::new(
            config.settings_store.clone(),
            event_bus.clone(),
            AuthConfig::from(&config),
        ));
        let playback = Arc::new(PlaybackSession::new(
            config.media_engine.clone(),
            event_bus.clone(),
            PlaybackConfig::from(&config),
        )?);

        auth.register_sign_out_hook(playback.clone()).await;
        playback.initialize().await;
        let status_pump = playback.start();
        if status_pump.is_none() {
            return Err(CoreError::InitializationFailed(
                "status pump could not be started".to_string(),
            ));
        }
        auth.initialize().await;

        info!(
            signed_in = auth.is_authenticated().await,
            "Core service ready"
        );

        Ok(Self {
            inner: Arc::new(ServiceInner {
                event_bus,
                auth,
                playback,
                catalog,
                clock: Arc::new(SystemClock),
                status_pump: Mutex::new(status_pump),
            }),
        })
    }

    pub fn auth(&self) -> Arc<AuthSession> {
        Arc::clone(&self.inner.auth)
    }

    pub fn playback(&self) -> Arc<PlaybackSession> {
        Arc::clone(&self.inner.playback)
    }

    pub fn catalog(&self) -> Arc<dyn CatalogSource> {
        Arc::clone(&self.inner.catalog)
    }

    pub fn events(&self) -> &EventBus {
        &self.inner.event_bus
    }

    /// Validate a user-entered song and add it to the user's list.
    ///
    /// # Errors
    ///
    /// `CoreError::Catalog` with the first invalid field.
    pub async fn add_user_song(&self, draft: SongDraft) -> Result<Song> {
        let song = draft.into_song(self.inner.clock.as_ref())?;
        self.inner.playback.add_user_song(song.clone()).await;
        Ok(song)
    }

    /// Search the catalog and the user's own songs.
    ///
    /// Catalog hits come first. A user song sharing an id with a catalog hit
    /// is not repeated.
    pub async fn search(&self, query: &str) -> Result<Vec<Song>> {
        let mut results = self.inner.catalog.search(query).await?;

        let needle = Song::normalize(query);
        if !needle.is_empty() {
            for song in self.inner.playback.user_songs() {
                if song.matches(&needle) && results.iter().all(|hit| hit.id != song.id) {
                    results.push(song);
                }
            }
        }
        Ok(results)
    }

    /// Release the media handle and stop the status pump.
    pub async fn shutdown(&self) {
        self.inner.playback.shutdown().await;
        if let Some(pump) = self.inner.status_pump.lock().take() {
            pump.abort();
        }
        info!("Core service shut down");
    }
}
