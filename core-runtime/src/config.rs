//! # Core Configuration Module
//!
//! `CoreConfig` carries the host-provided bridges and the tunables the
//! session managers read at startup.
//!
//! ## Required Dependencies
//!
//! - `SettingsStore` - persisted session (user profile, authenticated flag)
//! - `MediaEngine` - native audio playback
//!
//! With the `desktop-shims` feature both have defaults: a SQLite settings
//! database under `data_dir` and the simulated media engine. Without it a
//! missing bridge is a [`Error::CapabilityMissing`] naming what to inject.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::time::Duration;
//!
//! let config = CoreConfig::builder()
//!     .settings_store(Arc::new(MySettingsStore))
//!     .media_engine(Arc::new(MyMediaEngine))
//!     .history_limit(100)
//!     .session_restore_timeout(Duration::from_millis(250))
//!     .build()?;
//! ```
//!
//! Invalid tunables fail the build:
//!
//! ```should_panic
//! use core_runtime::config::CoreConfig;
//!
//! CoreConfig::builder()
//!     .history_limit(0)
//!     .build()
//!     .expect("history limit must be positive");
//! ```

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use bridge_traits::{LoggerSink, MediaEngine, SettingsStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Played when a song has no audio URL of its own.
pub const DEFAULT_FALLBACK_AUDIO_URL: &str =
    "https://www.soundjay.com/misc/sounds/bell-ringing-05.wav";

pub const DEFAULT_HISTORY_LIMIT: usize = 50;
pub const MAX_HISTORY_LIMIT: usize = 1000;
pub const DEFAULT_SESSION_RESTORE_TIMEOUT: Duration = Duration::from_millis(500);
pub const DEFAULT_SIGN_IN_DELAY: Duration = Duration::from_secs(1);

/// Main configuration for the streaming core.
#[derive(Clone)]
pub struct CoreConfig {
    pub settings_store: Arc<dyn SettingsStore>,
    pub media_engine: Arc<dyn MediaEngine>,
    pub logger_sink: Option<Arc<dyn LoggerSink>>,
    /// Directory for on-disk state; only the desktop settings default uses it.
    pub data_dir: Option<PathBuf>,
    pub event_buffer_size: usize,
    /// Upper bound on reading the persisted session at startup.
    pub session_restore_timeout: Duration,
    /// Simulated credential check latency for sign-in and sign-up.
    pub sign_in_delay: Duration,
    pub history_limit: usize,
    pub fallback_audio_url: Option<String>,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("settings_store", &"<SettingsStore>")
            .field("media_engine", &"<MediaEngine>")
            .field("logger_sink", &self.logger_sink.as_ref().map(|_| "<LoggerSink>"))
            .field("data_dir", &self.data_dir)
            .field("event_buffer_size", &self.event_buffer_size)
            .field("session_restore_timeout", &self.session_restore_timeout)
            .field("sign_in_delay", &self.sign_in_delay)
            .field("history_limit", &self.history_limit)
            .field("fallback_audio_url", &self.fallback_audio_url)
            .finish()
    }
}

impl CoreConfig {
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Checks the tunables. Bridges are already guaranteed by construction.
    pub fn validate(&self) -> Result<()> {
        Tunables {
            event_buffer_size: self.event_buffer_size,
            session_restore_timeout: self.session_restore_timeout,
            history_limit: self.history_limit,
            fallback_audio_url: self.fallback_audio_url.as_deref(),
        }
        .check()
    }
}

struct Tunables<'a> {
    event_buffer_size: usize,
    session_restore_timeout: Duration,
    history_limit: usize,
    fallback_audio_url: Option<&'a str>,
}

impl Tunables<'_> {
    fn check(&self) -> Result<()> {
        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        if self.session_restore_timeout.is_zero() {
            return Err(Error::Config(
                "Session restore timeout must be greater than 0".to_string(),
            ));
        }

        if self.history_limit == 0 || self.history_limit > MAX_HISTORY_LIMIT {
            return Err(Error::Config(format!(
                "History limit must be between 1 and {} (got {})",
                MAX_HISTORY_LIMIT, self.history_limit
            )));
        }

        if let Some(url) = self.fallback_audio_url {
            let lower = url.to_ascii_lowercase();
            let supported = ["http://", "https://", "file://"]
                .iter()
                .any(|scheme| lower.starts_with(scheme) && lower.len() > scheme.len());
            if !supported {
                return Err(Error::Config(format!(
                    "Fallback audio URL must use http(s):// or file:// (got {:?})",
                    url
                )));
            }
        }

        Ok(())
    }
}

// ============================================================================
// Bridge defaults
// ============================================================================

#[cfg(not(feature = "desktop-shims"))]
fn settings_store_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "SettingsStore".to_string(),
        message: "SettingsStore implementation is required to persist the signed-in session. \
                 Desktop: enable the 'desktop-shims' feature to use SqliteSettingsStore. \
                 Mobile: inject platform storage (AsyncStorage/UserDefaults/DataStore)."
            .to_string(),
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn media_engine_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "MediaEngine".to_string(),
        message: "MediaEngine implementation is required for playback. \
                 Desktop: enable the 'desktop-shims' feature to use SimulatedMediaEngine. \
                 Mobile: inject the native audio player bridge."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_settings_store(data_dir: Option<&Path>) -> Result<Arc<dyn SettingsStore>> {
    use bridge_desktop::SqliteSettingsStore;
    use std::thread;
    use tokio::runtime::{Handle, Runtime};

    let data_dir = data_dir.ok_or_else(|| {
        Error::Config(
            "Data directory is required for the default settings store. \
             Use .data_dir() or inject a SettingsStore with .settings_store()."
                .to_string(),
        )
    })?;
    let path = data_dir.join("settings.db");

    // `block_on` cannot nest inside the caller's runtime, so open the pool on
    // a scratch runtime, on its own thread when one is already running.
    let init_store = move |path: PathBuf| -> Result<SqliteSettingsStore> {
        let runtime = Runtime::new().map_err(|e| {
            Error::Internal(format!(
                "Failed to create Tokio runtime for default settings store: {}",
                e
            ))
        })?;

        runtime
            .block_on(SqliteSettingsStore::new(path))
            .map_err(|e| Error::Internal(format!("Failed to initialize default SettingsStore: {}", e)))
    };

    let store = match Handle::try_current() {
        Ok(_) => thread::spawn(move || init_store(path))
            .join()
            .map_err(|_| {
                Error::Internal("Settings store initialization thread panicked".to_string())
            })??,
        Err(_) => init_store(path)?,
    };

    Ok(Arc::new(store))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_settings_store(_data_dir: Option<&Path>) -> Result<Arc<dyn SettingsStore>> {
    Err(settings_store_missing_error())
}

#[cfg(feature = "desktop-shims")]
fn provide_default_media_engine() -> Result<Arc<dyn MediaEngine>> {
    Ok(Arc::new(bridge_desktop::SimulatedMediaEngine::new()))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_media_engine() -> Result<Arc<dyn MediaEngine>> {
    Err(media_engine_missing_error())
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`CoreConfig`].
#[derive(Default)]
pub struct CoreConfigBuilder {
    settings_store: Option<Arc<dyn SettingsStore>>,
    media_engine: Option<Arc<dyn MediaEngine>>,
    logger_sink: Option<Arc<dyn LoggerSink>>,
    data_dir: Option<PathBuf>,
    event_buffer_size: Option<usize>,
    session_restore_timeout: Option<Duration>,
    sign_in_delay: Option<Duration>,
    history_limit: Option<usize>,
    fallback_audio_url: Option<Option<String>>,
}

impl CoreConfigBuilder {
    pub fn settings_store(mut self, store: Arc<dyn SettingsStore>) -> Self {
        self.settings_store = Some(store);
        self
    }

    pub fn media_engine(mut self, engine: Arc<dyn MediaEngine>) -> Self {
        self.media_engine = Some(engine);
        self
    }

    pub fn logger_sink(mut self, sink: Arc<dyn LoggerSink>) -> Self {
        self.logger_sink = Some(sink);
        self
    }

    pub fn data_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.data_dir = Some(path.into());
        self
    }

    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    pub fn session_restore_timeout(mut self, timeout: Duration) -> Self {
        self.session_restore_timeout = Some(timeout);
        self
    }

    /// Zero disables the simulated latency, which is what tests want.
    pub fn sign_in_delay(mut self, delay: Duration) -> Self {
        self.sign_in_delay = Some(delay);
        self
    }

    pub fn history_limit(mut self, limit: usize) -> Self {
        self.history_limit = Some(limit);
        self
    }

    /// `None` disables the fallback: songs without audio fail to load.
    pub fn fallback_audio_url(mut self, url: Option<String>) -> Self {
        self.fallback_audio_url = Some(url);
        self
    }

    /// Validates the tunables first, then resolves bridges (injecting the
    /// desktop defaults when enabled).
    pub fn build(self) -> Result<CoreConfig> {
        let event_buffer_size = self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE);
        let session_restore_timeout = self
            .session_restore_timeout
            .unwrap_or(DEFAULT_SESSION_RESTORE_TIMEOUT);
        let sign_in_delay = self.sign_in_delay.unwrap_or(DEFAULT_SIGN_IN_DELAY);
        let history_limit = self.history_limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
        let fallback_audio_url = self
            .fallback_audio_url
            .unwrap_or_else(|| Some(DEFAULT_FALLBACK_AUDIO_URL.to_string()));

        // The settings default touches disk, so reject bad tunables first.
        Tunables {
            event_buffer_size,
            session_restore_timeout,
            history_limit,
            fallback_audio_url: fallback_audio_url.as_deref(),
        }
        .check()?;

        let media_engine = match self.media_engine {
            Some(engine) => engine,
            None => provide_default_media_engine()?,
        };

        let settings_store = match self.settings_store {
            Some(store) => store,
            None => provide_default_settings_store(self.data_dir.as_deref())?,
        };

        let config = CoreConfig {
            settings_store,
            media_engine,
            logger_sink: self.logger_sink,
            data_dir: self.data_dir,
            event_buffer_size,
            session_restore_timeout,
            sign_in_delay,
            history_limit,
            fallback_audio_url,
        };

        Ok(config)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::{
        AcquireOptions, BridgeError, MediaHandle, MediaSource, SettingsTransaction, StatusSink,
    };

    type BridgeResult<T> = std::result::Result<T, BridgeError>;

    struct NoopSettingsStore;

    #[async_trait]
    impl SettingsStore for NoopSettingsStore {
        async fn set_string(&self, _key: &str, _value: &str) -> BridgeResult<()> {
            Ok(())
        }
        async fn get_string(&self, _key: &str) -> BridgeResult<Option<String>> {
            Ok(None)
        }
        async fn set_bool(&self, _key: &str, _value: bool) -> BridgeResult<()> {
            Ok(())
        }
        async fn get_bool(&self, _key: &str) -> BridgeResult<Option<bool>> {
            Ok(None)
        }
        async fn delete(&self, _key: &str) -> BridgeResult<()> {
            Ok(())
        }
        async fn has_key(&self, _key: &str) -> BridgeResult<bool> {
            Ok(false)
        }
        async fn list_keys(&self) -> BridgeResult<Vec<String>> {
            Ok(Vec::new())
        }
        async fn clear_all(&self) -> BridgeResult<()> {
            Ok(())
        }
        async fn begin_transaction(&self) -> BridgeResult<Box<dyn SettingsTransaction + Send>> {
            Err(BridgeError::NotAvailable("transactions".to_string()))
        }
    }

    struct NoopMediaEngine;

    #[async_trait]
    impl MediaEngine for NoopMediaEngine {
        async fn acquire(
            &self,
            _source: &MediaSource,
            _options: AcquireOptions,
            _sink: StatusSink,
        ) -> BridgeResult<MediaHandle> {
            Ok(MediaHandle::new())
        }
        async fn release(&self, _handle: MediaHandle) -> BridgeResult<()> {
            Ok(())
        }
        async fn play(&self, _handle: MediaHandle) -> BridgeResult<()> {
            Ok(())
        }
        async fn pause(&self, _handle: MediaHandle) -> BridgeResult<()> {
            Ok(())
        }
        async fn seek(&self, _handle: MediaHandle, _position_ms: u64) -> BridgeResult<()> {
            Ok(())
        }
        async fn set_volume(&self, _handle: MediaHandle, _volume: f32) -> BridgeResult<()> {
            Ok(())
        }
    }

    fn injected() -> CoreConfigBuilder {
        CoreConfig::builder()
            .settings_store(Arc::new(NoopSettingsStore))
            .media_engine(Arc::new(NoopMediaEngine))
    }

    #[test]
    fn test_builder_defaults() {
        let config = injected().build().unwrap();

        assert_eq!(config.event_buffer_size, DEFAULT_EVENT_BUFFER_SIZE);
        assert_eq!(config.session_restore_timeout, Duration::from_millis(500));
        assert_eq!(config.sign_in_delay, Duration::from_secs(1));
        assert_eq!(config.history_limit, 50);
        assert_eq!(
            config.fallback_audio_url.as_deref(),
            Some(DEFAULT_FALLBACK_AUDIO_URL)
        );
        assert!(config.logger_sink.is_none());
    }

    #[test]
    fn test_builder_overrides() {
        let config = injected()
            .event_buffer_size(16)
            .sign_in_delay(Duration::ZERO)
            .history_limit(1000)
            .fallback_audio_url(None)
            .build()
            .unwrap();

        assert_eq!(config.event_buffer_size, 16);
        assert!(config.sign_in_delay.is_zero());
        assert_eq!(config.history_limit, 1000);
        assert!(config.fallback_audio_url.is_none());
    }

    #[test]
    fn test_validate_rejects_history_limit_out_of_range() {
        assert!(matches!(
            injected().history_limit(0).build(),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            injected().history_limit(MAX_HISTORY_LIMIT + 1).build(),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_buffer_and_timeout() {
        assert!(injected().event_buffer_size(0).build().is_err());
        assert!(injected()
            .session_restore_timeout(Duration::ZERO)
            .build()
            .is_err());
    }

    #[test]
    fn test_validate_fallback_url_scheme() {
        assert!(injected()
            .fallback_audio_url(Some("file:///tmp/bell.wav".to_string()))
            .build()
            .is_ok());
        assert!(injected()
            .fallback_audio_url(Some("HTTP://example.com/a.mp3".to_string()))
            .build()
            .is_ok());
        assert!(injected()
            .fallback_audio_url(Some("ftp://example.com/a.mp3".to_string()))
            .build()
            .is_err());
        assert!(injected()
            .fallback_audio_url(Some("https://".to_string()))
            .build()
            .is_err());
    }

    #[test]
    fn test_debug_hides_bridges() {
        let config = injected().build().unwrap();
        let debug = format!("{:?}", config);
        assert!(debug.contains("<SettingsStore>"));
        assert!(debug.contains("history_limit: 50"));
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[test]
    fn test_missing_bridges_are_reported() {
        let err = CoreConfig::builder()
            .settings_store(Arc::new(NoopSettingsStore))
            .build()
            .unwrap_err();
        assert!(
            matches!(err, Error::CapabilityMissing { ref capability, .. } if capability == "MediaEngine")
        );

        let err = CoreConfig::builder()
            .media_engine(Arc::new(NoopMediaEngine))
            .build()
            .unwrap_err();
        assert!(
            matches!(err, Error::CapabilityMissing { ref capability, .. } if capability == "SettingsStore")
        );
    }

    #[cfg(feature = "desktop-shims")]
    #[test]
    fn test_desktop_defaults_require_data_dir() {
        let result = CoreConfig::builder().build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[cfg(feature = "desktop-shims")]
    #[test]
    fn test_build_with_desktop_defaults() {
        let dir = tempfile::tempdir().unwrap();

        let config = CoreConfig::builder().data_dir(dir.path()).build().unwrap();
        assert!(dir.path().join("settings.db").exists());

        let settings = config.settings_store.clone();
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            settings.set_string("isAuthenticated", "true").await.unwrap();
            assert_eq!(
                settings.get_string("isAuthenticated").await.unwrap().as_deref(),
                Some("true")
            );
        });
    }

    #[cfg(feature = "desktop-shims")]
    #[tokio::test(flavor = "multi_thread")]
    async fn test_build_with_desktop_defaults_inside_runtime() {
        let dir = tempfile::tempdir().unwrap();

        let config = CoreConfig::builder().data_dir(dir.path()).build().unwrap();
        config.settings_store.set_string("user", "{}").await.unwrap();
        assert!(config.settings_store.has_key("user").await.unwrap());
    }
}
