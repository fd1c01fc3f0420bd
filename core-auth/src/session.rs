//! # Authentication Session
//!
//! Owns the signed-in [`User`] and its persisted copy.
//!
//! ## Usage
//!
//! ```no_run
//! use core_auth::{AuthConfig, AuthSession};
//! use core_runtime::events::EventBus;
//! use std::sync::Arc;
//! # use bridge_traits::SettingsStore;
//! # async fn example(store: Arc<dyn SettingsStore>) -> core_auth::Result<()> {
//! let auth = AuthSession::new(store, EventBus::new(100), AuthConfig::default());
//!
//! auth.initialize().await;
//! if !auth.is_authenticated().await {
//!     auth.login("alice@example.com", "secret1").await?;
//! }
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use bridge_traits::{Clock, SettingsStore, SystemClock};
use core_runtime::config::{CoreConfig, DEFAULT_SESSION_RESTORE_TIMEOUT, DEFAULT_SIGN_IN_DELAY};
use core_runtime::events::{AuthEvent, CoreEvent, EventBus};
use core_runtime::logging::redact_if_sensitive;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, instrument, warn};

use crate::error::{AuthError, Result};
use crate::types::{ProfileUpdate, User, UserId, DEFAULT_PROFILE_IMAGE};
use crate::validation::{email_local_part, validate_email, validate_password, validate_username};

/// Settings key holding the JSON profile.
pub const USER_KEY: &str = "user";
/// Settings key holding `"true"` while signed in.
pub const AUTH_FLAG_KEY: &str = "isAuthenticated";

const LOGIN_GENRES: [&str; 3] = ["Pop", "Rock", "Electronic"];

pub type HookResult = std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Work that must happen before the session is torn down on sign-out.
///
/// A failing hook is logged and does not stop sign-out.
#[async_trait]
pub trait SignOutHook: Send + Sync {
    async fn on_sign_out(&self) -> HookResult;
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Upper bound for reading the persisted session in `initialize`.
    pub restore_timeout: Duration,
    /// Simulated credential check latency.
    pub sign_in_delay: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            restore_timeout: DEFAULT_SESSION_RESTORE_TIMEOUT,
            sign_in_delay: DEFAULT_SIGN_IN_DELAY,
        }
    }
}

impl From<&CoreConfig> for AuthConfig {
    fn from(config: &CoreConfig) -> Self {
        Self {
            restore_timeout: config.session_restore_timeout,
            sign_in_delay: config.sign_in_delay,
        }
    }
}

pub struct AuthSession {
    settings_store: Arc<dyn SettingsStore>,
    event_bus: EventBus,
    clock: Arc<dyn Clock>,
    config: AuthConfig,
    current_user: RwLock<Option<User>>,
    sign_out_hooks: RwLock<Vec<Arc<dyn SignOutHook>>>,
    /// Serializes login, signup, logout and profile updates.
    op_lock: Mutex<()>,
}

impl AuthSession {
    pub fn new(settings_store: Arc<dyn SettingsStore>, event_bus: EventBus, config: AuthConfig) -> Self {
        Self::with_clock(settings_store, event_bus, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        settings_store: Arc<dyn SettingsStore>,
        event_bus: EventBus,
        config: AuthConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            settings_store,
            event_bus,
            clock,
            config,
            current_user: RwLock::new(None),
            sign_out_hooks: RwLock::new(Vec::new()),
            op_lock: Mutex::new(()),
        }
    }

    pub async fn register_sign_out_hook(&self, hook: Arc<dyn SignOutHook>) {
        self.sign_out_hooks.write().await.push(hook);
    }

    pub async fn current_user(&self) -> Option<User> {
        self.current_user.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.current_user.read().await.is_some()
    }

    fn emit(&self, event: AuthEvent) {
        let _ = self.event_bus.emit(CoreEvent::Auth(event));
    }

    fn emit_failure(&self, err: &AuthError) {
        self.emit(AuthEvent::AuthError {
            message: err.to_string(),
            recoverable: err.is_recoverable(),
        });
    }

    // ========================================================================
    // Session restore
    // ========================================================================

    /// Restore a persisted session.
    ///
    /// Never fails: a missing, unreadable or slow store leaves the session
    /// signed out.
    #[instrument(skip(self))]
    pub async fn initialize(&self) {
        match tokio::time::timeout(self.config.restore_timeout, self.read_persisted()).await {
            Ok(Ok(Some(user))) => {
                info!(user_id = %user.id, "Restored persisted session");
                let user_id = user.id.to_string();
                *self.current_user.write().await = Some(user);
                self.emit(AuthEvent::SessionRestored { user_id });
            }
            Ok(Ok(None)) => debug!("No persisted session"),
            Ok(Err(e)) => warn!(error = %e, "Failed to restore session, starting signed out"),
            Err(_) => warn!(
                timeout_ms = self.config.restore_timeout.as_millis() as u64,
                "Session restore timed out, starting signed out"
            ),
        }
    }

    async fn read_persisted(&self) -> Result<Option<User>> {
        let flag = self.settings_store.get_string(AUTH_FLAG_KEY).await?;
        if flag.as_deref() != Some("true") {
            return Ok(None);
        }

        match self.settings_store.get_string(USER_KEY).await? {
            Some(blob) => Ok(Some(serde_json::from_str(&blob)?)),
            None => Ok(None),
        }
    }

    // ========================================================================
    // Sign-in
    // ========================================================================

    /// Sign in with e-mail and password.
    ///
    /// Any well-formed credentials are accepted; there is no backend.
    #[instrument(skip(self, email, password), fields(email = %redact_if_sensitive("email", email)))]
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let _guard = self.op_lock.lock().await;
        self.emit(AuthEvent::SigningIn {
            method: "login".to_string(),
        });

        let result = async {
            validate_email(email)?;
            validate_password(password)?;
            self.simulate_latency().await;

            let user = User {
                id: UserId::from_millis(self.clock.unix_timestamp_millis()),
                username: email_local_part(email).to_string(),
                email: email.to_string(),
                profile_image: Some(DEFAULT_PROFILE_IMAGE.to_string()),
                favorite_genres: LOGIN_GENRES.iter().map(|g| g.to_string()).collect(),
                created_at: self.clock.now(),
            };
            self.establish(user).await
        }
        .await;

        self.finish_sign_in(result)
    }

    /// Create an account and sign in.
    #[instrument(skip(self, username, email, password), fields(email = %redact_if_sensitive("email", email)))]
    pub async fn signup(&self, username: &str, email: &str, password: &str) -> Result<User> {
        let _guard = self.op_lock.lock().await;
        self.emit(AuthEvent::SigningIn {
            method: "signup".to_string(),
        });

        let result = async {
            validate_email(email)?;
            let username = validate_username(username)?;
            validate_password(password)?;
            self.simulate_latency().await;

            let user = User {
                id: UserId::from_millis(self.clock.unix_timestamp_millis()),
                username: username.to_string(),
                email: email.to_string(),
                profile_image: None,
                favorite_genres: Vec::new(),
                created_at: self.clock.now(),
            };
            self.establish(user).await
        }
        .await;

        self.finish_sign_in(result)
    }

    async fn simulate_latency(&self) {
        if !self.config.sign_in_delay.is_zero() {
            tokio::time::sleep(self.config.sign_in_delay).await;
        }
    }

    /// Persist both keys atomically, then adopt the user in memory.
    async fn establish(&self, user: User) -> Result<User> {
        let blob = serde_json::to_string(&user)?;

        let mut tx = self.settings_store.begin_transaction().await?;
        let written = async {
            tx.set_string(USER_KEY, &blob).await?;
            tx.set_string(AUTH_FLAG_KEY, "true").await
        }
        .await;
        match written {
            Ok(()) => tx.commit().await?,
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Rollback of session write failed");
                }
                return Err(e.into());
            }
        }

        *self.current_user.write().await = Some(user.clone());
        Ok(user)
    }

    fn finish_sign_in(&self, result: Result<User>) -> Result<User> {
        match result {
            Ok(user) => {
                info!(user_id = %user.id, username = %user.username, "Signed in");
                self.emit(AuthEvent::SignedIn {
                    user_id: user.id.to_string(),
                    username: user.username.clone(),
                });
                Ok(user)
            }
            Err(e) => {
                warn!(error = %e, "Sign-in failed");
                self.emit_failure(&e);
                Err(e)
            }
        }
    }

    // ========================================================================
    // Profile
    // ========================================================================

    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<User> {
        let _guard = self.op_lock.lock().await;

        let Some(mut user) = self.current_user().await else {
            return Err(AuthError::NotAuthenticated);
        };

        if let Some(email) = &update.email {
            validate_email(email.trim())?;
        }
        if let Some(username) = &update.username {
            validate_username(username)?;
        }

        user.apply(update);
        let blob = serde_json::to_string(&user)?;
        if let Err(e) = self.settings_store.set_string(USER_KEY, &blob).await {
            let err = AuthError::from(e);
            error!(error = %err, "Failed to persist profile update");
            self.emit_failure(&err);
            return Err(err);
        }

        *self.current_user.write().await = Some(user.clone());
        self.emit(AuthEvent::ProfileUpdated {
            user_id: user.id.to_string(),
        });
        Ok(user)
    }

    // ========================================================================
    // Sign-out
    // ========================================================================

    /// Sign out.
    ///
    /// Hooks run first. The in-memory session is cleared even when removing
    /// the persisted keys fails; that failure is still returned.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<()> {
        let _guard = self.op_lock.lock().await;

        let hooks = self.sign_out_hooks.read().await.clone();
        for hook in hooks {
            if let Err(e) = hook.on_sign_out().await {
                warn!(error = %e, "Sign-out hook failed");
            }
        }

        let removed = self
            .settings_store
            .delete_many(&[USER_KEY, AUTH_FLAG_KEY])
            .await;

        let previous = self.current_user.write().await.take();
        if let Some(user) = previous {
            info!(user_id = %user.id, "Signed out");
            self.emit(AuthEvent::SignedOut {
                user_id: user.id.to_string(),
            });
        }

        removed.map_err(|e| {
            let err = AuthError::from(e);
            error!(error = %err, "Failed to clear persisted session");
            self.emit_failure(&err);
            err
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use bridge_traits::SettingsTransaction;
    use chrono::{DateTime, TimeZone, Utc};
    use mockall::mock;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::Mutex as TokioMutex;

    type Storage = Arc<TokioMutex<HashMap<String, String>>>;

    // Mock SettingsStore for testing
    #[derive(Default)]
    struct MockSettingsStore {
        storage: Storage,
        fail_deletes: AtomicBool,
        fail_commits: AtomicBool,
        read_delay: Option<Duration>,
    }

    #[async_trait]
    impl SettingsStore for MockSettingsStore {
        async fn set_string(&self, key: &str, value: &str) -> BridgeResult<()> {
            self.storage
                .lock()
                .await
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn get_string(&self, key: &str) -> BridgeResult<Option<String>> {
            if let Some(delay) = self.read_delay {
                tokio::time::sleep(delay).await;
            }
            Ok(self.storage.lock().await.get(key).cloned())
        }

        async fn set_bool(&self, key: &str, value: bool) -> BridgeResult<()> {
            self.set_string(key, &value.to_string()).await
        }

        async fn get_bool(&self, key: &str) -> BridgeResult<Option<bool>> {
            Ok(self
                .storage
                .lock()
                .await
                .get(key)
                .and_then(|v| v.parse().ok()))
        }

        async fn delete(&self, key: &str) -> BridgeResult<()> {
            if self.fail_deletes.load(Ordering::SeqCst) {
                return Err(BridgeError::Storage("disk full".to_string()));
            }
            self.storage.lock().await.remove(key);
            Ok(())
        }

        async fn has_key(&self, key: &str) -> BridgeResult<bool> {
            Ok(self.storage.lock().await.contains_key(key))
        }

        async fn list_keys(&self) -> BridgeResult<Vec<String>> {
            Ok(self.storage.lock().await.keys().cloned().collect())
        }

        async fn clear_all(&self) -> BridgeResult<()> {
            self.storage.lock().await.clear();
            Ok(())
        }

        async fn begin_transaction(&self) -> BridgeResult<Box<dyn SettingsTransaction + Send>> {
            Ok(Box::new(MockTransaction {
                storage: Arc::clone(&self.storage),
                pending: Vec::new(),
                fail_commit: self.fail_commits.load(Ordering::SeqCst),
            }))
        }
    }

    struct MockTransaction {
        storage: Storage,
        pending: Vec<(String, Option<String>)>,
        fail_commit: bool,
    }

    #[async_trait]
    impl SettingsTransaction for MockTransaction {
        async fn set_string(&mut self, key: &str, value: &str) -> BridgeResult<()> {
            self.pending.push((key.to_string(), Some(value.to_string())));
            Ok(())
        }

        async fn delete(&mut self, key: &str) -> BridgeResult<()> {
            self.pending.push((key.to_string(), None));
            Ok(())
        }

        async fn commit(self: Box<Self>) -> BridgeResult<()> {
            if self.fail_commit {
                return Err(BridgeError::Storage("commit failed".to_string()));
            }
            let mut storage = self.storage.lock().await;
            for (key, value) in self.pending {
                match value {
                    Some(v) => storage.insert(key, v),
                    None => storage.remove(&key),
                };
            }
            Ok(())
        }

        async fn rollback(self: Box<Self>) -> BridgeResult<()> {
            Ok(())
        }
    }

    mock! {
        Hook {}

        #[async_trait]
        impl SignOutHook for Hook {
            async fn on_sign_out(&self) -> HookResult;
        }
    }

    struct FixedClock;

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            Utc.timestamp_millis_opt(1_700_000_000_000).unwrap()
        }
    }

    fn instant_config() -> AuthConfig {
        AuthConfig {
            restore_timeout: Duration::from_millis(500),
            sign_in_delay: Duration::ZERO,
        }
    }

    fn session_with(store: Arc<MockSettingsStore>) -> (AuthSession, EventBus) {
        let bus = EventBus::new(32);
        let session =
            AuthSession::with_clock(store, bus.clone(), instant_config(), Arc::new(FixedClock));
        (session, bus)
    }

    #[tokio::test]
    async fn test_login_persists_and_emits() {
        let store = Arc::new(MockSettingsStore::default());
        let (session, bus) = session_with(store.clone());
        let mut events = bus.subscribe();

        let user = session.login("alice@example.com", "secret1").await.unwrap();

        assert_eq!(user.id.as_str(), "1700000000000");
        assert_eq!(user.username, "alice");
        assert_eq!(user.favorite_genres, vec!["Pop", "Rock", "Electronic"]);
        assert_eq!(user.profile_image.as_deref(), Some(DEFAULT_PROFILE_IMAGE));
        assert!(session.is_authenticated().await);

        let storage = store.storage.lock().await;
        assert_eq!(storage.get(AUTH_FLAG_KEY).map(String::as_str), Some("true"));
        let persisted: User = serde_json::from_str(&storage[USER_KEY]).unwrap();
        assert_eq!(persisted, user);

        assert!(matches!(
            events.recv().await.unwrap(),
            CoreEvent::Auth(AuthEvent::SigningIn { ref method }) if method == "login"
        ));
        assert!(matches!(
            events.recv().await.unwrap(),
            CoreEvent::Auth(AuthEvent::SignedIn { ref username, .. }) if username == "alice"
        ));
    }

    #[tokio::test]
    async fn test_login_rejects_bad_credentials() {
        let store = Arc::new(MockSettingsStore::default());
        let (session, bus) = session_with(store.clone());
        let mut events = bus.subscribe();

        assert!(matches!(
            session.login("not-an-email", "secret1").await,
            Err(AuthError::InvalidEmail)
        ));
        assert!(matches!(
            session.login("alice@example.com", "12345").await,
            Err(AuthError::PasswordTooShort { .. })
        ));
        assert!(!session.is_authenticated().await);
        assert!(store.storage.lock().await.is_empty());

        let _signing_in = events.recv().await.unwrap();
        assert!(matches!(
            events.recv().await.unwrap(),
            CoreEvent::Auth(AuthEvent::AuthError {
                recoverable: true,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_signup_trims_username_and_has_no_genres() {
        let (session, _bus) = session_with(Arc::new(MockSettingsStore::default()));

        let user = session
            .signup("  carol  ", "carol@example.com", "hunter22")
            .await
            .unwrap();
        assert_eq!(user.username, "carol");
        assert!(user.favorite_genres.is_empty());
        assert!(user.profile_image.is_none());

        assert!(matches!(
            session.signup(" al ", "al@example.com", "hunter22").await,
            Err(AuthError::UsernameTooShort { .. })
        ));
    }

    #[tokio::test]
    async fn test_failed_commit_leaves_session_signed_out() {
        let store = Arc::new(MockSettingsStore::default());
        store.fail_commits.store(true, Ordering::SeqCst);
        let (session, _bus) = session_with(store);

        let result = session.login("alice@example.com", "secret1").await;
        assert!(matches!(result, Err(AuthError::Storage(_))));
        assert!(!session.is_authenticated().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sign_in_delay_is_awaited() {
        let bus = EventBus::new(8);
        let config = AuthConfig {
            sign_in_delay: Duration::from_secs(1),
            ..instant_config()
        };
        let session = AuthSession::new(Arc::new(MockSettingsStore::default()), bus, config);

        let started = tokio::time::Instant::now();
        session.login("dave@example.com", "secret1").await.unwrap();
        assert!(started.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_initialize_restores_session() {
        let store = Arc::new(MockSettingsStore::default());
        {
            let (first, _bus) = session_with(store.clone());
            first.login("erin@example.com", "secret1").await.unwrap();
        }

        let (restored, bus) = session_with(store);
        let mut events = bus.subscribe();
        restored.initialize().await;

        let user = restored.current_user().await.unwrap();
        assert_eq!(user.email, "erin@example.com");
        assert!(matches!(
            events.recv().await.unwrap(),
            CoreEvent::Auth(AuthEvent::SessionRestored { .. })
        ));
    }

    #[tokio::test]
    async fn test_initialize_ignores_corrupt_or_unflagged_blob() {
        let store = Arc::new(MockSettingsStore::default());
        store.set_string(USER_KEY, "{not json").await.unwrap();
        store.set_string(AUTH_FLAG_KEY, "true").await.unwrap();

        let (session, _bus) = session_with(store.clone());
        session.initialize().await;
        assert!(!session.is_authenticated().await);

        let (other, _bus) = session_with(Arc::new(MockSettingsStore::default()));
        other.login("f@example.com", "secret1").await.unwrap();
        let blob = serde_json::to_string(&other.current_user().await.unwrap()).unwrap();
        store.set_string(USER_KEY, &blob).await.unwrap();
        store.set_string(AUTH_FLAG_KEY, "false").await.unwrap();

        session.initialize().await;
        assert!(!session.is_authenticated().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_initialize_times_out() {
        let store = Arc::new(MockSettingsStore {
            read_delay: Some(Duration::from_secs(5)),
            ..Default::default()
        });
        store.set_string(AUTH_FLAG_KEY, "true").await.unwrap();

        let (session, _bus) = session_with(store);
        session.initialize().await;
        assert!(!session.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_update_profile() {
        let store = Arc::new(MockSettingsStore::default());
        let (session, _bus) = session_with(store.clone());

        assert!(matches!(
            session.update_profile(ProfileUpdate::default()).await,
            Err(AuthError::NotAuthenticated)
        ));

        session.login("gina@example.com", "secret1").await.unwrap();
        let updated = session
            .update_profile(ProfileUpdate::default().username("Gina G").email("gina@new.io"))
            .await
            .unwrap();
        assert_eq!(updated.username, "Gina G");

        let blob = store.storage.lock().await[USER_KEY].clone();
        let persisted: User = serde_json::from_str(&blob).unwrap();
        assert_eq!(persisted.email, "gina@new.io");

        assert!(matches!(
            session
                .update_profile(ProfileUpdate::default().email("broken"))
                .await,
            Err(AuthError::InvalidEmail)
        ));
        assert_eq!(session.current_user().await.unwrap().email, "gina@new.io");
    }

    #[tokio::test]
    async fn test_logout_runs_hooks_and_clears_storage() {
        let store = Arc::new(MockSettingsStore::default());
        let (session, bus) = session_with(store.clone());
        session.login("hank@example.com", "secret1").await.unwrap();

        let mut hook = MockHook::new();
        hook.expect_on_sign_out().times(1).returning(|| Ok(()));
        session.register_sign_out_hook(Arc::new(hook)).await;

        let mut events = bus.subscribe();
        session.logout().await.unwrap();

        assert!(!session.is_authenticated().await);
        assert!(store.storage.lock().await.is_empty());
        assert!(matches!(
            events.recv().await.unwrap(),
            CoreEvent::Auth(AuthEvent::SignedOut { ref user_id }) if user_id == "1700000000000"
        ));
    }

    #[tokio::test]
    async fn test_logout_continues_after_hook_failure() {
        let (session, _bus) = session_with(Arc::new(MockSettingsStore::default()));
        session.login("ivy@example.com", "secret1").await.unwrap();

        let mut failing = MockHook::new();
        failing
            .expect_on_sign_out()
            .times(1)
            .returning(|| Err("engine gone".into()));
        let mut second = MockHook::new();
        second.expect_on_sign_out().times(1).returning(|| Ok(()));
        session.register_sign_out_hook(Arc::new(failing)).await;
        session.register_sign_out_hook(Arc::new(second)).await;

        session.logout().await.unwrap();
        assert!(!session.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_logout_clears_memory_even_when_storage_fails() {
        let store = Arc::new(MockSettingsStore::default());
        let (session, _bus) = session_with(store.clone());
        session.login("jo@example.com", "secret1").await.unwrap();

        store.fail_deletes.store(true, Ordering::SeqCst);
        let result = session.logout().await;

        assert!(matches!(result, Err(AuthError::Storage(_))));
        assert!(!session.is_authenticated().await);
    }
}
