//! # Authentication Module
//!
//! Local account session for the streaming client.
//!
//! ## Overview
//!
//! The session validates credentials, keeps the signed-in [`User`] in memory,
//! and persists it to the host `SettingsStore` under two keys so it survives
//! restarts:
//!
//! | Key               | Value                         |
//! |-------------------|-------------------------------|
//! | `user`            | the profile as JSON           |
//! | `isAuthenticated` | `"true"` while signed in      |
//!
//! Sign-out runs every registered [`SignOutHook`] first; the playback core
//! registers itself there to drop its state.

pub mod error;
pub mod session;
pub mod types;
pub mod validation;

pub use error::{AuthError, Result};
pub use session::{AuthConfig, AuthSession, HookResult, SignOutHook, AUTH_FLAG_KEY, USER_KEY};
pub use types::{ProfileUpdate, User, UserId};
