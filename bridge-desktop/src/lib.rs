//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop hosts
//! (macOS, Windows, Linux) and for integration testing.
//!
//! ## Overview
//!
//! - `SettingsStore` backed by a SQLite key-value table ([`SqliteSettingsStore`])
//! - `MediaEngine` simulated with Tokio timers ([`SimulatedMediaEngine`]); it
//!   reports positions and completion exactly like a platform engine would, but
//!   produces no sound
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{SimulatedMediaEngine, SqliteSettingsStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let settings = SqliteSettingsStore::new("/tmp/musicstream/settings.db".into())
//!         .await
//!         .expect("settings store");
//!     let engine = Arc::new(SimulatedMediaEngine::new());
//!     // Hand both to core_runtime::config::CoreConfig::builder()
//! }
//! ```

mod media;
mod settings;

pub use media::SimulatedMediaEngine;
pub use settings::SqliteSettingsStore;
