//! # Catalog Module
//!
//! Read-only song and playlist data consumed by the playback core.
//!
//! ## Overview
//!
//! This module provides:
//! - `Song` and `Playlist` records
//! - `SongDraft`, the validated form for user-contributed songs
//! - the `CatalogSource` contract with search over title, artist and album
//! - `InMemoryCatalog`, a fixed sample catalog for hosts without a backend

pub mod draft;
pub mod error;
pub mod models;
pub mod source;

pub use draft::SongDraft;
pub use error::{CatalogError, Result};
pub use models::{Playlist, Song};
pub use source::{CatalogSource, InMemoryCatalog};
