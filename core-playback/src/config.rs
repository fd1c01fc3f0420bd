//! # Playback Configuration

use core_runtime::config::{CoreConfig, DEFAULT_FALLBACK_AUDIO_URL, DEFAULT_HISTORY_LIMIT};
use serde::{Deserialize, Serialize};

use crate::error::{PlaybackError, Result};

/// Tunables for a [`PlaybackSession`](crate::PlaybackSession).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Maximum number of songs kept in the playback history.
    ///
    /// Default: 50.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Volume of a fresh session and the value `clear_all_data` restores.
    ///
    /// Default: 1.0.
    #[serde(default = "default_initial_volume")]
    pub initial_volume: f32,

    /// Loaded instead of a song whose audio reference is empty.
    ///
    /// `None` makes such songs fail to load.
    #[serde(default = "default_fallback_audio_url")]
    pub fallback_audio_url: Option<String>,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            initial_volume: default_initial_volume(),
            fallback_audio_url: default_fallback_audio_url(),
        }
    }
}

impl PlaybackConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.history_limit == 0 {
            return Err("history_limit must be > 0".to_string());
        }

        if !(0.0..=1.0).contains(&self.initial_volume) {
            return Err("initial_volume must be between 0.0 and 1.0".to_string());
        }

        if let Some(url) = &self.fallback_audio_url {
            if url.trim().is_empty() {
                return Err("fallback_audio_url must not be blank".to_string());
            }
        }

        Ok(())
    }

    /// Like [`validate`](Self::validate) with the crate error type.
    pub fn check(&self) -> Result<()> {
        self.validate().map_err(PlaybackError::Config)
    }
}

impl From<&CoreConfig> for PlaybackConfig {
    fn from(config: &CoreConfig) -> Self {
        Self {
            history_limit: config.history_limit,
            fallback_audio_url: config.fallback_audio_url.clone(),
            ..Self::default()
        }
    }
}

// ============================================================================
// Default Functions (for serde)
// ============================================================================

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

fn default_initial_volume() -> f32 {
    1.0
}

fn default_fallback_audio_url() -> Option<String> {
    Some(DEFAULT_FALLBACK_AUDIO_URL.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PlaybackConfig::default();
        assert_eq!(config.history_limit, 50);
        assert_eq!(config.initial_volume, 1.0);
        assert_eq!(
            config.fallback_audio_url.as_deref(),
            Some(DEFAULT_FALLBACK_AUDIO_URL)
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let config: PlaybackConfig = serde_json::from_str(r#"{"history_limit": 10}"#).unwrap();
        assert_eq!(config.history_limit, 10);
        assert_eq!(config.initial_volume, 1.0);
        assert!(config.fallback_audio_url.is_some());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let zero_history = PlaybackConfig {
            history_limit: 0,
            ..Default::default()
        };
        assert!(zero_history.validate().is_err());

        let loud = PlaybackConfig {
            initial_volume: 1.5,
            ..Default::default()
        };
        assert!(matches!(loud.check(), Err(PlaybackError::Config(_))));

        let blank_url = PlaybackConfig {
            fallback_audio_url: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(blank_url.validate().is_err());
    }
}
