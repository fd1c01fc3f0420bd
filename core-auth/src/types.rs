use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Avatar assigned to accounts created through e-mail login.
pub const DEFAULT_PROFILE_IMAGE: &str =
    "https://images.unsplash.com/photo-1535713875002-d1d0cf377fde?w=150&h=150&fit=crop&crop=face";

/// Identifier of a local account.
///
/// Derived from the creation time in Unix milliseconds, which is what earlier
/// client versions persisted, so stored profiles keep loading.
///
/// ```
/// use core_auth::UserId;
///
/// let id = UserId::from_millis(1_700_000_000_000);
/// assert_eq!(id.as_str(), "1700000000000");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn from_millis(millis: i64) -> Self {
        Self(millis.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Signed-in user profile.
///
/// Serialized with camelCase keys; this is the persisted `user` blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub favorite_genres: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Apply a partial update. Fields left `None` keep their value.
    pub fn apply(&mut self, update: ProfileUpdate) {
        if let Some(username) = update.username {
            self.username = username.trim().to_string();
        }
        if let Some(email) = update.email {
            self.email = email.trim().to_string();
        }
        if let Some(image) = update.profile_image {
            self.profile_image = Some(image);
        }
        if let Some(genres) = update.favorite_genres {
            self.favorite_genres = genres;
        }
    }
}

/// Partial profile update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub profile_image: Option<String>,
    pub favorite_genres: Option<Vec<String>>,
}

impl ProfileUpdate {
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn profile_image(mut self, url: impl Into<String>) -> Self {
        self.profile_image = Some(url.into());
        self
    }

    pub fn favorite_genres(mut self, genres: Vec<String>) -> Self {
        self.favorite_genres = Some(genres);
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
