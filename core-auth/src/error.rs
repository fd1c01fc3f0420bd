use bridge_traits::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Password must be at least {min} characters long")]
    PasswordTooShort { min: usize },

    #[error("Username must be at least {min} characters long")]
    UsernameTooShort { min: usize },

    #[error("Session storage failed: {0}")]
    Storage(#[from] BridgeError),

    #[error("Invalid stored profile: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Not authenticated")]
    NotAuthenticated,
}

impl AuthError {
    /// Whether the user can fix the problem and retry.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidEmail
                | AuthError::PasswordTooShort { .. }
                | AuthError::UsernameTooShort { .. }
                | AuthError::Storage(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;
