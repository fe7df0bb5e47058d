use furnish_storage::StorageError;
use thiserror::Error;

/// Errors from the account flows.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Registration with an email that already has an account.
    #[error("email is already registered")]
    EmailTaken,

    /// Login with an unknown email or a wrong password. The two cases
    /// are deliberately indistinguishable to the caller.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// A required field failed validation.
    #[error("invalid field: {message}")]
    InvalidField { message: String },

    /// The requested user does not exist.
    #[error("user not found")]
    UserNotFound,

    /// A token could not be issued or verified.
    #[error("token error: {message}")]
    Token { message: String },

    /// Password hashing or verification failed at the library level.
    #[error("password hashing error: {message}")]
    Hashing { message: String },

    /// The user repository failed.
    #[error(transparent)]
    Repository(#[from] StorageError),
}

impl AuthError {
    pub fn invalid_field(message: impl Into<String>) -> Self {
        Self::InvalidField {
            message: message.into(),
        }
    }

    pub fn token(message: impl Into<String>) -> Self {
        Self::Token {
            message: message.into(),
        }
    }

    pub fn hashing(message: impl Into<String>) -> Self {
        Self::Hashing {
            message: message.into(),
        }
    }
}
