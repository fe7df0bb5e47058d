//! Registration, login and profile flows.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use furnish_core::{NewUser, Role, User, UserId};
use furnish_storage::UserRepository;

use crate::error::AuthError;
use crate::password;
use crate::token::TokenIssuer;

const MIN_PASSWORD_LEN: usize = 8;

/// Registration request fields.
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Login request fields.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// A signed session token together with the account it belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// Account flows over a user repository and a token issuer.
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    tokens: Arc<dyn TokenIssuer>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>, tokens: Arc<dyn TokenIssuer>) -> Self {
        Self { repo, tokens }
    }

    /// Creates an account and signs the first session token.
    ///
    /// New accounts always get the `user` role; admin accounts are
    /// provisioned out of band.
    pub async fn register(&self, registration: Registration) -> Result<AuthResponse, AuthError> {
        check_registration(&registration)?;

        if self.repo.get_by_email(&registration.email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = password::hash_password(&registration.password)?;
        let user = self
            .repo
            .create(&NewUser {
                email: registration.email,
                password_hash,
                name: registration.name,
                role: Role::User,
            })
            .await
            .map_err(|err| {
                // Losing the uniqueness race maps the same as the pre-check.
                if err.is_already_exists() {
                    AuthError::EmailTaken
                } else {
                    AuthError::Repository(err)
                }
            })?;

        tracing::info!(id = user.id, "user registered");
        let token = self.tokens.issue(&user)?;
        Ok(AuthResponse { token, user })
    }

    /// Verifies credentials and signs a session token.
    ///
    /// Unknown email and wrong password both surface as
    /// [`AuthError::InvalidCredentials`].
    pub async fn login(&self, credentials: Credentials) -> Result<AuthResponse, AuthError> {
        let user = self
            .repo
            .get_by_email(&credentials.email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !password::verify_password(&credentials.password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(&user)?;
        Ok(AuthResponse { token, user })
    }

    /// Looks up the account behind a verified token subject.
    pub async fn profile(&self, id: UserId) -> Result<User, AuthError> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}

fn check_registration(registration: &Registration) -> Result<(), AuthError> {
    if registration.name.trim().is_empty() {
        return Err(AuthError::invalid_field("name must not be empty"));
    }
    if !registration.email.contains('@') {
        return Err(AuthError::invalid_field("email is not valid"));
    }
    if registration.password.len() < MIN_PASSWORD_LEN {
        return Err(AuthError::invalid_field(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}
