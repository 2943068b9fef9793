//! Token service: credential check at login and stateless validation

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::error::AuthError;
use super::jwt::JwtService;
use crate::domain::user::{User, UserId, UserRepository};
use crate::infrastructure::user::PasswordHasher;

/// A freshly issued bearer token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

/// Issues and validates bearer tokens
///
/// No session table exists; a token stays valid until its expiry.
#[derive(Debug, Clone)]
pub struct TokenService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    jwt: JwtService,
}

impl TokenService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        jwt: JwtService,
    ) -> Self {
        Self { users, hasher, jwt }
    }

    /// Verify credentials and sign a token for the user
    pub async fn issue_token(&self, email: &str, password: &str) -> Result<IssuedToken, AuthError> {
        let user = match self.users.get_by_email(email).await? {
            Some(user) => user,
            None => {
                debug!(email = %email, "Login for unknown email");
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !self.hasher.verify(password, user.password_hash()) {
            debug!(user_id = %user.id(), "Login with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let (token, expires_at) = self.jwt.generate(&user)?;
        info!(user_id = %user.id(), %expires_at, "Issued token");

        Ok(IssuedToken {
            token,
            expires_at,
            user,
        })
    }

    /// Pure computation: signature, algorithm, expiry and subject
    pub fn validate_token(&self, token: &str) -> Result<UserId, AuthError> {
        self.jwt.validate(token)
    }
}
