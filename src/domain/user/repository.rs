//! User repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{NewUser, User, UserId};
use crate::domain::DomainError;

/// Credential store for user records
///
/// A missing record is reported as `Ok(None)`, never as an error, so callers
/// can tell "no such user" apart from every storage failure.
#[async_trait]
pub trait UserRepository: Send + Sync + Debug {
    /// Get a user by their ID
    async fn get(&self, id: UserId) -> Result<Option<User>, DomainError>;

    /// Get a user by their email (exact match)
    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Create a new user; a taken email yields `DomainError::Conflict`
    async fn create(&self, user: NewUser) -> Result<User, DomainError>;

    /// Update an existing user
    async fn update(&self, user: &User) -> Result<User, DomainError>;

    /// Delete a user
    async fn delete(&self, id: UserId) -> Result<bool, DomainError>;

    /// Count all users
    async fn count(&self) -> Result<usize, DomainError>;

    /// Check if an email is registered
    async fn email_exists(&self, email: &str) -> Result<bool, DomainError> {
        Ok(self.get_by_email(email).await?.is_some())
    }
}
