//! Team repository and membership transaction traits

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use super::entity::{NewTeam, Team, TeamId};
use crate::domain::company::CompanyId;
use crate::domain::user::{NewUser, User, UserId};
use crate::domain::DomainError;

/// Repository for managing teams and their membership links
#[async_trait]
pub trait TeamRepository: Send + Sync + std::fmt::Debug {
    /// Get a team by ID
    async fn get(&self, id: TeamId) -> Result<Option<Team>, DomainError>;

    /// Create a new team; the owning company must exist
    async fn create(&self, team: NewTeam) -> Result<Team, DomainError>;

    /// List all teams owned by a company
    async fn list_by_company(&self, company: CompanyId) -> Result<Vec<Team>, DomainError>;

    /// Delete a team and its membership links
    async fn delete(&self, id: TeamId) -> Result<bool, DomainError>;

    /// Ids of every user linked to the team, ascending
    async fn member_ids(&self, id: TeamId) -> Result<Vec<UserId>, DomainError>;

    /// Open a unit of work scoped to one provisioning batch
    async fn begin(&self) -> Result<Box<dyn MembershipTransaction>, DomainError>;
}

/// A batch-scoped transaction over users and membership links
///
/// Nothing written through the transaction is visible to other callers until
/// `commit` succeeds. Dropping it without committing discards every change.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MembershipTransaction: Send {
    /// Look up a user by exact email; `Ok(None)` when no such user exists
    async fn find_user_by_email(&mut self, email: &str) -> Result<Option<User>, DomainError>;

    /// Insert a user; a taken email yields `DomainError::Conflict` and leaves
    /// the transaction usable
    async fn create_user(&mut self, user: NewUser) -> Result<User, DomainError>;

    /// Link a user to a team; returns `false` if the pair already existed
    async fn link_user(&mut self, team: TeamId, user: UserId) -> Result<bool, DomainError>;

    /// Make every change visible
    async fn commit(&mut self) -> Result<(), DomainError>;

    /// Discard every change
    async fn rollback(&mut self) -> Result<(), DomainError>;
}
