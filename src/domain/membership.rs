//! Membership provisioning types
//!
//! A provisioning batch is a list of invitees resolved to users and linked to
//! one team as a single unit of work.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::team::TeamId;
use super::user::UserId;
use super::DomainError;

/// One entry of a provisioning batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invitee {
    pub email: String,
    pub name: String,
}

impl Invitee {
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
        }
    }
}

/// Outcome for a single invitee after the batch committed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisionedMember {
    pub user_id: UserId,
    pub email: String,
    /// A new user was created for this invitee
    pub created: bool,
    /// A new link row was written (false when already a member)
    pub linked: bool,
}

/// Result of a successful `add_members` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisioningReport {
    pub team_id: TeamId,
    pub members: Vec<ProvisionedMember>,
    /// Invitations that could not be delivered; never fails the batch
    pub notifications_failed: usize,
}

impl ProvisioningReport {
    pub fn created_count(&self) -> usize {
        self.members.iter().filter(|m| m.created).count()
    }

    pub fn linked_count(&self) -> usize {
        self.members.iter().filter(|m| m.linked).count()
    }
}

/// Errors that abort a provisioning batch
#[derive(Debug, Error)]
pub enum ProvisioningError {
    #[error("at least one user must be supplied")]
    EmptyBatch,

    #[error("team '{0}' not found")]
    TeamNotFound(TeamId),

    #[error("invalid invitee at position {index}: {message}")]
    InvalidInvitee { index: usize, message: String },

    #[error("provisioning deadline exceeded")]
    Timeout,

    #[error(transparent)]
    Store(#[from] DomainError),
}
