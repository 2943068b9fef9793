//! Notification sink abstraction

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use super::team::TeamId;
use super::DomainError;

/// An invitation for a freshly provisioned user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invitation {
    pub email: String,
    pub name: String,
    pub team_id: TeamId,
    pub temporary_password: String,
}

/// Delivers invitation messages
///
/// Delivery is best-effort: callers log errors and carry on.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send_invitation(&self, invitation: &Invitation) -> Result<(), DomainError>;
}
