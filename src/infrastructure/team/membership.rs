//! Team membership provisioning
//!
//! `add_members` resolves every invitee to an existing or new user and links
//! it to the team inside one transaction. Invitations for new users are sent
//! after commit and never affect the outcome.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::domain::membership::{
    Invitee, ProvisionedMember, ProvisioningError, ProvisioningReport,
};
use crate::domain::notification::{Invitation, NotificationSink};
use crate::domain::team::{MembershipTransaction, TeamId, TeamRepository};
use crate::domain::user::{validate_display_name, validate_email, NewUser, User, UserRole};
use crate::domain::DomainError;
use crate::infrastructure::user::{generate_temporary_password, PasswordHasher};

/// Limits applied to a provisioning batch
#[derive(Debug, Clone)]
pub struct MembershipConfig {
    /// Deadline for the store phase; expiry rolls the batch back
    pub batch_timeout: Duration,
    /// Deadline for each invitation
    pub notification_timeout: Duration,
    pub temporary_password_length: usize,
}

impl Default for MembershipConfig {
    fn default() -> Self {
        Self {
            batch_timeout: Duration::from_secs(30),
            notification_timeout: Duration::from_secs(10),
            temporary_password_length: 12,
        }
    }
}

/// Members resolved inside the transaction, plus invitations owed after commit
struct Resolved {
    members: Vec<ProvisionedMember>,
    invitations: Vec<Invitation>,
}

/// Membership provisioner
#[derive(Clone)]
pub struct MembershipService {
    teams: Arc<dyn TeamRepository>,
    hasher: Arc<dyn PasswordHasher>,
    notifier: Arc<dyn NotificationSink>,
    config: MembershipConfig,
}

impl std::fmt::Debug for MembershipService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MembershipService")
            .field("teams", &self.teams)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl MembershipService {
    pub fn new(
        teams: Arc<dyn TeamRepository>,
        hasher: Arc<dyn PasswordHasher>,
        notifier: Arc<dyn NotificationSink>,
        config: MembershipConfig,
    ) -> Self {
        Self {
            teams,
            hasher,
            notifier,
            config,
        }
    }

    /// Add a batch of invitees to a team
    ///
    /// Either every invitee ends up linked to the team or nothing is written.
    pub async fn add_members(
        &self,
        team_id: TeamId,
        invitees: Vec<Invitee>,
    ) -> Result<ProvisioningReport, ProvisioningError> {
        if invitees.is_empty() {
            return Err(ProvisioningError::EmptyBatch);
        }

        for (index, invitee) in invitees.iter().enumerate() {
            validate_email(&invitee.email)
                .and_then(|_| validate_display_name(&invitee.name))
                .map_err(|e| ProvisioningError::InvalidInvitee {
                    index,
                    message: e.to_string(),
                })?;
        }

        info!(team_id = %team_id, batch_size = invitees.len(), "Provisioning team members");

        let resolved = match timeout(
            self.config.batch_timeout,
            self.provision(team_id, &invitees),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => {
                // Dropping the transaction future rolls the batch back
                warn!(
                    team_id = %team_id,
                    timeout_secs = self.config.batch_timeout.as_secs_f64(),
                    "Provisioning deadline exceeded"
                );
                return Err(ProvisioningError::Timeout);
            }
        };

        let notifications_failed = self.notify(&resolved.invitations).await;

        let report = ProvisioningReport {
            team_id,
            members: resolved.members,
            notifications_failed,
        };

        info!(
            team_id = %team_id,
            created = report.created_count(),
            linked = report.linked_count(),
            notifications_failed,
            "Team members provisioned"
        );

        Ok(report)
    }

    async fn provision(
        &self,
        team_id: TeamId,
        invitees: &[Invitee],
    ) -> Result<Resolved, ProvisioningError> {
        if self.teams.get(team_id).await?.is_none() {
            return Err(ProvisioningError::TeamNotFound(team_id));
        }

        let mut tx = self.teams.begin().await?;

        match self.resolve_and_link(tx.as_mut(), team_id, invitees).await {
            Ok(resolved) => {
                tx.commit().await?;
                Ok(resolved)
            }
            Err(e) => {
                warn!(team_id = %team_id, error = %e, "Provisioning failed, rolling back");

                if let Err(rollback) = tx.rollback().await {
                    warn!(team_id = %team_id, error = %rollback, "Rollback failed");
                }

                Err(e.into())
            }
        }
    }

    async fn resolve_and_link(
        &self,
        tx: &mut dyn MembershipTransaction,
        team_id: TeamId,
        invitees: &[Invitee],
    ) -> Result<Resolved, DomainError> {
        let mut members = Vec::with_capacity(invitees.len());
        let mut invitations = Vec::new();

        for invitee in invitees {
            let (user, temporary_password) = match tx.find_user_by_email(&invitee.email).await? {
                // Stored identity wins over the supplied name
                Some(user) => (user, None),
                None => self.create_member(tx, invitee).await?,
            };

            let linked = tx.link_user(team_id, user.id()).await?;

            debug!(
                team_id = %team_id,
                user_id = %user.id(),
                created = temporary_password.is_some(),
                linked,
                "Resolved invitee"
            );

            members.push(ProvisionedMember {
                user_id: user.id(),
                email: user.email().to_string(),
                created: temporary_password.is_some(),
                linked,
            });

            if let Some(temporary_password) = temporary_password {
                invitations.push(Invitation {
                    email: user.email().to_string(),
                    name: user.name().to_string(),
                    team_id,
                    temporary_password,
                });
            }
        }

        Ok(Resolved {
            members,
            invitations,
        })
    }

    /// Create a member with a temporary password
    ///
    /// Returns the password only when this call created the user. A conflict
    /// means a concurrent batch created the email first; that user is reused.
    async fn create_member(
        &self,
        tx: &mut dyn MembershipTransaction,
        invitee: &Invitee,
    ) -> Result<(User, Option<String>), DomainError> {
        let temporary_password = generate_temporary_password(self.config.temporary_password_length);
        let password_hash = self.hash_off_runtime(temporary_password.clone()).await?;

        let created = tx
            .create_user(NewUser {
                email: invitee.email.clone(),
                name: invitee.name.clone(),
                role: UserRole::Member,
                password_hash,
            })
            .await;

        match created {
            Ok(user) => Ok((user, Some(temporary_password))),
            Err(e) if e.is_conflict() => match tx.find_user_by_email(&invitee.email).await? {
                Some(user) => {
                    debug!(email = %invitee.email, "User created concurrently, reusing it");
                    Ok((user, None))
                }
                None => Err(e),
            },
            Err(e) => Err(e),
        }
    }

    /// Argon2 is CPU-bound; keep it off the async workers while the batch
    /// transaction is open
    async fn hash_off_runtime(&self, password: String) -> Result<String, DomainError> {
        let hasher = self.hasher.clone();

        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| DomainError::internal(format!("Password hashing task failed: {}", e)))?
    }

    /// Deliver invitations one by one; returns how many failed
    async fn notify(&self, invitations: &[Invitation]) -> usize {
        let mut failed = 0;

        for invitation in invitations {
            let outcome = timeout(
                self.config.notification_timeout,
                self.notifier.send_invitation(invitation),
            )
            .await;

            match outcome {
                Ok(Ok(())) => {
                    debug!(email = %invitation.email, team_id = %invitation.team_id, "Invitation sent");
                }
                Ok(Err(e)) => {
                    warn!(
                        email = %invitation.email,
                        team_id = %invitation.team_id,
                        error = %e,
                        "Failed to send invitation"
                    );
                    failed += 1;
                }
                Err(_) => {
                    warn!(
                        email = %invitation.email,
                        team_id = %invitation.team_id,
                        "Invitation timed out"
                    );
                    failed += 1;
                }
            }
        }

        failed
    }
}
