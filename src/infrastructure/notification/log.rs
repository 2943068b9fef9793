//! Notification sink that only logs

use async_trait::async_trait;
use tracing::info;

use super::template::survey_link;
use crate::domain::notification::{Invitation, NotificationSink};
use crate::domain::DomainError;

/// Records invitations instead of delivering them
#[derive(Debug, Clone)]
pub struct LogNotifier {
    survey_base_url: String,
}

impl LogNotifier {
    pub fn new(survey_base_url: impl Into<String>) -> Self {
        Self {
            survey_base_url: survey_base_url.into(),
        }
    }
}

#[async_trait]
impl NotificationSink for LogNotifier {
    async fn send_invitation(&self, invitation: &Invitation) -> Result<(), DomainError> {
        // The temporary password stays out of the log
        info!(
            email = %invitation.email,
            team_id = %invitation.team_id,
            link = %survey_link(&self.survey_base_url, invitation.team_id),
            "Mail delivery disabled, invitation not sent"
        );

        Ok(())
    }
}
