//! JSON mail API sink

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use super::template::render_invitation;
use crate::domain::notification::{Invitation, NotificationSink};
use crate::domain::DomainError;

#[derive(Debug, Serialize)]
struct SendEmailBody<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
}

/// Posts invitations to an HTTP mail API with a bearer key
#[derive(Debug, Clone)]
pub struct HttpMailSender {
    client: Client,
    api_url: String,
    api_key: String,
    from: String,
    survey_base_url: String,
}

impl HttpMailSender {
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        from: impl Into<String>,
        survey_base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, DomainError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url: api_url.into(),
            api_key: api_key.into(),
            from: from.into(),
            survey_base_url: survey_base_url.into(),
        })
    }
}

#[async_trait]
impl NotificationSink for HttpMailSender {
    async fn send_invitation(&self, invitation: &Invitation) -> Result<(), DomainError> {
        let message = render_invitation(invitation, &self.survey_base_url);
        let body = SendEmailBody {
            from: &self.from,
            to: [&invitation.email],
            subject: &message.subject,
            text: &message.text,
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DomainError::notification("Mail API request timed out")
                } else if e.is_connect() {
                    DomainError::notification("Mail API connection failed")
                } else {
                    DomainError::notification(format!("Mail API request failed: {}", e))
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let detail: String = response
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(200)
                .collect();

            return Err(DomainError::notification(format!(
                "Mail API returned {}: {}",
                status.as_u16(),
                detail
            )));
        }

        debug!(email = %invitation.email, status = status.as_u16(), "Invitation delivered");
        Ok(())
    }
}
