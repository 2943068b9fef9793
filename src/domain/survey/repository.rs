//! Survey repository trait

use async_trait::async_trait;

use super::entity::{
    Answer, NewAnswer, NewSurvey, Survey, SurveyId, SurveyOption, SurveyQuestion, SurveyStatus,
};
use crate::domain::team::TeamId;
use crate::domain::DomainError;

/// Repository for surveys, their answers and the question catalog
#[async_trait]
pub trait SurveyRepository: Send + Sync + std::fmt::Debug {
    /// Get a survey by ID
    async fn get(&self, id: SurveyId) -> Result<Option<Survey>, DomainError>;

    /// Create a survey; the team must exist
    async fn create(&self, survey: NewSurvey) -> Result<Survey, DomainError>;

    /// List the surveys of a team, oldest first
    async fn list_by_team(&self, team: TeamId) -> Result<Vec<Survey>, DomainError>;

    /// Change the status; `Ok(None)` when the survey does not exist
    async fn set_status(
        &self,
        id: SurveyId,
        status: SurveyStatus,
    ) -> Result<Option<Survey>, DomainError>;

    /// Delete a survey and its answers
    async fn delete(&self, id: SurveyId) -> Result<bool, DomainError>;

    /// Record an answer
    ///
    /// An unknown question or option is a `Validation` error; answering the
    /// same question twice is a `Conflict`.
    async fn create_answer(&self, answer: NewAnswer) -> Result<Answer, DomainError>;

    /// Answers recorded for a survey, oldest first
    async fn list_answers(&self, survey: SurveyId) -> Result<Vec<Answer>, DomainError>;

    async fn questions(&self) -> Result<Vec<SurveyQuestion>, DomainError>;

    async fn options(&self) -> Result<Vec<SurveyOption>, DomainError>;
}
