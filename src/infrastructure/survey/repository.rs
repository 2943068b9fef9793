//! In-memory survey repository implementation

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::survey::{
    Answer, NewAnswer, NewSurvey, Survey, SurveyId, SurveyOption, SurveyQuestion,
    SurveyRepository, SurveyStatus,
};
use crate::domain::team::TeamId;
use crate::domain::DomainError;
use crate::infrastructure::storage::InMemoryDatabase;

/// In-memory implementation of SurveyRepository
#[derive(Debug, Clone, Default)]
pub struct InMemorySurveyRepository {
    db: InMemoryDatabase,
}

impl InMemorySurveyRepository {
    pub fn new(db: InMemoryDatabase) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SurveyRepository for InMemorySurveyRepository {
    async fn get(&self, id: SurveyId) -> Result<Option<Survey>, DomainError> {
        Ok(self.db.lock().await.surveys.get(&id.value()).cloned())
    }

    async fn create(&self, survey: NewSurvey) -> Result<Survey, DomainError> {
        let mut state = self.db.lock().await;

        if !state.teams.contains_key(&survey.team_id.value()) {
            return Err(DomainError::not_found(format!(
                "Team '{}' not found",
                survey.team_id
            )));
        }

        let id = state.next_survey_id()?;
        let survey = Survey::from_new(id, survey);
        state.surveys.insert(id.value(), survey.clone());

        Ok(survey)
    }

    async fn list_by_team(&self, team: TeamId) -> Result<Vec<Survey>, DomainError> {
        let state = self.db.lock().await;

        Ok(state
            .surveys
            .values()
            .filter(|s| s.team_id == team)
            .cloned()
            .collect())
    }

    async fn set_status(
        &self,
        id: SurveyId,
        status: SurveyStatus,
    ) -> Result<Option<Survey>, DomainError> {
        let mut state = self.db.lock().await;

        Ok(state.surveys.get_mut(&id.value()).map(|survey| {
            survey.status = status;
            survey.updated_at = Utc::now();
            survey.clone()
        }))
    }

    async fn delete(&self, id: SurveyId) -> Result<bool, DomainError> {
        Ok(self.db.lock().await.remove_survey(id.value()))
    }

    async fn create_answer(&self, answer: NewAnswer) -> Result<Answer, DomainError> {
        let mut state = self.db.lock().await;

        if !state.surveys.contains_key(&answer.survey_id.value()) {
            return Err(DomainError::not_found(format!(
                "Survey '{}' not found",
                answer.survey_id
            )));
        }

        if !state.users.contains_key(&answer.user_id.value()) {
            return Err(DomainError::not_found(format!(
                "User '{}' not found",
                answer.user_id
            )));
        }

        if !state.questions.iter().any(|q| q.id == answer.question_id) {
            return Err(DomainError::validation(format!(
                "Unknown question '{}'",
                answer.question_id
            )));
        }

        if !state.options.iter().any(|o| o.id == answer.option_id) {
            return Err(DomainError::validation(format!(
                "Unknown option '{}'",
                answer.option_id
            )));
        }

        let duplicate = state.answers.values().any(|a| {
            a.survey_id == answer.survey_id
                && a.user_id == answer.user_id
                && a.question_id == answer.question_id
        });
        if duplicate {
            return Err(DomainError::conflict(format!(
                "User '{}' already answered question '{}'",
                answer.user_id, answer.question_id
            )));
        }

        let id = state.next_answer_id()?;
        let answer = Answer::from_new(id, answer);
        state.answers.insert(id.value(), answer.clone());

        Ok(answer)
    }

    async fn list_answers(&self, survey: SurveyId) -> Result<Vec<Answer>, DomainError> {
        let state = self.db.lock().await;

        Ok(state
            .answers
            .values()
            .filter(|a| a.survey_id == survey)
            .cloned()
            .collect())
    }

    async fn questions(&self) -> Result<Vec<SurveyQuestion>, DomainError> {
        Ok(self.db.lock().await.questions.clone())
    }

    async fn options(&self) -> Result<Vec<SurveyOption>, DomainError> {
        Ok(self.db.lock().await.options.clone())
    }
}
