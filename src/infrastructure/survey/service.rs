//! Survey service: survey lifecycle and response collection

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::survey::{
    Answer, NewAnswer, NewSurvey, OptionId, QuestionId, Survey, SurveyId, SurveyOption,
    SurveyQuestion, SurveyRepository, SurveyStatus,
};
use crate::domain::team::{TeamId, TeamRepository};
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// One answer submitted by the caller
#[derive(Debug, Clone)]
pub struct SubmitAnswerRequest {
    pub question_id: QuestionId,
    pub option_id: OptionId,
}

#[derive(Debug, Clone)]
pub struct SurveyService {
    surveys: Arc<dyn SurveyRepository>,
    teams: Arc<dyn TeamRepository>,
}

impl SurveyService {
    pub fn new(surveys: Arc<dyn SurveyRepository>, teams: Arc<dyn TeamRepository>) -> Self {
        Self { surveys, teams }
    }

    /// Open a new survey for a team; the caller becomes its creator
    pub async fn create(&self, actor: UserId, team_id: TeamId) -> Result<Survey, DomainError> {
        info!(team_id = %team_id, "Creating survey");

        self.ensure_team(team_id).await?;

        let survey = self
            .surveys
            .create(NewSurvey {
                team_id,
                created_by: actor,
            })
            .await?;

        info!(survey_id = %survey.id, "Survey created");
        Ok(survey)
    }

    pub async fn get(&self, id: SurveyId) -> Result<Survey, DomainError> {
        debug!(survey_id = %id, "Getting survey");

        self.surveys
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Survey '{}' not found", id)))
    }

    pub async fn list_by_team(&self, team_id: TeamId) -> Result<Vec<Survey>, DomainError> {
        self.ensure_team(team_id).await?;
        self.surveys.list_by_team(team_id).await
    }

    /// Close a survey to further responses
    pub async fn complete(&self, id: SurveyId) -> Result<Survey, DomainError> {
        let survey = self
            .surveys
            .set_status(id, SurveyStatus::Completed)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Survey '{}' not found", id)))?;

        info!(survey_id = %id, "Survey completed");
        Ok(survey)
    }

    /// Delete a survey and every response to it
    pub async fn delete(&self, id: SurveyId) -> Result<(), DomainError> {
        if !self.surveys.delete(id).await? {
            return Err(DomainError::not_found(format!("Survey '{}' not found", id)));
        }

        info!(survey_id = %id, "Survey deleted");
        Ok(())
    }

    /// Record the caller's answer to one question
    ///
    /// Only members of the survey's team may answer, only while the survey is
    /// active, and only once per question.
    pub async fn submit_answer(
        &self,
        actor: UserId,
        survey_id: SurveyId,
        request: SubmitAnswerRequest,
    ) -> Result<Answer, DomainError> {
        let survey = self.get(survey_id).await?;

        if !survey.is_active() {
            return Err(DomainError::conflict(format!(
                "Survey '{}' is no longer accepting responses",
                survey_id
            )));
        }

        let members = self.teams.member_ids(survey.team_id).await?;
        if !members.contains(&actor) {
            return Err(DomainError::forbidden(format!(
                "User '{}' is not a member of team '{}'",
                actor, survey.team_id
            )));
        }

        let answer = self
            .surveys
            .create_answer(NewAnswer {
                survey_id,
                user_id: actor,
                question_id: request.question_id,
                option_id: request.option_id,
            })
            .await?;

        debug!(survey_id = %survey_id, question_id = %answer.question_id, "Response recorded");
        Ok(answer)
    }

    pub async fn answers(&self, survey_id: SurveyId) -> Result<Vec<Answer>, DomainError> {
        self.get(survey_id).await?;
        self.surveys.list_answers(survey_id).await
    }

    pub async fn questions(&self) -> Result<Vec<SurveyQuestion>, DomainError> {
        self.surveys.questions().await
    }

    pub async fn options(&self) -> Result<Vec<SurveyOption>, DomainError> {
        self.surveys.options().await
    }

    async fn ensure_team(&self, id: TeamId) -> Result<(), DomainError> {
        if self.teams.get(id).await?.is_none() {
            return Err(DomainError::not_found(format!("Team '{}' not found", id)));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::company::{CompanyRepository, NewCompany};
    use crate::domain::team::NewTeam;
    use crate::domain::user::{NewUser, UserRepository, UserRole};
    use crate::infrastructure::company::InMemoryCompanyRepository;
    use crate::infrastructure::storage::InMemoryDatabase;
    use crate::infrastructure::survey::InMemorySurveyRepository;
    use crate::infrastructure::team::InMemoryTeamRepository;
    use crate::infrastructure::user::InMemoryUserRepository;

    struct Setup {
        service: SurveyService,
        db: InMemoryDatabase,
        team: TeamId,
        manager: UserId,
        member: UserId,
        outsider: UserId,
    }

    async fn user(db: &InMemoryDatabase, email: &str) -> UserId {
        InMemoryUserRepository::new(db.clone())
            .create(NewUser {
                email: email.to_string(),
                name: email.to_string(),
                role: UserRole::Member,
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap()
            .id()
    }

    async fn setup() -> Setup {
        let db = InMemoryDatabase::new();
        let manager = user(&db, "manager@x.com").await;
        let member = user(&db, "member@x.com").await;
        let outsider = user(&db, "outsider@x.com").await;

        let company = InMemoryCompanyRepository::new(db.clone())
            .create(NewCompany {
                name: "Acme".to_string(),
                description: String::new(),
                created_by: manager,
            })
            .await
            .unwrap();
        let teams = Arc::new(InMemoryTeamRepository::new(db.clone()));
        let team = teams
            .create(NewTeam {
                name: "Core".to_string(),
                description: String::new(),
                company_id: company.id,
                created_by: manager,
            })
            .await
            .unwrap()
            .id();
        db.lock().await.link(team, member).unwrap();

        let service = SurveyService::new(Arc::new(InMemorySurveyRepository::new(db.clone())), teams);

        Setup {
            service,
            db,
            team,
            manager,
            member,
            outsider,
        }
    }

    fn request(question: i64, option: i64) -> SubmitAnswerRequest {
        SubmitAnswerRequest {
            question_id: QuestionId::new(question).unwrap(),
            option_id: OptionId::new(option).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_create_survey() {
        let setup = setup().await;

        let survey = setup.service.create(setup.manager, setup.team).await.unwrap();
        assert_eq!(survey.status, SurveyStatus::Active);
        assert_eq!(survey.created_by, setup.manager);
        assert_eq!(survey.team_id, setup.team);

        let listed = setup.service.list_by_team(setup.team).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, survey.id);
    }

    #[tokio::test]
    async fn test_unknown_team() {
        let setup = setup().await;
        let missing = TeamId::new(404).unwrap();

        let created = setup.service.create(setup.manager, missing).await;
        assert!(matches!(created, Err(DomainError::NotFound { .. })));

        let listed = setup.service.list_by_team(missing).await;
        assert!(matches!(listed, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_member_answers_once_per_question() {
        let setup = setup().await;
        let survey = setup.service.create(setup.manager, setup.team).await.unwrap();

        let answer = setup
            .service
            .submit_answer(setup.member, survey.id, request(1, 5))
            .await
            .unwrap();
        assert_eq!(answer.user_id, setup.member);

        let again = setup
            .service
            .submit_answer(setup.member, survey.id, request(1, 2))
            .await;
        assert!(matches!(again, Err(DomainError::Conflict { .. })));

        setup
            .service
            .submit_answer(setup.member, survey.id, request(2, 2))
            .await
            .unwrap();

        assert_eq!(setup.service.answers(survey.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_non_member_cannot_answer() {
        let setup = setup().await;
        let survey = setup.service.create(setup.manager, setup.team).await.unwrap();

        let result = setup
            .service
            .submit_answer(setup.outsider, survey.id, request(1, 3))
            .await;
        assert!(matches!(result, Err(DomainError::Forbidden { .. })));
    }

    #[tokio::test]
    async fn test_completed_survey_rejects_answers() {
        let setup = setup().await;
        let survey = setup.service.create(setup.manager, setup.team).await.unwrap();

        let completed = setup.service.complete(survey.id).await.unwrap();
        assert_eq!(completed.status, SurveyStatus::Completed);

        let result = setup
            .service
            .submit_answer(setup.member, survey.id, request(1, 3))
            .await;
        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_delete_survey_removes_answers() {
        let setup = setup().await;
        let survey = setup.service.create(setup.manager, setup.team).await.unwrap();
        setup
            .service
            .submit_answer(setup.member, survey.id, request(3, 4))
            .await
            .unwrap();

        setup.service.delete(survey.id).await.unwrap();

        assert!(matches!(
            setup.service.get(survey.id).await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(matches!(
            setup.service.answers(survey.id).await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(setup.db.lock().await.answers.is_empty());
        assert!(matches!(
            setup.service.delete(survey.id).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_catalogs() {
        let setup = setup().await;

        let questions = setup.service.questions().await.unwrap();
        let options = setup.service.options().await.unwrap();

        assert_eq!(questions[0].id.value(), 1);
        assert_eq!(options.iter().map(|o| o.value).collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
    }
}
