//! PostgreSQL survey repository

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::survey::{
    Answer, AnswerId, NewAnswer, NewSurvey, OptionId, QuestionId, Survey, SurveyId, SurveyOption,
    SurveyQuestion, SurveyRepository, SurveyStatus,
};
use crate::domain::team::TeamId;
use crate::domain::user::UserId;
use crate::domain::DomainError;
use crate::infrastructure::user::{is_foreign_key_violation, is_unique_violation};

const SURVEY_COLUMNS: &str = "id, team_id, status, created_by, created_at, updated_at";
const ANSWER_COLUMNS: &str = "id, survey_id, user_id, question_id, option_id, created_at";

/// PostgreSQL implementation of SurveyRepository
#[derive(Debug, Clone)]
pub struct PostgresSurveyRepository {
    pool: PgPool,
}

impl PostgresSurveyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SurveyRepository for PostgresSurveyRepository {
    async fn get(&self, id: SurveyId) -> Result<Option<Survey>, DomainError> {
        let row = sqlx::query(&format!("SELECT {} FROM surveys WHERE id = $1", SURVEY_COLUMNS))
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get survey: {}", e)))?;

        row.as_ref().map(row_to_survey).transpose()
    }

    async fn create(&self, survey: NewSurvey) -> Result<Survey, DomainError> {
        let row = sqlx::query(&format!(
            "INSERT INTO surveys (team_id, status, created_by) VALUES ($1, $2, $3) RETURNING {}",
            SURVEY_COLUMNS
        ))
        .bind(survey.team_id.value())
        .bind(SurveyStatus::Active.as_str())
        .bind(survey.created_by.value())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                DomainError::not_found(format!("Team '{}' not found", survey.team_id))
            } else {
                DomainError::storage(format!("Failed to create survey: {}", e))
            }
        })?;

        row_to_survey(&row)
    }

    async fn list_by_team(&self, team: TeamId) -> Result<Vec<Survey>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM surveys WHERE team_id = $1 ORDER BY id",
            SURVEY_COLUMNS
        ))
        .bind(team.value())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list surveys: {}", e)))?;

        rows.iter().map(row_to_survey).collect()
    }

    async fn set_status(
        &self,
        id: SurveyId,
        status: SurveyStatus,
    ) -> Result<Option<Survey>, DomainError> {
        let row = sqlx::query(&format!(
            "UPDATE surveys SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            SURVEY_COLUMNS
        ))
        .bind(id.value())
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to update survey: {}", e)))?;

        row.as_ref().map(row_to_survey).transpose()
    }

    async fn delete(&self, id: SurveyId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM surveys WHERE id = $1")
            .bind(id.value())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete survey: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn create_answer(&self, answer: NewAnswer) -> Result<Answer, DomainError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO survey_responses (survey_id, user_id, question_id, option_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            ANSWER_COLUMNS
        ))
        .bind(answer.survey_id.value())
        .bind(answer.user_id.value())
        .bind(answer.question_id.value())
        .bind(answer.option_id.value())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| answer_insert_error(&answer, e))?;

        row_to_answer(&row)
    }

    async fn list_answers(&self, survey: SurveyId) -> Result<Vec<Answer>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM survey_responses WHERE survey_id = $1 ORDER BY id",
            ANSWER_COLUMNS
        ))
        .bind(survey.value())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list survey responses: {}", e)))?;

        rows.iter().map(row_to_answer).collect()
    }

    async fn questions(&self) -> Result<Vec<SurveyQuestion>, DomainError> {
        let rows = sqlx::query("SELECT id, text, category FROM survey_questions ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list questions: {}", e)))?;

        rows.iter()
            .map(|row| {
                Ok(SurveyQuestion {
                    id: QuestionId::from_stored(column(row, "id")?),
                    text: column(row, "text")?,
                    category: column(row, "category")?,
                })
            })
            .collect()
    }

    async fn options(&self) -> Result<Vec<SurveyOption>, DomainError> {
        let rows = sqlx::query("SELECT id, text, value FROM survey_options ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list options: {}", e)))?;

        rows.iter()
            .map(|row| {
                Ok(SurveyOption {
                    id: OptionId::from_stored(column(row, "id")?),
                    text: column(row, "text")?,
                    value: column(row, "value")?,
                })
            })
            .collect()
    }
}

/// Map a failed answer insert onto the violated constraint
fn answer_insert_error(answer: &NewAnswer, e: sqlx::Error) -> DomainError {
    if is_unique_violation(&e) {
        return DomainError::conflict(format!(
            "User '{}' already answered question '{}'",
            answer.user_id, answer.question_id
        ));
    }

    if is_foreign_key_violation(&e) {
        let constraint = e
            .as_database_error()
            .and_then(|db| db.constraint())
            .unwrap_or_default();

        return match constraint {
            "survey_responses_question_id_fkey" => {
                DomainError::validation(format!("Unknown question '{}'", answer.question_id))
            }
            "survey_responses_option_id_fkey" => {
                DomainError::validation(format!("Unknown option '{}'", answer.option_id))
            }
            "survey_responses_user_id_fkey" => {
                DomainError::not_found(format!("User '{}' not found", answer.user_id))
            }
            _ => DomainError::not_found(format!("Survey '{}' not found", answer.survey_id)),
        };
    }

    DomainError::storage(format!("Failed to record survey response: {}", e))
}

fn column<'r, T>(row: &'r PgRow, name: &str) -> Result<T, DomainError>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(name)
        .map_err(|e| DomainError::storage(format!("Failed to read column '{}': {}", name, e)))
}

fn stored_id<T, E: std::fmt::Display>(
    raw: i64,
    parse: impl FnOnce(i64) -> Result<T, E>,
) -> Result<T, DomainError> {
    parse(raw).map_err(|e| DomainError::storage(format!("Invalid ID in database: {}", e)))
}

fn row_to_survey(row: &PgRow) -> Result<Survey, DomainError> {
    let status: String = column(row, "status")?;

    Ok(Survey {
        id: stored_id(column(row, "id")?, SurveyId::new)?,
        team_id: stored_id(column(row, "team_id")?, TeamId::new)?,
        status: status
            .parse()
            .map_err(|e| DomainError::storage(format!("Invalid survey status in database: {}", e)))?,
        created_by: stored_id(column(row, "created_by")?, UserId::new)?,
        created_at: column(row, "created_at")?,
        updated_at: column(row, "updated_at")?,
    })
}

fn row_to_answer(row: &PgRow) -> Result<Answer, DomainError> {
    Ok(Answer {
        id: stored_id(column(row, "id")?, AnswerId::new)?,
        survey_id: stored_id(column(row, "survey_id")?, SurveyId::new)?,
        user_id: stored_id(column(row, "user_id")?, UserId::new)?,
        question_id: QuestionId::from_stored(column(row, "question_id")?),
        option_id: OptionId::from_stored(column(row, "option_id")?),
        created_at: column(row, "created_at")?,
    })
}
