//! Survey endpoints: lifecycle, responses and the question catalog

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::middleware::Identity;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::survey::{
    Answer, AnswerId, OptionId, QuestionId, Survey, SurveyId, SurveyOption, SurveyQuestion,
    SurveyStatus,
};
use crate::domain::team::TeamId;
use crate::domain::user::UserId;
use crate::infrastructure::survey::SubmitAnswerRequest;

pub fn create_surveys_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_survey))
        .route("/questions", get(list_questions))
        .route("/options", get(list_options))
        .route("/team/{team_id}", get(list_team_surveys))
        .route("/{survey_id}", get(get_survey).delete(delete_survey))
        .route("/{survey_id}/complete", post(complete_survey))
        .route(
            "/{survey_id}/responses",
            post(submit_response).get(list_responses),
        )
}

#[derive(Debug, Deserialize)]
pub struct CreateSurveyBody {
    pub team_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct SubmitResponseBody {
    pub question_id: i64,
    pub option_id: i64,
}

#[derive(Debug, Serialize)]
pub struct SurveyResponse {
    pub id: SurveyId,
    pub team_id: TeamId,
    pub status: SurveyStatus,
    pub created_by: UserId,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Survey> for SurveyResponse {
    fn from(survey: &Survey) -> Self {
        Self {
            id: survey.id,
            team_id: survey.team_id,
            status: survey.status,
            created_by: survey.created_by,
            created_at: survey.created_at.to_rfc3339(),
            updated_at: survey.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListSurveysResponse {
    pub surveys: Vec<SurveyResponse>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub id: AnswerId,
    pub survey_id: SurveyId,
    pub user_id: UserId,
    pub question_id: QuestionId,
    pub option_id: OptionId,
    pub created_at: String,
}

impl From<&Answer> for AnswerResponse {
    fn from(answer: &Answer) -> Self {
        Self {
            id: answer.id,
            survey_id: answer.survey_id,
            user_id: answer.user_id,
            question_id: answer.question_id,
            option_id: answer.option_id,
            created_at: answer.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListAnswersResponse {
    pub responses: Vec<AnswerResponse>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct QuestionsResponse {
    pub questions: Vec<SurveyQuestion>,
}

#[derive(Debug, Serialize)]
pub struct OptionsResponse {
    pub options: Vec<SurveyOption>,
}

/// POST /api/v1/surveys
pub async fn create_survey(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Json(body): Json<CreateSurveyBody>,
) -> Result<(StatusCode, Json<SurveyResponse>), ApiError> {
    let team_id = TeamId::new(body.team_id).map_err(|e| ApiError::bad_request(e.to_string()))?;

    let survey = state.survey_service.create(actor, team_id).await?;
    Ok((StatusCode::CREATED, Json(SurveyResponse::from(&survey))))
}

/// GET /api/v1/surveys/{survey_id}
pub async fn get_survey(
    State(state): State<AppState>,
    Identity(_): Identity,
    Path(id): Path<String>,
) -> Result<Json<SurveyResponse>, ApiError> {
    let survey = state.survey_service.get(id.parse()?).await?;
    Ok(Json(SurveyResponse::from(&survey)))
}

/// GET /api/v1/surveys/team/{team_id}
pub async fn list_team_surveys(
    State(state): State<AppState>,
    Identity(_): Identity,
    Path(team_id): Path<String>,
) -> Result<Json<ListSurveysResponse>, ApiError> {
    let team_id = team_id
        .parse::<TeamId>()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let surveys: Vec<SurveyResponse> = state
        .survey_service
        .list_by_team(team_id)
        .await?
        .iter()
        .map(SurveyResponse::from)
        .collect();

    let total = surveys.len();
    Ok(Json(ListSurveysResponse { surveys, total }))
}

/// POST /api/v1/surveys/{survey_id}/complete
pub async fn complete_survey(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<String>,
) -> Result<Json<SurveyResponse>, ApiError> {
    let id: SurveyId = id.parse()?;
    debug!(survey_id = %id, actor = %actor, "Completing survey");

    let survey = state.survey_service.complete(id).await?;
    Ok(Json(SurveyResponse::from(&survey)))
}

/// DELETE /api/v1/surveys/{survey_id}
pub async fn delete_survey(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: SurveyId = id.parse()?;
    debug!(survey_id = %id, actor = %actor, "Deleting survey");

    state.survey_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/surveys/{survey_id}/responses
pub async fn submit_response(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<String>,
    Json(body): Json<SubmitResponseBody>,
) -> Result<(StatusCode, Json<AnswerResponse>), ApiError> {
    let request = SubmitAnswerRequest {
        question_id: QuestionId::new(body.question_id)?,
        option_id: OptionId::new(body.option_id)?,
    };

    let answer = state
        .survey_service
        .submit_answer(actor, id.parse()?, request)
        .await?;

    Ok((StatusCode::CREATED, Json(AnswerResponse::from(&answer))))
}

/// GET /api/v1/surveys/{survey_id}/responses
pub async fn list_responses(
    State(state): State<AppState>,
    Identity(_): Identity,
    Path(id): Path<String>,
) -> Result<Json<ListAnswersResponse>, ApiError> {
    let responses: Vec<AnswerResponse> = state
        .survey_service
        .answers(id.parse()?)
        .await?
        .iter()
        .map(AnswerResponse::from)
        .collect();

    let total = responses.len();
    Ok(Json(ListAnswersResponse { responses, total }))
}

/// GET /api/v1/surveys/questions
pub async fn list_questions(
    State(state): State<AppState>,
    Identity(_): Identity,
) -> Result<Json<QuestionsResponse>, ApiError> {
    let questions = state.survey_service.questions().await?;
    Ok(Json(QuestionsResponse { questions }))
}

/// GET /api/v1/surveys/options
pub async fn list_options(
    State(state): State<AppState>,
    Identity(_): Identity,
) -> Result<Json<OptionsResponse>, ApiError> {
    let options = state.survey_service.options().await?;
    Ok(Json(OptionsResponse { options }))
}
