//! Team endpoints, including batch member provisioning

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
use crate::domain::company::CompanyId;
use crate::domain::membership::{Invitee, ProvisionedMember};
use crate::domain::team::{Team, TeamId};
use crate::domain::user::UserId;
use crate::infrastructure::team::CreateTeamRequest;

pub fn create_teams_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_team))
        .route("/team/{id}", get(get_team).delete(delete_team))
        .route("/company/{company_id}", get(list_company_teams))
        .route("/{team_id}/members", post(add_members).get(list_members))
}

#[derive(Debug, Deserialize)]
pub struct CreateTeamBody {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub company_id: i64,
}

#[derive(Debug, Serialize)]
pub struct TeamResponse {
    pub id: TeamId,
    pub name: String,
    pub description: String,
    pub company_id: CompanyId,
    pub created_by: UserId,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Team> for TeamResponse {
    fn from(team: &Team) -> Self {
        Self {
            id: team.id(),
            name: team.name().to_string(),
            description: team.description().to_string(),
            company_id: team.company_id(),
            created_by: team.created_by(),
            created_at: team.created_at().to_rfc3339(),
            updated_at: team.updated_at().to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListTeamsResponse {
    pub teams: Vec<TeamResponse>,
    pub total: usize,
}

/// Provisioning request body
#[derive(Debug, Deserialize)]
pub struct AddMembersBody {
    pub users: Vec<Invitee>,
}

#[derive(Debug, Serialize)]
pub struct AddMembersResponse {
    pub message: String,
    pub team_id: TeamId,
    pub members: Vec<ProvisionedMember>,
    pub notifications_failed: usize,
}

#[derive(Debug, Serialize)]
pub struct MembersResponse {
    pub team_id: TeamId,
    pub user_ids: Vec<UserId>,
}

/// POST /api/v1/teams
pub async fn create_team(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Json(body): Json<CreateTeamBody>,
) -> Result<(StatusCode, Json<TeamResponse>), ApiError> {
    let company_id = CompanyId::new(body.company_id)?;

    let team = state
        .team_service
        .create(
            actor,
            CreateTeamRequest {
                name: body.name,
                description: body.description,
                company_id,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(TeamResponse::from(&team))))
}

/// GET /api/v1/teams/team/{id}
pub async fn get_team(
    State(state): State<AppState>,
    Identity(_): Identity,
    Path(id): Path<String>,
) -> Result<Json<TeamResponse>, ApiError> {
    let team = state.team_service.get(parse_team_id(&id)?).await?;
    Ok(Json(TeamResponse::from(&team)))
}

/// GET /api/v1/teams/company/{company_id}
pub async fn list_company_teams(
    State(state): State<AppState>,
    Identity(_): Identity,
    Path(company_id): Path<String>,
) -> Result<Json<ListTeamsResponse>, ApiError> {
    let company_id = company_id.parse::<CompanyId>()?;
    let teams: Vec<TeamResponse> = state
        .team_service
        .list_by_company(company_id)
        .await?
        .iter()
        .map(TeamResponse::from)
        .collect();

    let total = teams.len();
    Ok(Json(ListTeamsResponse { teams, total }))
}

/// DELETE /api/v1/teams/team/{id}
pub async fn delete_team(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_team_id(&id)?;
    debug!(team_id = %id, actor = %actor, "Deleting team");

    state.team_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/teams/{team_id}/members
///
/// All-or-nothing: either every invitee is linked or nothing is written.
pub async fn add_members(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(team_id): Path<String>,
    Json(body): Json<AddMembersBody>,
) -> Result<Json<AddMembersResponse>, ApiError> {
    let team_id = parse_team_id(&team_id)?;
    debug!(team_id = %team_id, actor = %actor, batch_size = body.users.len(), "Adding team members");

    let report = state
        .membership_service
        .add_members(team_id, body.users)
        .await?;

    Ok(Json(AddMembersResponse {
        message: format!(
            "{} member(s) added, {} new user(s) created",
            report.linked_count(),
            report.created_count()
        ),
        team_id: report.team_id,
        members: report.members,
        notifications_failed: report.notifications_failed,
    }))
}

/// GET /api/v1/teams/{team_id}/members
pub async fn list_members(
    State(state): State<AppState>,
    Identity(_): Identity,
    Path(team_id): Path<String>,
) -> Result<Json<MembersResponse>, ApiError> {
    let team_id = parse_team_id(&team_id)?;
    let user_ids = state.team_service.members(team_id).await?;

    Ok(Json(MembersResponse { team_id, user_ids }))
}

fn parse_team_id(raw: &str) -> Result<TeamId, ApiError> {
    raw.parse::<TeamId>()
        .map_err(|e| ApiError::bad_request(e.to_string()))
}
