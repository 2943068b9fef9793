//! Team service for team management

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::company::{CompanyId, CompanyRepository};
use crate::domain::team::{
    validate_team_description, validate_team_name, NewTeam, Team, TeamId, TeamRepository,
};
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Request for creating a new team
#[derive(Debug, Clone)]
pub struct CreateTeamRequest {
    pub name: String,
    pub description: Option<String>,
    pub company_id: CompanyId,
}

/// Team service for managing teams
#[derive(Debug, Clone)]
pub struct TeamService {
    teams: Arc<dyn TeamRepository>,
    companies: Arc<dyn CompanyRepository>,
}

impl TeamService {
    /// Create a new team service
    pub fn new(teams: Arc<dyn TeamRepository>, companies: Arc<dyn CompanyRepository>) -> Self {
        Self { teams, companies }
    }

    /// Create a new team inside an existing company
    pub async fn create(&self, actor: UserId, request: CreateTeamRequest) -> Result<Team, DomainError> {
        info!(company_id = %request.company_id, name = %request.name, "Creating team");

        validate_team_name(&request.name).map_err(|e| DomainError::validation(e.to_string()))?;

        let description = request.description.unwrap_or_default();
        validate_team_description(&description)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        self.ensure_company(request.company_id).await?;

        let team = self
            .teams
            .create(NewTeam {
                name: request.name,
                description,
                company_id: request.company_id,
                created_by: actor,
            })
            .await?;

        info!(team_id = %team.id(), "Team created");
        Ok(team)
    }

    /// Get a team by ID
    pub async fn get(&self, id: TeamId) -> Result<Team, DomainError> {
        debug!(team_id = %id, "Getting team");

        self.teams
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Team '{}' not found", id)))
    }

    /// List the teams of a company
    pub async fn list_by_company(&self, company_id: CompanyId) -> Result<Vec<Team>, DomainError> {
        self.ensure_company(company_id).await?;
        self.teams.list_by_company(company_id).await
    }

    /// Delete a team and its membership links
    pub async fn delete(&self, id: TeamId) -> Result<(), DomainError> {
        if !self.teams.delete(id).await? {
            return Err(DomainError::not_found(format!("Team '{}' not found", id)));
        }

        info!(team_id = %id, "Team deleted");
        Ok(())
    }

    /// Ids of the users linked to a team
    pub async fn members(&self, id: TeamId) -> Result<Vec<UserId>, DomainError> {
        self.get(id).await?;
        self.teams.member_ids(id).await
    }

    async fn ensure_company(&self, id: CompanyId) -> Result<(), DomainError> {
        if self.companies.get(id).await?.is_none() {
            return Err(DomainError::not_found(format!("Company '{}' not found", id)));
        }

        Ok(())
    }
}
