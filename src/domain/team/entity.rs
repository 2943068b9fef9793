//! Team entity and related types

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{validate_team_id, TeamValidationError};
use crate::domain::company::CompanyId;
use crate::domain::user::UserId;

/// Team identifier - assigned by the store on creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(i64);

impl TeamId {
    /// Create a new TeamId after validation
    pub fn new(id: i64) -> Result<Self, TeamValidationError> {
        validate_team_id(id)?;
        Ok(Self(id))
    }

    /// Get the inner value
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl FromStr for TeamId {
    type Err = TeamValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s
            .trim()
            .parse::<i64>()
            .map_err(|_| TeamValidationError::InvalidId)?;
        Self::new(id)
    }
}

impl std::fmt::Display for TeamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A team that has not been persisted yet
#[derive(Debug, Clone)]
pub struct NewTeam {
    pub name: String,
    pub description: String,
    pub company_id: CompanyId,
    pub created_by: UserId,
}

/// Team entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    /// Unique identifier
    id: TeamId,
    /// Display name
    name: String,
    /// Free-form description
    description: String,
    /// Owning company
    company_id: CompanyId,
    /// User that created the team
    created_by: UserId,
    /// Creation timestamp
    created_at: DateTime<Utc>,
    /// Last update timestamp
    updated_at: DateTime<Utc>,
}

impl Team {
    /// Materialize a freshly inserted team
    pub fn from_new(id: TeamId, new_team: NewTeam) -> Self {
        let now = Utc::now();

        Self {
            id,
            name: new_team.name,
            description: new_team.description,
            company_id: new_team.company_id,
            created_by: new_team.created_by,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild a team from stored columns
    pub fn restore(
        id: TeamId,
        name: impl Into<String>,
        description: impl Into<String>,
        company_id: CompanyId,
        created_by: UserId,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            company_id,
            created_by,
            created_at,
            updated_at,
        }
    }

    // Getters

    pub fn id(&self) -> TeamId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn company_id(&self) -> CompanyId {
        self.company_id
    }

    pub fn created_by(&self) -> UserId {
        self.created_by
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
