//! Company entity

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Company identifier - assigned by the store on creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompanyId(i64);

impl CompanyId {
    pub fn new(id: i64) -> Result<Self, DomainError> {
        if id <= 0 {
            return Err(DomainError::invalid_id(format!(
                "Company ID must be a positive integer, got {}",
                id
            )));
        }

        Ok(Self(id))
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl FromStr for CompanyId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s
            .parse::<i64>()
            .map_err(|_| DomainError::invalid_id(format!("Invalid company ID '{}'", s)))?;
        Self::new(id)
    }
}

impl std::fmt::Display for CompanyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A company that has not been persisted yet
#[derive(Debug, Clone)]
pub struct NewCompany {
    pub name: String,
    pub description: String,
    pub created_by: UserId,
}

/// Company entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    pub description: String,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Company {
    pub fn from_new(id: CompanyId, new_company: NewCompany) -> Self {
        let now = Utc::now();

        Self {
            id,
            name: new_company.name,
            description: new_company.description,
            created_by: new_company.created_by,
            created_at: now,
            updated_at: now,
        }
    }
}
