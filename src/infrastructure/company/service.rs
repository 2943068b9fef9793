//! Company service

use std::sync::Arc;

use tracing::info;

use crate::domain::company::{Company, CompanyId, CompanyRepository, NewCompany};
use crate::domain::user::UserId;
use crate::domain::DomainError;

const MAX_COMPANY_NAME_LENGTH: usize = 100;

/// Request for creating a company
#[derive(Debug, Clone)]
pub struct CreateCompanyRequest {
    pub name: String,
    pub description: String,
}

/// Thin service over the company repository
#[derive(Debug, Clone)]
pub struct CompanyService {
    repository: Arc<dyn CompanyRepository>,
}

impl CompanyService {
    pub fn new(repository: Arc<dyn CompanyRepository>) -> Self {
        Self { repository }
    }

    /// Create a company owned by the caller
    pub async fn create(
        &self,
        actor: UserId,
        request: CreateCompanyRequest,
    ) -> Result<Company, DomainError> {
        if request.name.trim().is_empty() {
            return Err(DomainError::validation("Company name cannot be empty"));
        }

        if request.name.chars().count() > MAX_COMPANY_NAME_LENGTH {
            return Err(DomainError::validation(format!(
                "Company name cannot exceed {} characters",
                MAX_COMPANY_NAME_LENGTH
            )));
        }

        let company = self
            .repository
            .create(NewCompany {
                name: request.name,
                description: request.description,
                created_by: actor,
            })
            .await?;

        info!(company_id = %company.id, created_by = %actor, "Created company");
        Ok(company)
    }

    /// Get a company by ID
    pub async fn get(&self, id: CompanyId) -> Result<Company, DomainError> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Company '{}' not found", id)))
    }
}
