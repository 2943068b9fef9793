//! Company repository trait

use async_trait::async_trait;

use super::entity::{Company, CompanyId, NewCompany};
use crate::domain::DomainError;

/// Repository for managing companies
#[async_trait]
pub trait CompanyRepository: Send + Sync + std::fmt::Debug {
    /// Get a company by ID
    async fn get(&self, id: CompanyId) -> Result<Option<Company>, DomainError>;

    /// Create a new company
    async fn create(&self, company: NewCompany) -> Result<Company, DomainError>;
}
