//! In-memory company repository implementation

use async_trait::async_trait;

use crate::domain::company::{Company, CompanyId, CompanyRepository, NewCompany};
use crate::domain::DomainError;
use crate::infrastructure::storage::InMemoryDatabase;

/// In-memory implementation of CompanyRepository
#[derive(Debug, Clone, Default)]
pub struct InMemoryCompanyRepository {
    db: InMemoryDatabase,
}

impl InMemoryCompanyRepository {
    pub fn new(db: InMemoryDatabase) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CompanyRepository for InMemoryCompanyRepository {
    async fn get(&self, id: CompanyId) -> Result<Option<Company>, DomainError> {
        Ok(self.db.lock().await.companies.get(&id.value()).cloned())
    }

    async fn create(&self, company: NewCompany) -> Result<Company, DomainError> {
        let mut state = self.db.lock().await;

        if !state.users.contains_key(&company.created_by.value()) {
            return Err(DomainError::not_found(format!(
                "User '{}' not found",
                company.created_by
            )));
        }

        let id = state.next_company_id()?;
        let company = Company::from_new(id, company);
        state.companies.insert(id.value(), company.clone());

        Ok(company)
    }
}
