//! PostgreSQL company repository implementation

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::company::{Company, CompanyId, CompanyRepository, NewCompany};
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// PostgreSQL implementation of CompanyRepository
#[derive(Debug, Clone)]
pub struct PostgresCompanyRepository {
    pool: PgPool,
}

impl PostgresCompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CompanyRepository for PostgresCompanyRepository {
    async fn get(&self, id: CompanyId) -> Result<Option<Company>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, description, created_by, created_at, updated_at
            FROM companies
            WHERE id = $1
            "#,
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get company: {}", e)))?;

        row.as_ref().map(row_to_company).transpose()
    }

    async fn create(&self, company: NewCompany) -> Result<Company, DomainError> {
        let row = sqlx::query(
            r#"
            INSERT INTO companies (name, description, created_by)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, created_by, created_at, updated_at
            "#,
        )
        .bind(&company.name)
        .bind(&company.description)
        .bind(company.created_by.value())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create company: {}", e)))?;

        row_to_company(&row)
    }
}

fn row_to_company(row: &sqlx::postgres::PgRow) -> Result<Company, DomainError> {
    let id = CompanyId::new(row.get("id"))
        .map_err(|e| DomainError::storage(format!("Invalid company ID in database: {}", e)))?;
    let created_by = UserId::new(row.get("created_by"))
        .map_err(|e| DomainError::storage(format!("Invalid user ID in database: {}", e)))?;

    Ok(Company {
        id,
        name: row.get("name"),
        description: row.get("description"),
        created_by,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
