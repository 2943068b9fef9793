//! PostgreSQL team repository and membership transaction

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Row, Transaction};

use crate::domain::company::CompanyId;
use crate::domain::team::{MembershipTransaction, NewTeam, Team, TeamId, TeamRepository};
use crate::domain::user::{NewUser, User, UserId};
use crate::domain::DomainError;
use crate::infrastructure::user::{insert_user, select_user_by_email};

/// PostgreSQL implementation of TeamRepository
#[derive(Debug, Clone)]
pub struct PostgresTeamRepository {
    pool: PgPool,
}

impl PostgresTeamRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TeamRepository for PostgresTeamRepository {
    async fn get(&self, id: TeamId) -> Result<Option<Team>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, description, company_id, created_by, created_at, updated_at
            FROM teams
            WHERE id = $1
            "#,
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get team: {}", e)))?;

        row.as_ref().map(row_to_team).transpose()
    }

    async fn create(&self, team: NewTeam) -> Result<Team, DomainError> {
        let row = sqlx::query(
            r#"
            INSERT INTO teams (name, description, company_id, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, description, company_id, created_by, created_at, updated_at
            "#,
        )
        .bind(&team.name)
        .bind(&team.description)
        .bind(team.company_id.value())
        .bind(team.created_by.value())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let missing_parent = e
                .as_database_error()
                .map(|db| db.is_foreign_key_violation())
                .unwrap_or(false);

            if missing_parent {
                DomainError::not_found(format!("Company '{}' not found", team.company_id))
            } else {
                DomainError::storage(format!("Failed to create team: {}", e))
            }
        })?;

        row_to_team(&row)
    }

    async fn list_by_company(&self, company: CompanyId) -> Result<Vec<Team>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, description, company_id, created_by, created_at, updated_at
            FROM teams
            WHERE company_id = $1
            ORDER BY id
            "#,
        )
        .bind(company.value())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list teams: {}", e)))?;

        rows.iter().map(row_to_team).collect()
    }

    async fn delete(&self, id: TeamId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM teams WHERE id = $1")
            .bind(id.value())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete team: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn member_ids(&self, id: TeamId) -> Result<Vec<UserId>, DomainError> {
        let ids: Vec<i64> =
            sqlx::query_scalar("SELECT user_id FROM team_members WHERE team_id = $1 ORDER BY user_id")
                .bind(id.value())
                .fetch_all(&self.pool)
                .await
                .map_err(|e| DomainError::storage(format!("Failed to list team members: {}", e)))?;

        ids.into_iter()
            .map(|id| {
                UserId::new(id)
                    .map_err(|e| DomainError::storage(format!("Invalid user ID in database: {}", e)))
            })
            .collect()
    }

    async fn begin(&self) -> Result<Box<dyn MembershipTransaction>, DomainError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;

        Ok(Box::new(PostgresMembershipTransaction { tx: Some(tx) }))
    }
}

/// Membership writes on one pooled connection
///
/// sqlx rolls the transaction back when it is dropped uncommitted.
pub struct PostgresMembershipTransaction {
    tx: Option<Transaction<'static, Postgres>>,
}

impl PostgresMembershipTransaction {
    fn tx(&mut self) -> Result<&mut Transaction<'static, Postgres>, DomainError> {
        self.tx
            .as_mut()
            .ok_or_else(|| DomainError::storage("Transaction already finished"))
    }
}

#[async_trait]
impl MembershipTransaction for PostgresMembershipTransaction {
    async fn find_user_by_email(&mut self, email: &str) -> Result<Option<User>, DomainError> {
        let tx = self.tx()?;
        select_user_by_email(&mut **tx, email).await
    }

    async fn create_user(&mut self, user: NewUser) -> Result<User, DomainError> {
        let tx = self.tx()?;
        insert_user(&mut **tx, user).await
    }

    async fn link_user(&mut self, team: TeamId, user: UserId) -> Result<bool, DomainError> {
        let tx = self.tx()?;

        let result = sqlx::query(
            r#"
            INSERT INTO team_members (team_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (team_id, user_id) DO NOTHING
            "#,
        )
        .bind(team.value())
        .bind(user.value())
        .execute(&mut **tx)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to link user to team: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn commit(&mut self) -> Result<(), DomainError> {
        let tx = self
            .tx
            .take()
            .ok_or_else(|| DomainError::storage("Transaction already finished"))?;

        tx.commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to commit transaction: {}", e)))
    }

    async fn rollback(&mut self) -> Result<(), DomainError> {
        match self.tx.take() {
            Some(tx) => tx.rollback().await.map_err(|e| {
                DomainError::storage(format!("Failed to roll back transaction: {}", e))
            }),
            None => Ok(()),
        }
    }
}

fn row_to_team(row: &sqlx::postgres::PgRow) -> Result<Team, DomainError> {
    let id = TeamId::new(row.get("id"))
        .map_err(|e| DomainError::storage(format!("Invalid team ID in database: {}", e)))?;
    let company_id = CompanyId::new(row.get("company_id"))
        .map_err(|e| DomainError::storage(format!("Invalid company ID in database: {}", e)))?;
    let created_by = UserId::new(row.get("created_by"))
        .map_err(|e| DomainError::storage(format!("Invalid user ID in database: {}", e)))?;

    Ok(Team::restore(
        id,
        row.get::<String, _>("name"),
        row.get::<String, _>("description"),
        company_id,
        created_by,
        row.get("created_at"),
        row.get("updated_at"),
    ))
}
