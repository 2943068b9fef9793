//! PostgreSQL user repository implementation

use async_trait::async_trait;
use sqlx::{PgExecutor, PgPool, Row};

use crate::domain::user::{NewUser, User, UserId, UserRepository, UserRole};
use crate::domain::DomainError;
use crate::infrastructure::storage::user_still_owns;

const USER_COLUMNS: &str = "id, email, name, role, password_hash, created_at, updated_at";

/// PostgreSQL implementation of UserRepository
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn get(&self, id: UserId) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get user: {}", e)))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        select_user_by_email(&self.pool, email).await
    }

    async fn create(&self, user: NewUser) -> Result<User, DomainError> {
        insert_user(&self.pool, user).await
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET email = $2, name = $3, role = $4, password_hash = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(user.id().value())
        .bind(user.email())
        .bind(user.name())
        .bind(user.role().as_str())
        .bind(user.password_hash())
        .bind(user.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::conflict(format!("Email '{}' is already registered", user.email()))
            } else {
                DomainError::storage(format!("Failed to update user: {}", e))
            }
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!(
                "User '{}' not found",
                user.id()
            )));
        }

        Ok(user.clone())
    }

    async fn delete(&self, id: UserId) -> Result<bool, DomainError> {
        // Created companies, teams and surveys reference the user without a
        // cascade; memberships and answers cascade
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.value())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    user_still_owns(id)
                } else {
                    DomainError::storage(format!("Failed to delete user: {}", e))
                }
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to count users: {}", e)))?;

        Ok(count as usize)
    }
}

/// Exact-match lookup usable on the pool or inside a transaction
pub(crate) async fn select_user_by_email<'e, E>(
    executor: E,
    email: &str,
) -> Result<Option<User>, DomainError>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query(&format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS))
        .bind(email)
        .fetch_optional(executor)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get user by email: {}", e)))?;

    row.as_ref().map(row_to_user).transpose()
}

/// Insert a user, reporting a taken email as a conflict
///
/// `ON CONFLICT DO NOTHING` keeps an enclosing transaction usable when the
/// email already exists.
pub(crate) async fn insert_user<'e, E>(executor: E, user: NewUser) -> Result<User, DomainError>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query(&format!(
        r#"
        INSERT INTO users (email, name, role, password_hash)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO NOTHING
        RETURNING {}
        "#,
        USER_COLUMNS
    ))
    .bind(&user.email)
    .bind(&user.name)
    .bind(user.role.as_str())
    .bind(&user.password_hash)
    .fetch_optional(executor)
    .await
    .map_err(|e| DomainError::storage(format!("Failed to create user: {}", e)))?;

    match row {
        Some(row) => row_to_user(&row),
        None => Err(DomainError::conflict(format!(
            "Email '{}' is already registered",
            user.email
        ))),
    }
}

pub(crate) fn is_unique_violation(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

pub(crate) fn is_foreign_key_violation(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .map(|db| db.is_foreign_key_violation())
        .unwrap_or(false)
}

fn row_to_user(row: &sqlx::postgres::PgRow) -> Result<User, DomainError> {
    let id: i64 = row.get("id");
    let role: String = row.get("role");

    let user_id = UserId::new(id)
        .map_err(|e| DomainError::storage(format!("Invalid user ID in database: {}", e)))?;
    let role = role
        .parse::<UserRole>()
        .map_err(|e| DomainError::storage(format!("Invalid role in database: {}", e)))?;

    Ok(User::restore(
        user_id,
        row.get::<String, _>("email"),
        row.get::<String, _>("name"),
        role,
        row.get::<String, _>("password_hash"),
        row.get("created_at"),
        row.get("updated_at"),
    ))
}
