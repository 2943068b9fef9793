//! Database migrations infrastructure

use sqlx::postgres::PgPool;
use tracing::info;

use crate::domain::survey::{default_options, default_questions};
use crate::domain::DomainError;

/// Applies versioned schema migrations tracked in `_migrations`
#[derive(Debug)]
pub struct PostgresMigrator {
    pool: PgPool,
}

impl PostgresMigrator {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the migrations table if it doesn't exist
    async fn ensure_migrations_table(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                version BIGINT PRIMARY KEY,
                description TEXT NOT NULL,
                installed_on TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create migrations table: {}", e)))?;

        Ok(())
    }

    /// Runs a single migration; returns `false` if it was already applied
    pub async fn run_migration(&self, migration: &Migration) -> Result<bool, DomainError> {
        self.ensure_migrations_table().await?;

        let applied: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM _migrations WHERE version = $1)",
        )
        .bind(migration.version)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to check migration status: {}", e)))?;

        if applied {
            return Ok(false);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin migration: {}", e)))?;

        // Schema scripts hold several statements
        sqlx::raw_sql(&migration.up)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to run migration {}: {}",
                    migration.version, e
                ))
            })?;

        sqlx::query("INSERT INTO _migrations (version, description) VALUES ($1, $2)")
            .bind(migration.version)
            .bind(&migration.description)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to record migration {}: {}",
                    migration.version, e
                ))
            })?;

        tx.commit().await.map_err(|e| {
            DomainError::storage(format!(
                "Failed to commit migration {}: {}",
                migration.version, e
            ))
        })?;

        Ok(true)
    }

    /// Returns the latest applied migration version
    pub async fn current_version(&self) -> Result<Option<i64>, DomainError> {
        self.ensure_migrations_table().await?;

        let version: Option<i64> = sqlx::query_scalar("SELECT MAX(version) FROM _migrations")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                DomainError::storage(format!("Failed to get migration version: {}", e))
            })?;

        Ok(version)
    }
}

/// Represents a database migration
#[derive(Debug, Clone)]
pub struct Migration {
    /// Migration version, strictly increasing
    pub version: i64,
    /// Human-readable description
    pub description: String,
    /// SQL to run when applying the migration
    pub up: String,
}

impl Migration {
    pub fn new(version: i64, description: impl Into<String>, up: impl Into<String>) -> Self {
        Self {
            version,
            description: description.into(),
            up: up.into(),
        }
    }
}

/// Schema of the survey service
pub fn schema_migrations() -> Vec<Migration> {
    vec![
        Migration::new(
            1,
            "Create users table",
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id BIGSERIAL PRIMARY KEY,
                email VARCHAR(254) NOT NULL UNIQUE,
                name VARCHAR(100) NOT NULL,
                role VARCHAR(32) NOT NULL DEFAULT 'member',
                password_hash TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );
            "#,
        ),
        Migration::new(
            2,
            "Create companies table",
            r#"
            CREATE TABLE IF NOT EXISTS companies (
                id BIGSERIAL PRIMARY KEY,
                name VARCHAR(100) NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                created_by BIGINT NOT NULL REFERENCES users(id),
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );
            CREATE INDEX IF NOT EXISTS idx_companies_created_by ON companies(created_by);
            "#,
        ),
        Migration::new(
            3,
            "Create teams table",
            r#"
            CREATE TABLE IF NOT EXISTS teams (
                id BIGSERIAL PRIMARY KEY,
                name VARCHAR(100) NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                company_id BIGINT NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
                created_by BIGINT NOT NULL REFERENCES users(id),
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );
            CREATE INDEX IF NOT EXISTS idx_teams_company_id ON teams(company_id);
            "#,
        ),
        Migration::new(
            4,
            "Create team_members table",
            r#"
            CREATE TABLE IF NOT EXISTS team_members (
                team_id BIGINT NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
                user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                PRIMARY KEY (team_id, user_id)
            );
            CREATE INDEX IF NOT EXISTS idx_team_members_user_id ON team_members(user_id);
            "#,
        ),
        Migration::new(5, "Create survey catalog", catalog_sql()),
        Migration::new(
            6,
            "Create surveys table",
            r#"
            CREATE TABLE IF NOT EXISTS surveys (
                id BIGSERIAL PRIMARY KEY,
                team_id BIGINT NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
                status VARCHAR(16) NOT NULL DEFAULT 'active'
                    CHECK (status IN ('active', 'completed')),
                created_by BIGINT NOT NULL REFERENCES users(id),
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );
            CREATE INDEX IF NOT EXISTS idx_surveys_team_id ON surveys(team_id);
            "#,
        ),
        Migration::new(
            7,
            "Create survey_responses table",
            r#"
            CREATE TABLE IF NOT EXISTS survey_responses (
                id BIGSERIAL PRIMARY KEY,
                survey_id BIGINT NOT NULL REFERENCES surveys(id) ON DELETE CASCADE,
                user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                question_id BIGINT NOT NULL REFERENCES survey_questions(id),
                option_id BIGINT NOT NULL REFERENCES survey_options(id),
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                UNIQUE (survey_id, user_id, question_id)
            );
            CREATE INDEX IF NOT EXISTS idx_survey_responses_survey_id ON survey_responses(survey_id);
            "#,
        ),
    ]
}

/// Catalog tables seeded with the built-in questions and options
///
/// Ids are written explicitly so they match the in-memory store.
fn catalog_sql() -> String {
    let questions: Vec<String> = default_questions()
        .iter()
        .map(|q| {
            format!(
                "({}, '{}', '{}')",
                q.id,
                sql_literal(&q.text),
                sql_literal(&q.category)
            )
        })
        .collect();
    let options: Vec<String> = default_options()
        .iter()
        .map(|o| format!("({}, '{}', {})", o.id, sql_literal(&o.text), o.value))
        .collect();

    format!(
        r#"
        CREATE TABLE IF NOT EXISTS survey_questions (
            id BIGSERIAL PRIMARY KEY,
            text TEXT NOT NULL,
            category VARCHAR(64) NOT NULL
        );
        CREATE TABLE IF NOT EXISTS survey_options (
            id BIGSERIAL PRIMARY KEY,
            text TEXT NOT NULL,
            value INTEGER NOT NULL
        );
        INSERT INTO survey_questions (id, text, category) VALUES {}
            ON CONFLICT (id) DO NOTHING;
        INSERT INTO survey_options (id, text, value) VALUES {}
            ON CONFLICT (id) DO NOTHING;
        SELECT setval(pg_get_serial_sequence('survey_questions', 'id'), (SELECT MAX(id) FROM survey_questions));
        SELECT setval(pg_get_serial_sequence('survey_options', 'id'), (SELECT MAX(id) FROM survey_options));
        "#,
        questions.join(", "),
        options.join(", ")
    )
}

fn sql_literal(text: &str) -> String {
    text.replace('\'', "''")
}

/// Runs all pending schema migrations
pub async fn run_schema_migrations(pool: &PgPool) -> Result<usize, DomainError> {
    let migrator = PostgresMigrator::new(pool.clone());
    let mut applied = 0;

    for migration in schema_migrations() {
        if migrator.run_migration(&migration).await? {
            info!(
                version = migration.version,
                description = %migration.description,
                "Applied migration"
            );
            applied += 1;
        }
    }

    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_creation() {
        let migration = Migration::new(1, "Test migration", "CREATE TABLE test");
        assert_eq!(migration.version, 1);
        assert_eq!(migration.description, "Test migration");
        assert_eq!(migration.up, "CREATE TABLE test");
    }

    #[test]
    fn test_schema_migrations_order() {
        let migrations = schema_migrations();
        assert_eq!(migrations.len(), 7);

        for i in 1..migrations.len() {
            assert!(
                migrations[i].version > migrations[i - 1].version,
                "Migrations should be in ascending order"
            );
        }
    }

    #[test]
    fn test_membership_pair_is_unique() {
        let migrations = schema_migrations();
        let members = migrations
            .iter()
            .find(|m| m.up.contains("team_members"))
            .unwrap();

        assert!(members.up.contains("PRIMARY KEY (team_id, user_id)"));
        assert!(migrations[0].up.contains("email VARCHAR(254) NOT NULL UNIQUE"));
    }

    #[test]
    fn test_catalog_seed_matches_built_in_catalog() {
        let catalog = catalog_sql();

        assert!(catalog.contains("(1, 'I know what is expected of me at work', 'clarity')"));
        assert!(catalog.contains("(5, 'Strongly agree', 5)"));
        assert_eq!(sql_literal("it's"), "it''s");
    }

    #[test]
    fn test_one_response_per_question() {
        let migrations = schema_migrations();
        let responses = migrations
            .iter()
            .find(|m| m.up.contains("CREATE TABLE IF NOT EXISTS survey_responses"))
            .unwrap();

        assert!(responses.up.contains("UNIQUE (survey_id, user_id, question_id)"));
        assert!(responses.up.contains("survey_id BIGINT NOT NULL REFERENCES surveys(id) ON DELETE CASCADE"));
    }
}
