//! TeamSurvey API
//!
//! Companies own teams, teams own members, members answer surveys. The
//! service provides:
//! - Password login issuing HS256 bearer tokens
//! - Batch provisioning of team members with invitation emails
//! - PostgreSQL persistence with an in-memory fallback

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use api::state::AppState;
use config::{AuthConfig, MailConfig};
use domain::{
    CompanyRepository, NotificationSink, SurveyRepository, TeamRepository, UserRepository,
};
use infrastructure::{
    auth::{JwtConfig, JwtService, TokenService},
    company::{CompanyService, InMemoryCompanyRepository, PostgresCompanyRepository},
    notification::{HttpMailSender, LogNotifier},
    storage::{connect_pool, run_schema_migrations, InMemoryDatabase, PostgresConfig},
    survey::{InMemorySurveyRepository, PostgresSurveyRepository, SurveyService},
    team::{
        InMemoryTeamRepository, MembershipConfig, MembershipService, PostgresTeamRepository,
        TeamService,
    },
    user::{
        generate_temporary_password, Argon2Hasher, InMemoryUserRepository, PasswordHasher,
        PostgresUserRepository, UserService,
    },
};
use sqlx::PgPool;
use tracing::{info, warn};

/// Repositories backing the services
struct Stores {
    users: Arc<dyn UserRepository>,
    companies: Arc<dyn CompanyRepository>,
    teams: Arc<dyn TeamRepository>,
    surveys: Arc<dyn SurveyRepository>,
}

impl Stores {
    fn in_memory(db: InMemoryDatabase) -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new(db.clone())),
            companies: Arc::new(InMemoryCompanyRepository::new(db.clone())),
            teams: Arc::new(InMemoryTeamRepository::new(db.clone())),
            surveys: Arc::new(InMemorySurveyRepository::new(db)),
        }
    }

    fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            companies: Arc::new(PostgresCompanyRepository::new(pool.clone())),
            teams: Arc::new(PostgresTeamRepository::new(pool.clone())),
            surveys: Arc::new(PostgresSurveyRepository::new(pool)),
        }
    }
}

/// Create the application state from configuration
///
/// Uses PostgreSQL when `database.url` is set, the in-memory store otherwise.
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let stores = match &config.database.url {
        Some(url) => {
            info!("Connecting to PostgreSQL...");
            let pool = connect_pool(&postgres_config(config, url)).await?;
            info!("PostgreSQL connection established");

            if config.database.run_migrations {
                let applied = run_schema_migrations(&pool).await?;
                info!(applied, "Schema migrations complete");
            }

            Stores::postgres(pool)
        }
        None => {
            warn!("No database URL configured. Using in-memory storage; data is lost on restart");
            Stores::in_memory(InMemoryDatabase::new())
        }
    };

    let notifier = create_notifier(&config.mail)?;
    let state = assemble(config, stores, notifier)?;

    if let Some(email) = &config.auth.initial_admin_email {
        create_initial_admin(&state, email, config.auth.initial_admin_password.as_deref()).await?;
    }

    Ok(state)
}

/// Application state over an in-memory store with the given notification sink
pub fn create_in_memory_state(
    config: &AppConfig,
    db: InMemoryDatabase,
    notifier: Arc<dyn NotificationSink>,
) -> anyhow::Result<AppState> {
    assemble(config, Stores::in_memory(db), notifier)
}

/// Create the first administrator when no user exists yet
async fn create_initial_admin(
    state: &AppState,
    email: &str,
    password: Option<&str>,
) -> anyhow::Result<()> {
    let generated = password.is_none();
    let password = password
        .map(str::to_string)
        .unwrap_or_else(|| generate_temporary_password(16));

    match state.user_service.bootstrap_admin(email, &password).await? {
        Some(admin) if generated => {
            warn!(
                user_id = %admin.id(),
                email = %email,
                password = %password,
                "Initial administrator created with a generated password; change it after first login"
            );
        }
        Some(admin) => info!(user_id = %admin.id(), email = %email, "Initial administrator created"),
        None => info!("Users already exist; skipping initial administrator"),
    }

    Ok(())
}

pub(crate) fn postgres_config(config: &AppConfig, url: &str) -> PostgresConfig {
    PostgresConfig::new(url)
        .with_max_connections(config.database.max_connections)
        .with_min_connections(config.database.min_connections)
        .with_connect_timeout(config.database.connect_timeout_secs)
}

fn assemble(
    config: &AppConfig,
    stores: Stores,
    notifier: Arc<dyn NotificationSink>,
) -> anyhow::Result<AppState> {
    let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2Hasher::new());
    let jwt = JwtService::new(jwt_config(&config.auth))?;

    let membership_config = MembershipConfig {
        batch_timeout: Duration::from_secs(config.provisioning.batch_timeout_secs),
        notification_timeout: Duration::from_secs(config.mail.timeout_secs),
        temporary_password_length: config.provisioning.temporary_password_length,
    };

    Ok(AppState {
        user_service: Arc::new(UserService::new(stores.users.clone(), hasher.clone())),
        token_service: Arc::new(TokenService::new(stores.users, hasher.clone(), jwt)),
        company_service: Arc::new(CompanyService::new(stores.companies.clone())),
        team_service: Arc::new(TeamService::new(stores.teams.clone(), stores.companies)),
        survey_service: Arc::new(SurveyService::new(stores.surveys, stores.teams.clone())),
        membership_service: Arc::new(MembershipService::new(
            stores.teams,
            hasher,
            notifier,
            membership_config,
        )),
        expose_token_errors: config.auth.expose_token_errors,
    })
}

fn jwt_config(auth: &AuthConfig) -> JwtConfig {
    let secret = auth.jwt_secret.clone().unwrap_or_else(|| {
        warn!(
            "No auth.jwt_secret configured. Generating random secret. \
            Tokens will NOT survive a restart."
        );
        generate_temporary_password(64)
    });

    JwtConfig::new(secret, auth.token_ttl_hours).with_previous_secrets(auth.previous_secrets.clone())
}

fn create_notifier(mail: &MailConfig) -> anyhow::Result<Arc<dyn NotificationSink>> {
    if !mail.enabled {
        info!("Mail delivery disabled; invitations are logged only");
        return Ok(Arc::new(LogNotifier::new(mail.survey_base_url.clone())));
    }

    info!(api_url = %mail.api_url, "Mail delivery enabled");
    let sender = HttpMailSender::new(
        mail.api_url.clone(),
        mail.api_key.clone(),
        mail.from.clone(),
        mail.survey_base_url.clone(),
        Duration::from_secs(mail.timeout_secs),
    )?;

    Ok(Arc::new(sender))
}
