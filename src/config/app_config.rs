use serde::Deserialize;

/// Application configuration
///
/// Sources, later ones winning: `config/default.*`, `config/local.*`, then
/// `APP__SECTION__KEY` environment variables.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub mail: MailConfig,
    pub provisioning: ProvisioningConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// PostgreSQL settings; without a URL the service runs on the in-memory store
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Signing secret; a random one is generated when absent
    pub jwt_secret: Option<String>,
    /// Retired secrets accepted for verification only
    pub previous_secrets: Vec<String>,
    pub token_ttl_hours: u64,
    /// Put the validation failure reason in 401 bodies
    pub expose_token_errors: bool,
    /// Administrator created at startup when the user table is empty
    pub initial_admin_email: Option<String>,
    /// Password for the initial administrator; generated and logged when absent
    pub initial_admin_password: Option<String>,
}

/// Outbound invitation mail; disabled means invitations are only logged
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub enabled: bool,
    pub api_url: String,
    pub api_key: String,
    pub from: String,
    pub survey_base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProvisioningConfig {
    pub batch_timeout_secs: u64,
    pub temporary_password_length: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 30,
            run_migrations: true,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            previous_secrets: Vec::new(),
            token_ttl_hours: 12,
            expose_token_errors: true,
            initial_admin_email: None,
            initial_admin_password: None,
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_url: "https://api.resend.com/emails".to_string(),
            api_key: String::new(),
            from: "surveys@example.com".to_string(),
            survey_base_url: "http://localhost:8080".to_string(),
            timeout_secs: 10,
        }
    }
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self {
            batch_timeout_secs: 30,
            temporary_password_length: 12,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("auth.previous_secrets")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.database.url.is_none());
        assert_eq!(config.auth.token_ttl_hours, 12);
        assert!(config.auth.expose_token_errors);
        assert!(config.auth.initial_admin_email.is_none());
        assert!(!config.mail.enabled);
        assert_eq!(config.provisioning.temporary_password_length, 12);
    }

    #[test]
    fn test_partial_sections_fill_defaults() {
        let config: AppConfig = serde_json::from_value(serde_json::json!({
            "server": { "port": 9000 },
            "logging": { "format": "json" },
            "auth": { "jwt_secret": "s3cret", "previous_secrets": ["old"] },
        }))
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.auth.jwt_secret.as_deref(), Some("s3cret"));
        assert_eq!(config.auth.previous_secrets, vec!["old".to_string()]);
        assert_eq!(config.auth.token_ttl_hours, 12);
        assert_eq!(config.mail.timeout_secs, 10);
    }
}
