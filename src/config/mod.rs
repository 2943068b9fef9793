//! Layered application configuration

mod app_config;

pub use app_config::{
    AppConfig, AuthConfig, DatabaseConfig, LogFormat, LoggingConfig, MailConfig,
    ProvisioningConfig, ServerConfig,
};
