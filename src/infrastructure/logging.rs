use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
    EnvFilter,
};

use crate::config::{LogFormat, LoggingConfig};

/// Filter used when RUST_LOG is not set
fn default_filter(level: &str) -> EnvFilter {
    EnvFilter::new(format!("{},sqlx=warn,hyper=warn", level))
}

pub fn init_logging(config: &LoggingConfig) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(&config.level));

    match config.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_span_events(FmtSpan::CLOSE))
                .try_init()?;
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().pretty().with_target(true))
                .try_init()?;
        }
    }

    tracing::info!(level = %config.level, format = ?config.format, "Logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_quiets_dependencies() {
        let filter = default_filter("debug").to_string();

        assert!(filter.contains("debug"));
        assert!(filter.contains("sqlx=warn"));
    }
}
