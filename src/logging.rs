use std::error::Error;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_SERVICE_NAME: &str = "portfolio-ledger";
const DEFAULT_ENVIRONMENT: &str = "development";

#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    pub log_level: String,
    pub service_name: String,
    pub environment: String,
    /// Loki push endpoint; only used when shipping is switched on.
    pub loki_url: Option<String>,
    pub loki_enabled: bool,
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let or = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());
        Self {
            log_level: or("RUST_LOG", DEFAULT_LOG_LEVEL),
            service_name: or("SERVICE_NAME", DEFAULT_SERVICE_NAME),
            environment: or("ENVIRONMENT", DEFAULT_ENVIRONMENT),
            loki_url: lookup("LOKI_URL"),
            loki_enabled: lookup("LOKI_ENABLED")
                .map(|v| v.trim().eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.loki_enabled && self.loki_url.is_none() {
            return Err("LOKI_ENABLED is true but LOKI_URL is not set".to_string());
        }
        Ok(())
    }
}

/// Installs the global subscriber: env filter, console output and,
/// with the `loki` feature, an optional Loki shipping layer.
pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn Error>> {
    config.validate()?;

    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::try_new(&config.log_level)?)
        .with(fmt::layer());

    #[cfg(feature = "loki")]
    let subscriber = subscriber.with(loki_layer(&config)?);

    subscriber.try_init()?;

    tracing::info!(
        service = %config.service_name,
        environment = %config.environment,
        loki = config.loki_enabled,
        "Logging initialized"
    );
    Ok(())
}

#[cfg(feature = "loki")]
fn loki_layer(config: &LoggingConfig) -> Result<Option<tracing_loki::Layer>, Box<dyn Error>> {
    let Some(loki_url) = config.loki_url.as_deref().filter(|_| config.loki_enabled) else {
        return Ok(None);
    };

    let (layer, task) = tracing_loki::builder()
        .label("service", &config.service_name)?
        .label("environment", &config.environment)?
        .build_url(url::Url::parse(loki_url)?)?;

    // Background shipper; needs the tokio runtime to be running.
    tokio::spawn(task);
    Ok(Some(layer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_map(vars: &[(&str, &str)]) -> LoggingConfig {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        LoggingConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults_to_info_console_logging() {
        let config = from_map(&[]);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.service_name, "portfolio-ledger");
        assert_eq!(config.environment, "development");
        assert!(!config.loki_enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn reads_overrides() {
        let config = from_map(&[
            ("RUST_LOG", "debug"),
            ("LOKI_ENABLED", " TRUE "),
            ("LOKI_URL", "http://localhost:3100"),
        ]);
        assert_eq!(config.log_level, "debug");
        assert!(config.loki_enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn loki_requires_url() {
        let config = from_map(&[("LOKI_ENABLED", "true")]);
        assert!(config.validate().is_err());
    }
}
