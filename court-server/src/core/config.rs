use std::path::PathBuf;

use crate::auth::JwtConfig;
use crate::core::{Result, ServerError};
use crate::orders::ChargeRates;

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | ./data | database and log root |
/// | HTTP_PORT | 3000 | HTTP/WebSocket port |
/// | ENVIRONMENT | development | development / staging / production |
/// | TAX_RATE | 0.18 | tax as a fraction of the cart subtotal |
/// | SERVICE_CHARGE_RATE | 0.05 | service charge fraction |
/// | PLATFORM_CHARGE | 5.0 | flat platform fee per checkout |
/// | TIMEZONE | Asia/Kolkata | business day for the queue `date` filter |
/// | FANOUT_BUFFER | 64 | per-connection outbound queue |
/// | EVENT_CHANNEL_CAPACITY | 4096 | committed-change broadcast capacity |
/// | REQUEST_TIMEOUT_MS | 30000 | HTTP request timeout |
/// | LOG_LEVEL | info | default tracing filter |
/// | LOG_DIR | (unset) | enables daily rolling file logs |
///
/// JWT settings are read by [`JwtConfig::from_env`].
///
/// ```ignore
/// WORK_DIR=/srv/court HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: String,
    pub http_port: u16,
    /// development | staging | production
    pub environment: String,
    pub jwt: JwtConfig,

    pub tax_rate: f64,
    pub service_charge_rate: f64,
    pub platform_charge: f64,
    /// IANA zone name
    pub timezone: String,

    pub fanout_buffer: usize,
    pub event_channel_capacity: usize,
    pub request_timeout_ms: u64,

    pub log_level: String,
    pub log_dir: Option<String>,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self> {
        let config = Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            http_port: env_or("HTTP_PORT", 3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            jwt: JwtConfig::from_env()?,

            tax_rate: env_or("TAX_RATE", 0.18),
            service_charge_rate: env_or("SERVICE_CHARGE_RATE", 0.05),
            platform_charge: env_or("PLATFORM_CHARGE", 5.0),
            timezone: std::env::var("TIMEZONE").unwrap_or_else(|_| "Asia/Kolkata".into()),

            fanout_buffer: env_or("FANOUT_BUFFER", 64),
            event_channel_capacity: env_or(
                "EVENT_CHANNEL_CAPACITY",
                crate::orders::manager::DEFAULT_EVENT_CHANNEL_CAPACITY,
            ),
            request_timeout_ms: env_or("REQUEST_TIMEOUT_MS", 30000),

            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
        };
        config.validate()?;
        Ok(config)
    }

    /// Override selected values
    ///
    /// Mostly used by tests
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Result<Self> {
        let mut config = Self::from_env()?;
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for (name, rate) in [
            ("TAX_RATE", self.tax_rate),
            ("SERVICE_CHARGE_RATE", self.service_charge_rate),
        ] {
            if !rate.is_finite() || !(0.0..=1.0).contains(&rate) {
                return Err(ServerError::Config(format!(
                    "{} must be between 0 and 1, got {}",
                    name, rate
                )));
            }
        }
        if !self.platform_charge.is_finite() || self.platform_charge < 0.0 {
            return Err(ServerError::Config(format!(
                "PLATFORM_CHARGE must be non-negative, got {}",
                self.platform_charge
            )));
        }
        self.tz()?;
        Ok(())
    }

    /// Parsed business timezone
    pub fn tz(&self) -> Result<chrono_tz::Tz> {
        self.timezone
            .parse()
            .map_err(|_| ServerError::Config(format!("Unknown TIMEZONE: {}", self.timezone)))
    }

    pub fn charge_rates(&self) -> ChargeRates {
        ChargeRates::from_f64(self.tax_rate, self.service_charge_rate, self.platform_charge)
    }

    /// work_dir/database/court.redb
    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir)
            .join("database")
            .join("court.redb")
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::with_overrides("/tmp/court-test", 0).unwrap();
        assert_eq!(config.http_port, 0);
        assert!(config.database_path().ends_with("database/court.redb"));
        assert!(config.tz().is_ok());
    }

    #[test]
    fn test_rejects_bad_rates() {
        let mut config = Config::with_overrides("/tmp/court-test", 0).unwrap();
        config.tax_rate = 1.5;
        assert!(matches!(config.validate(), Err(ServerError::Config(_))));

        config.tax_rate = 0.18;
        config.timezone = "Mars/Olympus".to_string();
        assert!(matches!(config.validate(), Err(ServerError::Config(_))));
    }
}
