//! Server configuration.
//!
//! Values come from the process environment (after `.env` is loaded) with
//! development defaults for everything except production secrets.

use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use config::{Config, Environment};
use db::DbConfig;
use mailer::{EmailJsConfig, EmailJsSender, EmailSender, LogSender, MailError};
use serde::Deserialize;
use thiserror::Error;

/// Secret used when `JWT_SECRET` is not set. Refused in production.
pub const DEV_JWT_SECRET: &str = "dev-only-insecure-jwt-secret";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Deployment mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Deployment {
    Development,
    Production,
}

/// API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub environment: Deployment,

    pub jwt_secret: String,
    /// Session token lifetime.
    pub token_ttl_hours: i64,

    /// Upper bound for a whole HTTP request.
    pub request_timeout_secs: u64,
    /// Upper bound for a single store call.
    pub store_timeout_secs: u64,

    pub db_endpoint: String,
    pub db_namespace: String,
    pub db_database: String,
    pub db_username: Option<String>,
    pub db_password: Option<String>,

    pub cors_origins: Vec<String>,

    pub emailjs_base_url: String,
    pub email_service_id: Option<String>,
    pub email_template_id: Option<String>,
    pub otp_template_id: Option<String>,
    pub email_public_key: Option<String>,
    pub email_private_key: Option<String>,
    pub contact_email: Option<String>,

    /// How often expired revoked tokens are purged.
    pub revoked_token_sweep_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4000,
            environment: Deployment::Development,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            token_ttl_hours: 24,
            request_timeout_secs: 30,
            store_timeout_secs: 5,
            db_endpoint: "mem://".to_string(),
            db_namespace: "jobboard".to_string(),
            db_database: "main".to_string(),
            db_username: None,
            db_password: None,
            cors_origins: vec!["*".to_string()],
            emailjs_base_url: mailer::EMAILJS_BASE_URL.to_string(),
            email_service_id: None,
            email_template_id: None,
            otp_template_id: None,
            email_public_key: None,
            email_private_key: None,
            contact_email: None,
            revoked_token_sweep_secs: 3600,
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Keys are the upper-cased field names (`PORT`, `JWT_SECRET`,
    /// `DB_ENDPOINT`, ...). `CORS_ORIGINS` is a comma-separated list.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let config = Config::builder()
            .set_default("host", defaults.host)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("environment", "development")?
            .set_default("jwt_secret", defaults.jwt_secret)?
            .set_default("token_ttl_hours", defaults.token_ttl_hours)?
            .set_default("request_timeout_secs", defaults.request_timeout_secs)?
            .set_default("store_timeout_secs", defaults.store_timeout_secs)?
            .set_default("db_endpoint", defaults.db_endpoint)?
            .set_default("db_namespace", defaults.db_namespace)?
            .set_default("db_database", defaults.db_database)?
            .set_default("cors_origins", defaults.cors_origins)?
            .set_default("emailjs_base_url", defaults.emailjs_base_url)?
            .set_default("revoked_token_sweep_secs", defaults.revoked_token_sweep_secs)?
            .add_source(
                Environment::default()
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cors_origins"),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that must never reach production.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.is_production() && self.jwt_secret == DEV_JWT_SECRET {
            return Err(ConfigError::Invalid(
                "JWT_SECRET must be set in production".into(),
            ));
        }
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::Invalid("JWT_SECRET must not be empty".into()));
        }
        if self.token_ttl_hours < 1 {
            return Err(ConfigError::Invalid(
                "TOKEN_TTL_HOURS must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == Deployment::Production
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn token_ttl(&self) -> TimeDelta {
        TimeDelta::hours(self.token_ttl_hours)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn revoked_token_sweep(&self) -> Duration {
        Duration::from_secs(self.revoked_token_sweep_secs.max(1))
    }

    /// Store settings for [`db::Database::connect`].
    pub fn db_config(&self) -> DbConfig {
        let mut config = DbConfig::endpoint(&self.db_endpoint)
            .with_namespace(&self.db_namespace)
            .with_database(&self.db_database)
            .with_query_timeout(Duration::from_secs(self.store_timeout_secs));

        if let (Some(username), Some(password)) = (&self.db_username, &self.db_password) {
            config = config.with_credentials(username, password);
        }
        config
    }

    /// EmailJS settings, when the account is fully configured.
    pub fn emailjs(&self) -> Option<EmailJsConfig> {
        let mut config = EmailJsConfig::new(
            self.email_service_id.clone()?,
            self.email_template_id.clone()?,
            self.otp_template_id.clone()?,
            self.email_public_key.clone()?,
        )
        .with_base_url(&self.emailjs_base_url);

        if let Some(private_key) = &self.email_private_key {
            config = config.with_private_key(private_key);
        }
        if let Some(contact_email) = &self.contact_email {
            config = config.with_contact_email(contact_email);
        }
        Some(config)
    }

    /// Build the email sender: EmailJS when configured, log-only otherwise.
    pub fn email_sender(&self) -> Result<Arc<dyn EmailSender>, MailError> {
        match self.emailjs() {
            Some(config) => Ok(Arc::new(EmailJsSender::new(config)?)),
            None => {
                tracing::warn!("EmailJS is not configured; emails will only be logged");
                Ok(Arc::new(LogSender))
            }
        }
    }
}
