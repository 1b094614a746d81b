//! Application state.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use db::Database;
use db::repositories::{
    CompanyRepository, JobRepository, RevokedTokenRepository, StudentRepository,
};
use mailer::{EmailSender, Mailer};

use crate::auth::TokenKeys;
use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ApiConfig>,
    pub db: Database,
    pub jobs: JobRepository,
    pub students: StudentRepository,
    pub companies: CompanyRepository,
    pub revoked: RevokedTokenRepository,
    pub tokens: Arc<TokenKeys>,
    /// Direct sender, for messages whose failure must reach the caller.
    pub email: Arc<dyn EmailSender>,
    /// Fan-out deliveries.
    pub mailer: Mailer,
}

impl AppState {
    /// Create new application state around an open database.
    pub fn new(
        config: ApiConfig,
        db: Database,
        email: Arc<dyn EmailSender>,
        mailer: Mailer,
    ) -> Self {
        let tokens = TokenKeys::new(&config.jwt_secret, config.token_ttl());

        Self {
            config: Arc::new(config),
            jobs: JobRepository::new(db.clone()),
            students: StudentRepository::new(db.clone()),
            companies: CompanyRepository::new(db.clone()),
            revoked: RevokedTokenRepository::new(db.clone()),
            db,
            tokens: Arc::new(tokens),
            email,
            mailer,
        }
    }
}

/// Periodically delete revocations of tokens that have expired anyway.
pub fn spawn_revoked_token_sweeper(
    revoked: RevokedTokenRepository,
    every: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            match revoked.purge_expired(Utc::now()).await {
                Ok(0) => {}
                Ok(removed) => tracing::info!("Purged {} expired revoked tokens", removed),
                Err(e) => tracing::warn!("Failed to purge revoked tokens: {}", e),
            }
        }
    })
}
