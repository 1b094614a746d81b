//! Revoked session tokens.
//!
//! Tokens are stored by SHA-256 digest and kept until they would have
//! expired anyway.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use super::check;
use crate::{Database, DbError};

/// Repository for logged-out tokens.
#[derive(Debug, Clone)]
pub struct RevokedTokenRepository {
    db: Database,
}

#[derive(Debug, Deserialize)]
struct RevokedRecord {
    #[allow(dead_code)]
    expires_at: DateTime<Utc>,
}

fn token_key(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

impl RevokedTokenRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Revoke a token. Revoking twice is a no-op.
    pub async fn revoke(&self, token: &str, expires_at: DateTime<Utc>) -> Result<(), DbError> {
        let key = token_key(token);
        let expires_at = expires_at.to_rfc3339();

        self.db
            .run(async {
                let response = self
                    .db
                    .client()
                    .query(
                        "UPSERT type::thing('revoked_token', $key) SET expires_at = <datetime> $expires_at",
                    )
                    .bind(("key", key))
                    .bind(("expires_at", expires_at))
                    .await?;
                check(response)?;
                Ok(())
            })
            .await
    }

    pub async fn is_revoked(&self, token: &str) -> Result<bool, DbError> {
        let key = token_key(token);

        self.db
            .run(async {
                let record: Option<RevokedRecord> =
                    self.db.client().select(("revoked_token", key)).await?;
                Ok(record.is_some())
            })
            .await
    }

    /// Delete revocations whose token expired before `now`.
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, DbError> {
        let now = now.to_rfc3339();

        self.db
            .run(async {
                let mut response = check(
                    self.db
                        .client()
                        .query("DELETE revoked_token WHERE expires_at < <datetime> $now RETURN BEFORE")
                        .bind(("now", now))
                        .await?,
                )?;

                let removed: Vec<RevokedRecord> = response.take(0)?;
                Ok(removed.len())
            })
            .await
    }
}
