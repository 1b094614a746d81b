//! Company repository, including the email verification code.

use board_core::input::{CompanyRegistration, ProfileUpdate};
use board_core::{Company, CompanyId, JobId, OtpChallenge};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use surrealdb::sql::Thing;

use super::{check, record_key};
use crate::{Database, DbError};

/// Repository for company persistence operations.
#[derive(Debug, Clone)]
pub struct CompanyRepository {
    db: Database,
}

/// Internal record type for SurrealDB.
#[derive(Debug, Deserialize)]
struct CompanyRecord {
    id: Thing,
    name: String,
    email: String,
    mobile: Option<String>,
    #[serde(default)]
    posted_jobs: Vec<Thing>,
    #[serde(default)]
    verified: bool,
    created_at: DateTime<Utc>,
}

impl CompanyRecord {
    fn into_company(self) -> Result<Company, DbError> {
        Ok(Company {
            id: record_key(&self.id)?,
            name: self.name,
            email: self.email,
            mobile: self.mobile,
            posted_jobs: self
                .posted_jobs
                .iter()
                .map(record_key)
                .collect::<Result<Vec<JobId>, _>>()?,
            verified: self.verified,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Deserialize)]
struct CredentialRecord {
    id: Thing,
    password_hash: String,
}

impl CompanyRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create a company account. Emails are unique across companies; a
    /// duplicate yields [`DbError::Conflict`].
    pub async fn create(
        &self,
        registration: &CompanyRegistration,
        password_hash: String,
    ) -> Result<CompanyId, DbError> {
        let id = CompanyId::new();
        let mobile = Some(registration.mobile.clone()).filter(|m| !m.is_empty());

        self.db
            .run(async {
                let response = self
                    .db
                    .client()
                    .query(
                        r#"
                        CREATE type::thing('company', $id) CONTENT {
                            name: $name,
                            email: $email,
                            mobile: $mobile,
                            password_hash: $password_hash,
                            posted_jobs: [],
                            verified: false
                        }
                        "#,
                    )
                    .bind(("id", id.to_string()))
                    .bind(("name", registration.companyname.clone()))
                    .bind(("email", registration.email.clone()))
                    .bind(("mobile", mobile))
                    .bind(("password_hash", password_hash))
                    .await?;
                check(response)?;
                Ok(())
            })
            .await?;

        tracing::debug!("Created company {}", id);

        Ok(id)
    }

    /// Get a company by ID, without credential or pending code.
    pub async fn get(&self, id: CompanyId) -> Result<Company, DbError> {
        self.db
            .run(async {
                let mut response = self
                    .db
                    .client()
                    .query("SELECT * OMIT password_hash, otp FROM ONLY type::thing('company', $id)")
                    .bind(("id", id.to_string()))
                    .await?;

                let record: Option<CompanyRecord> = response.take(0)?;
                record
                    .ok_or_else(|| DbError::NotFound(format!("Company not found: {}", id)))?
                    .into_company()
            })
            .await
    }

    /// Look up the id and password hash for a login attempt.
    pub async fn find_credentials(
        &self,
        email: &str,
    ) -> Result<Option<(CompanyId, String)>, DbError> {
        let email = email.to_string();

        self.db
            .run(async {
                let mut response = self
                    .db
                    .client()
                    .query("SELECT id, password_hash FROM company WHERE email = $email LIMIT 1")
                    .bind(("email", email))
                    .await?;

                let records: Vec<CredentialRecord> = response.take(0)?;
                records
                    .into_iter()
                    .next()
                    .map(|r| Ok((record_key(&r.id)?, r.password_hash)))
                    .transpose()
            })
            .await
    }

    /// Update name, email and mobile. Only fields present are written.
    pub async fn update_profile(
        &self,
        id: CompanyId,
        update: &ProfileUpdate,
    ) -> Result<Company, DbError> {
        if update.is_empty() {
            return self.get(id).await;
        }

        let mut assignments = Vec::new();
        if update.name.is_some() {
            assignments.push("name = $name");
        }
        if update.email.is_some() {
            assignments.push("email = $email");
        }
        if update.mobile.is_some() {
            assignments.push("mobile = $mobile");
        }

        let query = format!(
            "UPDATE type::thing('company', $id) SET {} RETURN AFTER",
            assignments.join(", ")
        );

        self.db
            .run(async {
                let mut request = self
                    .db
                    .client()
                    .query(&query)
                    .bind(("id", id.to_string()));

                if let Some(name) = &update.name {
                    request = request.bind(("name", name.clone()));
                }
                if let Some(email) = &update.email {
                    request = request.bind(("email", email.clone()));
                }
                if let Some(mobile) = &update.mobile {
                    request = request.bind(("mobile", mobile.clone()));
                }

                let mut response = check(request.await?)?;
                let records: Vec<CompanyRecord> = response.take(0)?;

                records
                    .into_iter()
                    .next()
                    .ok_or_else(|| DbError::NotFound(format!("Company not found: {}", id)))?
                    .into_company()
            })
            .await
    }

    /// Store a verification code, replacing any previous one.
    pub async fn store_otp(&self, id: CompanyId, challenge: &OtpChallenge) -> Result<(), DbError> {
        let code = challenge.code.clone();
        let expires_at = challenge.expires_at.to_rfc3339();

        self.db
            .run(async {
                let mut response = check(
                    self.db
                        .client()
                        .query(
                            r#"
                            UPDATE type::thing('company', $id)
                            SET otp = { code: $code, expires_at: <datetime> $expires_at }
                            RETURN VALUE id
                            "#,
                        )
                        .bind(("id", id.to_string()))
                        .bind(("code", code))
                        .bind(("expires_at", expires_at))
                        .await?,
                )?;

                let updated: Vec<Thing> = response.take(0)?;
                if updated.is_empty() {
                    return Err(DbError::NotFound(format!("Company not found: {}", id)));
                }
                Ok(())
            })
            .await
    }

    /// Read the pending verification code, if any.
    pub async fn pending_otp(&self, id: CompanyId) -> Result<Option<OtpChallenge>, DbError> {
        self.db
            .run(async {
                let mut response = self
                    .db
                    .client()
                    .query("SELECT VALUE otp FROM ONLY type::thing('company', $id)")
                    .bind(("id", id.to_string()))
                    .await?;

                let challenge: Option<OtpChallenge> = response.take(0)?;
                Ok(challenge)
            })
            .await
    }

    /// Mark the company verified and clear the code, but only while the
    /// stored code is still `code`.
    ///
    /// Returns `None` when the code was replaced in the meantime.
    pub async fn mark_verified(&self, id: CompanyId, code: &str) -> Result<Option<Company>, DbError> {
        let code = code.to_string();

        self.db
            .run(async {
                let mut response = check(
                    self.db
                        .client()
                        .query(
                            r#"
                            UPDATE type::thing('company', $id)
                            SET verified = true, otp = NONE
                            WHERE otp.code = $code
                            RETURN AFTER
                            "#,
                        )
                        .bind(("id", id.to_string()))
                        .bind(("code", code))
                        .await?,
                )?;

                let records: Vec<CompanyRecord> = response.take(0)?;
                records
                    .into_iter()
                    .next()
                    .map(CompanyRecord::into_company)
                    .transpose()
            })
            .await
    }
}
