//! Session tokens and the authenticated-identity extractors.
//!
//! Tokens are HS256 JWTs carrying the account id and role. They are read from
//! the `token` cookie first and from `Authorization: Bearer` otherwise, and
//! every authenticated request checks them against the revoked-token table.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;
use board_core::{Company, CompanyId, Student, StudentId};
use chrono::{DateTime, TimeDelta, Utc};
use db::DbError;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Cookie holding the session token.
pub const TOKEN_COOKIE: &str = "token";

/// Account kind a token was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Company,
}

/// Decoded session token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account ID
    pub sub: String,
    pub role: Role,
    /// Issued at
    pub iat: i64,
    /// Expiration
    pub exp: i64,
}

/// Signing and verification keys for session tokens.
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: TimeDelta,
}

impl TokenKeys {
    pub fn new(secret: &str, ttl: TimeDelta) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    /// Issue a token for `sub` valid from `now` for the configured lifetime.
    pub fn issue(&self, sub: &str, role: Role, now: DateTime<Utc>) -> ApiResult<String> {
        let claims = Claims {
            sub: sub.to_string(),
            role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| ApiError::internal(format!("Failed to sign token: {}", e)))
    }

    /// Verify signature and expiry.
    pub fn verify(&self, token: &str) -> ApiResult<Claims> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Token rejected: {}", e);
                ApiError::unauthorized("Unauthorized")
            })
    }
}

/// Pull the session token from the cookie or the bearer header.
pub fn request_token(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(TOKEN_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// The token a request authenticated with, kept so logout can revoke it.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Check presence, revocation, signature, expiry and role.
async fn authenticate(parts: &Parts, state: &AppState, role: Role) -> ApiResult<(Claims, Session)> {
    let token = request_token(&parts.headers).ok_or_else(|| ApiError::unauthorized("Unauthorized"))?;

    if state.revoked.is_revoked(&token).await? {
        return Err(ApiError::unauthorized("Unauthorized, token has been revoked"));
    }

    let claims = state.tokens.verify(&token)?;
    if claims.role != role {
        return Err(ApiError::unauthorized("Unauthorized"));
    }

    let expires_at = DateTime::from_timestamp(claims.exp, 0).unwrap_or_else(Utc::now);
    Ok((claims, Session { token, expires_at }))
}

/// Authenticated student extracted from request.
#[derive(Debug, Clone)]
pub struct StudentIdentity {
    pub student: Student,
    pub session: Session,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for StudentIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let (claims, session) = authenticate(parts, state, Role::Student).await?;

        let id = StudentId::parse(&claims.sub).map_err(|_| ApiError::unauthorized("Unauthorized"))?;
        let student = state.students.get(id).await.map_err(|e| match e {
            DbError::NotFound(_) => ApiError::unauthorized("Student not found"),
            other => other.into(),
        })?;

        Ok(Self { student, session })
    }
}

/// Authenticated company extracted from request.
#[derive(Debug, Clone)]
pub struct CompanyIdentity {
    pub company: Company,
    pub session: Session,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for CompanyIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let (claims, session) = authenticate(parts, state, Role::Company).await?;

        let id = CompanyId::parse(&claims.sub).map_err(|_| ApiError::unauthorized("Unauthorized"))?;
        let company = state.companies.get(id).await.map_err(|e| match e {
            DbError::NotFound(_) => ApiError::unauthorized("Company not found"),
            other => other.into(),
        })?;

        Ok(Self { company, session })
    }
}
