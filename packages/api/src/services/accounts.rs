//! Registration, login and logout for students and companies.

use board_core::input::{CompanyRegistration, LoginInput, StudentRegistration, validate_input};
use board_core::Student;
use chrono::{DateTime, Utc};
use db::DbError;

use crate::auth::{Role, Session};
use crate::error::{ApiError, ApiResult};
use crate::password::{hash_password, verify_password};
use crate::state::AppState;

/// Register a student and issue a session token.
///
/// Student emails carry no unique index; the existence check is the only
/// guard against duplicates.
pub async fn register_student(
    state: &AppState,
    input: StudentRegistration,
    now: DateTime<Utc>,
) -> ApiResult<String> {
    let input = input.normalized();
    validate_input(&input)?;

    if state.students.email_exists(&input.email).await? {
        return Err(ApiError::bad_request("User already exist"));
    }

    let password_hash = hash_password(input.password.clone()).await?;
    let id = state.students.create(&input, password_hash).await?;

    tracing::info!("Registered student {}", id);

    state.tokens.issue(&id.to_string(), Role::Student, now)
}

/// Check student credentials and issue a session token.
pub async fn login_student(
    state: &AppState,
    input: LoginInput,
    now: DateTime<Utc>,
) -> ApiResult<(Student, String)> {
    validate_input(&input)?;
    let invalid = || ApiError::unauthorized("Invalid email or password");

    let (id, password_hash) = state
        .students
        .find_credentials(input.email.trim())
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(input.password, password_hash).await? {
        return Err(invalid());
    }

    let student = state.students.get(id).await?;
    let token = state.tokens.issue(&id.to_string(), Role::Student, now)?;
    Ok((student, token))
}

/// Register a company and issue a session token.
///
/// The unique index on company emails settles concurrent registrations.
pub async fn register_company(
    state: &AppState,
    input: CompanyRegistration,
    now: DateTime<Utc>,
) -> ApiResult<String> {
    let input = input.normalized();
    validate_input(&input)?;

    let password_hash = hash_password(input.password.clone()).await?;
    let id = match state.companies.create(&input, password_hash).await {
        Ok(id) => id,
        Err(DbError::Conflict(_)) => return Err(ApiError::bad_request("Company already exists")),
        Err(e) => return Err(e.into()),
    };

    tracing::info!("Registered company {}", id);

    state.tokens.issue(&id.to_string(), Role::Company, now)
}

/// Check company credentials and issue a session token.
pub async fn login_company(
    state: &AppState,
    input: LoginInput,
    now: DateTime<Utc>,
) -> ApiResult<String> {
    validate_input(&input)?;
    let invalid = || ApiError::unauthorized("Invalid credentials");

    let email = input.email.trim().to_lowercase();
    let (id, password_hash) = state
        .companies
        .find_credentials(&email)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(input.password, password_hash).await? {
        return Err(invalid());
    }

    state.tokens.issue(&id.to_string(), Role::Company, now)
}

/// Revoke the token the request authenticated with.
pub async fn logout(state: &AppState, session: &Session) -> ApiResult<()> {
    state.revoked.revoke(&session.token, session.expires_at).await?;
    Ok(())
}
