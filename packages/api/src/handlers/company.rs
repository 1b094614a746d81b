//! Company endpoints.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum_extra::extract::CookieJar;
use board_core::input::{
    CompanyRegistration, JobUpdateInput, LoginInput, NewJobInput, OtpSubmission,
    OutboundEmailInput, ProfileUpdate, validate_input,
};
use board_core::{CompanyProfile, JobPage, PageQuery, PageRequest, VerificationState};
use chrono::Utc;
use db::DbError;
use serde_json::{Value, json};

use super::{cleared_session_cookie, session_cookie};
use crate::auth::CompanyIdentity;
use crate::error::{ApiError, ApiResult};
use crate::extract::ValidJson;
use crate::services::{accounts, job_not_found, parse_job_id, postings, verification};
use crate::state::AppState;

/// POST /company/register
pub async fn register(
    State(state): State<AppState>,
    ValidJson(input): ValidJson<CompanyRegistration>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let token = accounts::register_company(&state, input, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(json!({ "token": token }))))
}

/// POST /company/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidJson(input): ValidJson<LoginInput>,
) -> ApiResult<(CookieJar, Json<Value>)> {
    let token = accounts::login_company(&state, input, Utc::now()).await?;
    let jar = jar.add(session_cookie(token.clone(), state.config.is_production()));
    Ok((jar, Json(json!({ "token": token }))))
}

/// GET /company/logout
pub async fn logout(
    State(state): State<AppState>,
    identity: CompanyIdentity,
    jar: CookieJar,
) -> ApiResult<(CookieJar, Json<Value>)> {
    accounts::logout(&state, &identity.session).await?;
    let jar = jar.remove(cleared_session_cookie());
    Ok((jar, Json(json!({ "message": "Logged out successfully" }))))
}

/// POST /company/send-verification
pub async fn send_verification(
    State(state): State<AppState>,
    identity: CompanyIdentity,
) -> ApiResult<Json<Value>> {
    verification::send_otp(&state, &identity.company, Utc::now()).await?;
    Ok(Json(json!({ "message": "OTP sent successfully" })))
}

/// POST /company/verify-otp
pub async fn verify_otp(
    State(state): State<AppState>,
    identity: CompanyIdentity,
    ValidJson(input): ValidJson<OtpSubmission>,
) -> ApiResult<Json<Value>> {
    validate_input(&input)?;
    let company =
        verification::verify_otp(&state, identity.company.id, &input.otp, Utc::now()).await?;
    Ok(Json(json!({ "company": company })))
}

/// POST /company/jobs
pub async fn create_job(
    State(state): State<AppState>,
    identity: CompanyIdentity,
    ValidJson(input): ValidJson<NewJobInput>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let new_job = input.into_new_job()?;
    let job = postings::create_job(&state, &identity.company, new_job).await?;
    Ok((StatusCode::CREATED, Json(json!({ "job": job }))))
}

/// GET /company/jobs
pub async fn list_jobs(
    State(state): State<AppState>,
    identity: CompanyIdentity,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<JobPage>> {
    let page = PageRequest::from_query(&query);
    let jobs = state.jobs.list_for_company(identity.company.id, page).await?;
    Ok(Json(jobs))
}

/// GET /company/jobs/:job_id
pub async fn get_job(
    State(state): State<AppState>,
    identity: CompanyIdentity,
    Path(job_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let job_id = parse_job_id(&job_id)?;
    let job = state
        .jobs
        .get_owned(job_id, identity.company.id)
        .await
        .map_err(job_not_found)?;
    Ok(Json(json!({ "job": job })))
}

/// PUT /company/jobs/:job_id
pub async fn update_job(
    State(state): State<AppState>,
    identity: CompanyIdentity,
    Path(job_id): Path<String>,
    ValidJson(input): ValidJson<JobUpdateInput>,
) -> ApiResult<Json<Value>> {
    let job_id = parse_job_id(&job_id)?;
    let update = input.into_update()?;
    let job = state
        .jobs
        .update(job_id, identity.company.id, &update)
        .await
        .map_err(job_not_found)?;
    Ok(Json(json!({ "job": job })))
}

/// DELETE /company/jobs/:job_id
pub async fn delete_job(
    State(state): State<AppState>,
    identity: CompanyIdentity,
    Path(job_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let job_id = parse_job_id(&job_id)?;
    state
        .jobs
        .delete(job_id, identity.company.id)
        .await
        .map_err(job_not_found)?;
    Ok(Json(json!({ "message": "Job deleted successfully" })))
}

/// GET /company/jobs/:job_id/applicants
pub async fn applicants(
    State(state): State<AppState>,
    identity: CompanyIdentity,
    Path(job_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let job_id = parse_job_id(&job_id)?;
    state
        .jobs
        .get_owned(job_id, identity.company.id)
        .await
        .map_err(job_not_found)?;

    let applicants = state.jobs.applicants(job_id).await?;
    Ok(Json(json!({ "applicants": applicants })))
}

/// GET /company/profile
pub async fn profile(
    State(state): State<AppState>,
    identity: CompanyIdentity,
) -> ApiResult<Json<Value>> {
    let posted = state.jobs.all_for_company(identity.company.id).await?;
    let pending = state.companies.pending_otp(identity.company.id).await?;
    let verification =
        VerificationState::of(identity.company.verified, pending.as_ref(), Utc::now());

    let company = CompanyProfile::new(identity.company, posted);
    Ok(Json(json!({ "company": company, "verification": verification })))
}

/// PUT /company/profile
pub async fn update_profile(
    State(state): State<AppState>,
    identity: CompanyIdentity,
    ValidJson(input): ValidJson<ProfileUpdate>,
) -> ApiResult<Json<Value>> {
    let input = input.normalized();
    validate_input(&input)?;

    let company = match state.companies.update_profile(identity.company.id, &input).await {
        Ok(company) => company,
        Err(DbError::Conflict(_)) => return Err(ApiError::bad_request("Company already exists")),
        Err(e) => return Err(e.into()),
    };
    Ok(Json(json!({ "company": company })))
}

/// POST /company/send-email
pub async fn send_email(
    State(state): State<AppState>,
    identity: CompanyIdentity,
    ValidJson(input): ValidJson<OutboundEmailInput>,
) -> ApiResult<Json<Value>> {
    let report = postings::send_email(&state, &identity.company, input).await?;
    let message = if report.all_sent() {
        "Emails sent successfully"
    } else {
        "Some emails could not be sent"
    };
    Ok(Json(json!({ "message": message, "report": report })))
}
