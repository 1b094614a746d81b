//! Student endpoints.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum_extra::extract::CookieJar;
use board_core::input::{LoginInput, StudentRegistration};
use board_core::{JobPage, PageQuery, PageRequest};
use chrono::Utc;
use serde_json::{Value, json};

use super::{cleared_session_cookie, session_cookie};
use crate::auth::StudentIdentity;
use crate::error::ApiResult;
use crate::extract::ValidJson;
use crate::services::{accounts, applications};
use crate::state::AppState;

/// POST /student/register
pub async fn register(
    State(state): State<AppState>,
    ValidJson(input): ValidJson<StudentRegistration>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let token = accounts::register_student(&state, input, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(json!({ "token": token }))))
}

/// POST /student/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidJson(input): ValidJson<LoginInput>,
) -> ApiResult<(CookieJar, Json<Value>)> {
    let (student, token) = accounts::login_student(&state, input, Utc::now()).await?;
    let jar = jar.add(session_cookie(token.clone(), state.config.is_production()));
    Ok((jar, Json(json!({ "user": student, "token": token }))))
}

/// GET /student/logout
pub async fn logout(
    State(state): State<AppState>,
    identity: StudentIdentity,
    jar: CookieJar,
) -> ApiResult<(CookieJar, Json<Value>)> {
    accounts::logout(&state, &identity.session).await?;
    let jar = jar.remove(cleared_session_cookie());
    Ok((jar, Json(json!({ "message": "Logged out successfully" }))))
}

/// GET /student/profile
pub async fn profile(identity: StudentIdentity) -> Json<Value> {
    Json(json!({ "student": identity.student }))
}

/// GET /student/jobs
pub async fn jobs(
    State(state): State<AppState>,
    identity: StudentIdentity,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<JobPage>> {
    let page = PageRequest::from_query(&query);
    let jobs = state.jobs.list_unapplied(identity.student.id, page).await?;
    Ok(Json(jobs))
}

/// GET /student/applied-jobs
pub async fn applied_jobs(
    State(state): State<AppState>,
    identity: StudentIdentity,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<JobPage>> {
    let page = PageRequest::from_query(&query);
    let jobs = state.jobs.list_applied(identity.student.id, page).await?;
    Ok(Json(jobs))
}

/// POST /student/apply-job/:job_id
pub async fn apply_job(
    State(state): State<AppState>,
    identity: StudentIdentity,
    Path(job_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let today = Utc::now().date_naive();
    applications::apply(&state, &identity.student, &job_id, today).await?;
    Ok(Json(json!({ "message": "Successfully applied to job" })))
}
