//! Students applying to jobs.

use board_core::Student;
use chrono::NaiveDate;
use db::DbError;

use super::{job_not_found, parse_job_id};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Apply `student` to the job named by `raw_job_id`.
///
/// Checks run in order: id syntax, existence, deadline (inclusive of the end
/// date, compared against `today` in UTC), then duplicate application. The
/// store repeats the existence and duplicate checks inside the transaction
/// that writes both sides.
pub async fn apply(
    state: &AppState,
    student: &Student,
    raw_job_id: &str,
    today: NaiveDate,
) -> ApiResult<()> {
    let job_id = parse_job_id(raw_job_id)?;
    let job = state.jobs.get(job_id).await.map_err(job_not_found)?;

    if job.deadline_passed(today) {
        return Err(ApiError::bad_request("Job application deadline has passed"));
    }

    if student.has_applied(job_id) {
        return Err(ApiError::bad_request("Already applied to this job"));
    }

    match state.students.apply_to_job(student.id, job_id).await {
        Ok(()) => {
            tracing::info!("Student {} applied to job {}", student.id, job_id);
            Ok(())
        }
        Err(DbError::Conflict(_)) => Err(ApiError::bad_request("Already applied to this job")),
        Err(e) => Err(job_not_found(e)),
    }
}
