//! Request-independent operations behind the handlers.
//!
//! Services take the clock as a parameter so deadline and expiry rules can be
//! exercised at fixed instants.

pub mod accounts;
pub mod applications;
pub mod postings;
pub mod verification;

use board_core::JobId;
use db::DbError;

use crate::error::ApiError;

/// Parse a job id from a path segment.
pub(crate) fn parse_job_id(raw: &str) -> Result<JobId, ApiError> {
    JobId::parse(raw).map_err(|_| ApiError::bad_request("Invalid job id"))
}

/// Map a store miss on a job lookup to the public "Job not found".
pub(crate) fn job_not_found(err: DbError) -> ApiError {
    match err {
        DbError::NotFound(_) => ApiError::not_found("Job not found"),
        other => other.into(),
    }
}
