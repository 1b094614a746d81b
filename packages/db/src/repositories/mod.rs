//! Repository implementations for database operations.

mod company_repo;
mod job_repo;
mod revoked_token_repo;
mod student_repo;

pub use company_repo::CompanyRepository;
pub use job_repo::JobRepository;
pub use revoked_token_repo::RevokedTokenRepository;
pub use student_repo::StudentRepository;

use std::str::FromStr;

use serde::Deserialize;
use surrealdb::Response;
use surrealdb::sql::Thing;

use crate::DbError;
use crate::connection::is_retryable;

/// Marker thrown inside transactions when a referenced record is missing.
pub(crate) const THROW_NOT_FOUND: &str = "record-not-found";

/// Marker thrown when a student applies to the same job twice.
pub(crate) const THROW_ALREADY_APPLIED: &str = "already-applied";

/// Result row of a `count() ... GROUP ALL` query.
#[derive(Debug, Deserialize)]
pub(crate) struct CountRecord {
    pub total: i64,
}

/// Take the total from a `GROUP ALL` count. A missing row counts as zero.
pub(crate) fn take_total(response: &mut Response, index: usize) -> Result<u64, DbError> {
    let rows: Vec<CountRecord> = response.take(index)?;
    Ok(rows.first().map_or(0, |row| row.total.max(0) as u64))
}

/// Turn per-statement errors of a multi-statement query into a [`DbError`].
///
/// Statements skipped because an earlier one failed the transaction report
/// a generic error; the statement that actually failed is preferred.
pub(crate) fn check(mut response: Response) -> Result<Response, DbError> {
    let errors = response.take_errors();
    if errors.is_empty() {
        return Ok(response);
    }

    let mut errors: Vec<(usize, String)> = errors
        .into_iter()
        .map(|(index, err)| (index, err.to_string()))
        .collect();
    errors.sort_by_key(|(index, _)| *index);

    let message = errors
        .iter()
        .map(|(_, message)| message)
        .find(|message| !message.contains("failed transaction"))
        .or_else(|| errors.first().map(|(_, message)| message))
        .cloned()
        .unwrap_or_default();

    Err(if message.contains(THROW_ALREADY_APPLIED) {
        DbError::Conflict("Already applied to this job".into())
    } else if message.contains(THROW_NOT_FOUND) {
        DbError::NotFound(message)
    } else if message.contains("already contains") {
        DbError::Conflict(message)
    } else if is_retryable(&message) {
        DbError::TransactionConflict(message)
    } else {
        DbError::Query(message)
    })
}

/// Parse the key of a record id into a typed identifier.
pub(crate) fn record_key<T: FromStr>(thing: &Thing) -> Result<T, DbError> {
    let raw = thing.id.to_raw();
    raw.parse()
        .map_err(|_| DbError::Serialization(format!("Unexpected record id: {}", thing)))
}
