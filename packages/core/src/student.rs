//! Student account domain types.

use serde::{Deserialize, Serialize};

use crate::{JobId, StudentId};

/// A student account as returned by read queries.
///
/// The password credential never leaves the store layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: StudentId,
    pub fullname: String,
    pub email: String,
    /// Jobs this student has applied to. Set semantics.
    #[serde(default)]
    pub applied_jobs: Vec<JobId>,
}

impl Student {
    pub fn has_applied(&self, job_id: JobId) -> bool {
        self.applied_jobs.contains(&job_id)
    }
}

/// Minimal applicant view shown to the owning company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Applicant {
    pub id: StudentId,
    pub fullname: String,
    pub email: String,
}
