//! Company account domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CompanyId, Job, JobId};

/// A company account as returned by profile reads.
///
/// Neither the password credential nor a pending verification code is part
/// of this type; both are only reachable through dedicated store calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(default)]
    pub posted_jobs: Vec<JobId>,
    /// Whether the company proved ownership of its email address.
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

/// Company profile with its posted jobs expanded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    pub id: CompanyId,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    pub posted_jobs: Vec<Job>,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

impl CompanyProfile {
    pub fn new(company: Company, posted_jobs: Vec<Job>) -> Self {
        Self {
            id: company.id,
            name: company.name,
            email: company.email,
            mobile: company.mobile,
            posted_jobs,
            verified: company.verified,
            created_at: company.created_at,
        }
    }
}
