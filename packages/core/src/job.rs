//! Job posting domain types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{CompanyId, JobId};

/// Experience level a posting is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExperienceLevel {
    Beginner,
    Intermediate,
    Expert,
}

impl ExperienceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceLevel::Beginner => "BEGINNER",
            ExperienceLevel::Intermediate => "INTERMEDIATE",
            ExperienceLevel::Expert => "EXPERT",
        }
    }

    /// Parse the wire form (`BEGINNER`, `INTERMEDIATE`, `EXPERT`).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "BEGINNER" => Some(ExperienceLevel::Beginner),
            "INTERMEDIATE" => Some(ExperienceLevel::Intermediate),
            "EXPERT" => Some(ExperienceLevel::Expert),
            _ => None,
        }
    }
}

impl std::fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A job posting owned by a company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// Unique identifier for this job.
    pub id: JobId,
    pub title: String,
    pub description: String,
    pub experience_level: ExperienceLevel,
    /// The company that posted the job.
    pub company: CompanyId,
    /// Emails of students who applied. Set semantics.
    #[serde(default)]
    pub candidates: Vec<String>,
    /// Addresses notified when the job is posted.
    #[serde(default)]
    pub emails: Vec<String>,
    /// Last day applications are accepted.
    pub end_date: Option<NaiveDate>,
    /// When the job was created.
    pub created_at: DateTime<Utc>,
}

impl Job {
    /// Whether the application deadline lies strictly before `today`.
    ///
    /// Applying on the deadline day itself is still allowed.
    pub fn deadline_passed(&self, today: NaiveDate) -> bool {
        self.end_date.is_some_and(|end| end < today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(end_date: Option<NaiveDate>) -> Job {
        Job {
            id: JobId::new(),
            title: "Rust developer".into(),
            description: "Build services".into(),
            experience_level: ExperienceLevel::Intermediate,
            company: CompanyId::new(),
            candidates: vec![],
            emails: vec![],
            end_date,
            created_at: Utc::now(),
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn deadline_is_inclusive_of_end_date() {
        let j = job(Some(date("2024-05-10")));
        assert!(!j.deadline_passed(date("2024-05-09")));
        assert!(!j.deadline_passed(date("2024-05-10")));
        assert!(j.deadline_passed(date("2024-05-11")));
    }

    #[test]
    fn job_without_deadline_never_closes() {
        assert!(!job(None).deadline_passed(date("2999-01-01")));
    }

    #[test]
    fn experience_level_uses_upper_case_wire_names() {
        let json = serde_json::to_string(&ExperienceLevel::Expert).unwrap();
        assert_eq!(json, "\"EXPERT\"");
        assert_eq!(ExperienceLevel::parse("BEGINNER"), Some(ExperienceLevel::Beginner));
        assert_eq!(ExperienceLevel::parse("beginner"), None);
    }

    #[test]
    fn job_serializes_camel_case() {
        let value = serde_json::to_value(job(Some(date("2020-01-01")))).unwrap();
        assert_eq!(value["experienceLevel"], "INTERMEDIATE");
        assert_eq!(value["endDate"], "2020-01-01");
        assert!(value.get("createdAt").is_some());
    }
}
