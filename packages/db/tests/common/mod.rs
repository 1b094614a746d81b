#![allow(dead_code)]

use board_core::input::{CompanyRegistration, NewJob, StudentRegistration};
use board_core::{CompanyId, ExperienceLevel, StudentId};
use chrono::NaiveDate;

use db::repositories::{CompanyRepository, JobRepository, StudentRepository};
use db::{Database, DbError};

/// Every call opens a separate in-memory store, so tests never share state.
pub async fn setup_db() -> Result<Database, DbError> {
    Database::memory().await
}

pub async fn company(db: &Database, email: &str) -> Result<CompanyId, DbError> {
    let registration = CompanyRegistration {
        companyname: "Acme Corp".into(),
        email: email.into(),
        password: "secret1".into(),
        mobile: "+15550001".into(),
    };
    CompanyRepository::new(db.clone())
        .create(&registration, "hash".into())
        .await
}

pub async fn student(db: &Database, email: &str) -> Result<StudentId, DbError> {
    let registration = StudentRegistration {
        fullname: format!("Student {email}"),
        email: email.into(),
        password: "secret1".into(),
    };
    StudentRepository::new(db.clone())
        .create(&registration, "hash".into())
        .await
}

pub fn new_job(title: &str) -> NewJob {
    NewJob {
        title: title.into(),
        description: format!("{title} description"),
        experience_level: ExperienceLevel::Intermediate,
        end_date: NaiveDate::from_ymd_opt(2030, 1, 1),
        emails: vec![],
    }
}

/// Post `count` jobs for a company, returning them oldest first.
pub async fn post_jobs(
    db: &Database,
    company: CompanyId,
    count: usize,
) -> Result<Vec<board_core::Job>, DbError> {
    let jobs = JobRepository::new(db.clone());
    let mut posted = Vec::with_capacity(count);
    for i in 0..count {
        posted.push(jobs.create(company, &new_job(&format!("Job {i}"))).await?);
    }
    Ok(posted)
}
