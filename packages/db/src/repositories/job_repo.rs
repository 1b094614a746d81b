//! Job repository: postings, listings and the per-student partition.

use board_core::input::{JobUpdate, NewJob};
use board_core::{Applicant, CompanyId, ExperienceLevel, Job, JobId, JobPage, PageRequest, StudentId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use surrealdb::sql::Thing;

use super::{THROW_NOT_FOUND, check, record_key, take_total};
use crate::{Database, DbError};

/// Repository for job persistence operations.
#[derive(Debug, Clone)]
pub struct JobRepository {
    db: Database,
}

/// Internal record type for SurrealDB.
#[derive(Debug, Deserialize)]
struct JobRecord {
    id: Thing,
    title: String,
    description: String,
    experience_level: ExperienceLevel,
    company: Thing,
    #[serde(default)]
    candidates: Vec<String>,
    #[serde(default)]
    emails: Vec<String>,
    end_date: Option<NaiveDate>,
    created_at: DateTime<Utc>,
}

impl JobRecord {
    fn into_job(self) -> Result<Job, DbError> {
        Ok(Job {
            id: record_key(&self.id)?,
            title: self.title,
            description: self.description,
            experience_level: self.experience_level,
            company: record_key(&self.company)?,
            candidates: self.candidates,
            emails: self.emails,
            end_date: self.end_date,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ApplicantRecord {
    id: Thing,
    fullname: String,
    email: String,
}

fn into_jobs(records: Vec<JobRecord>) -> Result<Vec<Job>, DbError> {
    records.into_iter().map(JobRecord::into_job).collect()
}

fn date_string(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Which side of a student's applied set a listing shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Applied,
    NotApplied,
}

impl JobRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create a job owned by `company` and record it on the company.
    ///
    /// Both writes happen in one transaction.
    pub async fn create(&self, company: CompanyId, job: &NewJob) -> Result<Job, DbError> {
        let id = JobId::new();

        self.db
            .run(async {
                let response = self
                    .db
                    .client()
                    .query(format!(
                        r#"
                        BEGIN TRANSACTION;
                        LET $company = type::thing('company', $company_id);
                        IF !record::exists($company) {{ THROW "{THROW_NOT_FOUND}: company" }};
                        CREATE type::thing('job', $id) CONTENT {{
                            title: $title,
                            description: $description,
                            experience_level: $experience_level,
                            company: $company,
                            candidates: [],
                            emails: $emails,
                            end_date: $end_date
                        }};
                        UPDATE $company SET posted_jobs = array::union(posted_jobs, [type::thing('job', $id)]);
                        COMMIT TRANSACTION;
                        "#
                    ))
                    .bind(("company_id", company.to_string()))
                    .bind(("id", id.to_string()))
                    .bind(("title", job.title.clone()))
                    .bind(("description", job.description.clone()))
                    .bind(("experience_level", job.experience_level.as_str()))
                    .bind(("emails", job.emails.clone()))
                    .bind(("end_date", job.end_date.map(date_string)))
                    .await?;
                check(response)?;
                Ok(())
            })
            .await?;

        tracing::debug!("Created job {} for company {}", id, company);

        self.get(id).await
    }

    /// Get a job by ID.
    pub async fn get(&self, id: JobId) -> Result<Job, DbError> {
        self.db
            .run(async {
                let record: Option<JobRecord> =
                    self.db.client().select(("job", id.to_string())).await?;

                record
                    .ok_or_else(|| DbError::NotFound(format!("Job not found: {}", id)))?
                    .into_job()
            })
            .await
    }

    /// Get a job only if `company` owns it.
    pub async fn get_owned(&self, id: JobId, company: CompanyId) -> Result<Job, DbError> {
        let job = self.get(id).await?;
        if job.company != company {
            return Err(DbError::NotFound(format!("Job not found: {}", id)));
        }
        Ok(job)
    }

    /// All jobs posted by a company, newest first.
    pub async fn all_for_company(&self, company: CompanyId) -> Result<Vec<Job>, DbError> {
        self.db
            .run(async {
                let mut response = self
                    .db
                    .client()
                    .query(
                        r#"
                        SELECT * FROM job
                        WHERE company = type::thing('company', $company_id)
                        ORDER BY created_at DESC, id DESC
                        "#,
                    )
                    .bind(("company_id", company.to_string()))
                    .await?;

                let records: Vec<JobRecord> = response.take(0)?;
                into_jobs(records)
            })
            .await
    }

    /// One page of a company's jobs, newest first.
    pub async fn list_for_company(
        &self,
        company: CompanyId,
        page: PageRequest,
    ) -> Result<JobPage, DbError> {
        self.db
            .run(async {
                let response = self
                    .db
                    .client()
                    .query(
                        r#"
                        SELECT * FROM job
                        WHERE company = type::thing('company', $company_id)
                        ORDER BY created_at DESC, id DESC
                        LIMIT $limit START $start;
                        SELECT count() AS total FROM job
                        WHERE company = type::thing('company', $company_id)
                        GROUP ALL;
                        "#,
                    )
                    .bind(("company_id", company.to_string()))
                    .bind(("limit", page.limit))
                    .bind(("start", page.offset() as i64))
                    .await?;
                let mut response = check(response)?;

                let records: Vec<JobRecord> = response.take(0)?;
                let total = take_total(&mut response, 1)?;
                Ok(JobPage::new(into_jobs(records)?, page, total))
            })
            .await
    }

    /// One page of the jobs the student has applied to.
    pub async fn list_applied(
        &self,
        student: StudentId,
        page: PageRequest,
    ) -> Result<JobPage, DbError> {
        self.list_partition(student, page, Side::Applied).await
    }

    /// One page of the jobs the student has not applied to yet.
    pub async fn list_unapplied(
        &self,
        student: StudentId,
        page: PageRequest,
    ) -> Result<JobPage, DbError> {
        self.list_partition(student, page, Side::NotApplied).await
    }

    /// Page through one side of the student's applied set.
    ///
    /// The set is resolved inside the store so it is never loaded here, and
    /// the page and its total come from the same round trip.
    async fn list_partition(
        &self,
        student: StudentId,
        page: PageRequest,
        side: Side,
    ) -> Result<JobPage, DbError> {
        let operator = match side {
            Side::Applied => "INSIDE",
            Side::NotApplied => "NOTINSIDE",
        };

        self.db
            .run(async {
                let response = self
                    .db
                    .client()
                    .query(format!(
                        r#"
                        LET $applied = (SELECT VALUE applied_jobs FROM ONLY type::thing('student', $student_id)) ?? [];
                        SELECT * FROM job
                        WHERE id {operator} $applied
                        ORDER BY created_at DESC, id DESC
                        LIMIT $limit START $start;
                        SELECT count() AS total FROM job
                        WHERE id {operator} $applied
                        GROUP ALL;
                        "#
                    ))
                    .bind(("student_id", student.to_string()))
                    .bind(("limit", page.limit))
                    .bind(("start", page.offset() as i64))
                    .await?;
                let mut response = check(response)?;

                let records: Vec<JobRecord> = response.take(1)?;
                let total = take_total(&mut response, 2)?;
                Ok(JobPage::new(into_jobs(records)?, page, total))
            })
            .await
    }

    /// Apply a partial update to a job owned by `company`.
    pub async fn update(
        &self,
        id: JobId,
        company: CompanyId,
        update: &JobUpdate,
    ) -> Result<Job, DbError> {
        if update.is_empty() {
            return self.get_owned(id, company).await;
        }

        let mut assignments = Vec::new();
        if update.title.is_some() {
            assignments.push("title = $title");
        }
        if update.description.is_some() {
            assignments.push("description = $description");
        }
        if update.experience_level.is_some() {
            assignments.push("experience_level = $experience_level");
        }
        if update.end_date.is_some() {
            assignments.push("end_date = $end_date");
        }
        if update.emails.is_some() {
            assignments.push("emails = $emails");
        }

        let query = format!(
            "UPDATE type::thing('job', $id) SET {} WHERE company = type::thing('company', $company_id) RETURN AFTER",
            assignments.join(", ")
        );

        self.db
            .run(async {
                let mut request = self
                    .db
                    .client()
                    .query(&query)
                    .bind(("id", id.to_string()))
                    .bind(("company_id", company.to_string()));

                if let Some(title) = &update.title {
                    request = request.bind(("title", title.clone()));
                }
                if let Some(description) = &update.description {
                    request = request.bind(("description", description.clone()));
                }
                if let Some(level) = update.experience_level {
                    request = request.bind(("experience_level", level.as_str()));
                }
                if let Some(end_date) = update.end_date {
                    request = request.bind(("end_date", date_string(end_date)));
                }
                if let Some(emails) = &update.emails {
                    request = request.bind(("emails", emails.clone()));
                }

                let mut response = check(request.await?)?;
                let records: Vec<JobRecord> = response.take(0)?;

                records
                    .into_iter()
                    .next()
                    .ok_or_else(|| DbError::NotFound(format!("Job not found: {}", id)))?
                    .into_job()
            })
            .await
    }

    /// Delete a job owned by `company` and drop it from the company's list.
    pub async fn delete(&self, id: JobId, company: CompanyId) -> Result<(), DbError> {
        self.db
            .run(async {
                let response = self
                    .db
                    .client()
                    .query(format!(
                        r#"
                        BEGIN TRANSACTION;
                        LET $job = type::thing('job', $id);
                        LET $company = type::thing('company', $company_id);
                        IF (SELECT VALUE company FROM ONLY $job) != $company {{ THROW "{THROW_NOT_FOUND}: job" }};
                        DELETE $job;
                        UPDATE $company SET posted_jobs -= $job;
                        COMMIT TRANSACTION;
                        "#
                    ))
                    .bind(("id", id.to_string()))
                    .bind(("company_id", company.to_string()))
                    .await?;
                check(response)?;
                Ok(())
            })
            .await?;

        tracing::debug!("Deleted job {} of company {}", id, company);

        Ok(())
    }

    /// Students who applied to a job.
    pub async fn applicants(&self, id: JobId) -> Result<Vec<Applicant>, DbError> {
        self.db
            .run(async {
                let mut response = self
                    .db
                    .client()
                    .query(
                        r#"
                        SELECT id, fullname, email FROM student
                        WHERE applied_jobs CONTAINS type::thing('job', $id)
                        ORDER BY fullname ASC
                        "#,
                    )
                    .bind(("id", id.to_string()))
                    .await?;

                let records: Vec<ApplicantRecord> = response.take(0)?;
                records
                    .into_iter()
                    .map(|r| {
                        Ok(Applicant {
                            id: record_key(&r.id)?,
                            fullname: r.fullname,
                            email: r.email,
                        })
                    })
                    .collect()
            })
            .await
    }
}
