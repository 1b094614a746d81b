//! Student repository.

use std::time::Duration;

use board_core::input::StudentRegistration;
use board_core::{JobId, Student, StudentId};
use serde::Deserialize;
use surrealdb::sql::Thing;

use super::{THROW_ALREADY_APPLIED, THROW_NOT_FOUND, check, record_key};
use crate::{Database, DbError};

/// Commit attempts for one application before a conflict is reported.
const APPLY_ATTEMPTS: u32 = 32;

/// Pause before a re-run, scaled by the attempt number.
const APPLY_BACKOFF: Duration = Duration::from_millis(2);

/// Repository for student persistence operations.
#[derive(Debug, Clone)]
pub struct StudentRepository {
    db: Database,
}

#[derive(Debug, Deserialize)]
struct StudentRecord {
    id: Thing,
    fullname: String,
    email: String,
    #[serde(default)]
    applied_jobs: Vec<Thing>,
}

impl StudentRecord {
    fn into_student(self) -> Result<Student, DbError> {
        Ok(Student {
            id: record_key(&self.id)?,
            fullname: self.fullname,
            email: self.email,
            applied_jobs: self
                .applied_jobs
                .iter()
                .map(record_key)
                .collect::<Result<Vec<JobId>, _>>()?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct CredentialRecord {
    id: Thing,
    password_hash: String,
}

impl StudentRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create a student account. `password_hash` must already be hashed.
    pub async fn create(
        &self,
        registration: &StudentRegistration,
        password_hash: String,
    ) -> Result<StudentId, DbError> {
        let id = StudentId::new();

        self.db
            .run(async {
                let response = self
                    .db
                    .client()
                    .query(
                        r#"
                        CREATE type::thing('student', $id) CONTENT {
                            fullname: $fullname,
                            email: $email,
                            password_hash: $password_hash,
                            applied_jobs: []
                        }
                        "#,
                    )
                    .bind(("id", id.to_string()))
                    .bind(("fullname", registration.fullname.clone()))
                    .bind(("email", registration.email.clone()))
                    .bind(("password_hash", password_hash))
                    .await?;
                check(response)?;
                Ok(())
            })
            .await?;

        tracing::debug!("Created student {}", id);

        Ok(id)
    }

    /// Check if any student already uses this email.
    pub async fn email_exists(&self, email: &str) -> Result<bool, DbError> {
        let email = email.to_string();

        self.db
            .run(async {
                let mut response = self
                    .db
                    .client()
                    .query("SELECT VALUE id FROM student WHERE email = $email LIMIT 1")
                    .bind(("email", email))
                    .await?;

                let ids: Vec<Thing> = response.take(0)?;
                Ok(!ids.is_empty())
            })
            .await
    }

    /// Get a student by ID. The password credential is never read.
    pub async fn get(&self, id: StudentId) -> Result<Student, DbError> {
        self.db
            .run(async {
                let mut response = self
                    .db
                    .client()
                    .query("SELECT * OMIT password_hash FROM ONLY type::thing('student', $id)")
                    .bind(("id", id.to_string()))
                    .await?;

                let record: Option<StudentRecord> = response.take(0)?;
                record
                    .ok_or_else(|| DbError::NotFound(format!("Student not found: {}", id)))?
                    .into_student()
            })
            .await
    }

    /// Look up the id and password hash for a login attempt.
    ///
    /// Emails are not unique for students; the oldest account wins.
    pub async fn find_credentials(
        &self,
        email: &str,
    ) -> Result<Option<(StudentId, String)>, DbError> {
        let email = email.to_string();

        self.db
            .run(async {
                let mut response = self
                    .db
                    .client()
                    .query(
                        r#"
                        SELECT id, password_hash, created_at FROM student
                        WHERE email = $email
                        ORDER BY created_at ASC
                        LIMIT 1
                        "#,
                    )
                    .bind(("email", email))
                    .await?;

                let records: Vec<CredentialRecord> = response.take(0)?;
                records
                    .into_iter()
                    .next()
                    .map(|r| Ok((record_key(&r.id)?, r.password_hash)))
                    .transpose()
            })
            .await
    }

    /// Record an application in one transaction.
    ///
    /// The job is added to the student's applied set and the student's email
    /// to the job's candidates, or neither happens. A missing job yields
    /// [`DbError::NotFound`] and a repeated application [`DbError::Conflict`].
    ///
    /// Applications racing on the same job or student lose the commit and are
    /// re-run, up to [`APPLY_ATTEMPTS`] times; the re-run sees the winner's
    /// writes, so a concurrent duplicate ends as [`DbError::Conflict`].
    pub async fn apply_to_job(&self, student: StudentId, job: JobId) -> Result<(), DbError> {
        self.db
            .run(async {
                let mut attempt = 1;
                loop {
                    match self.try_apply(student, job).await {
                        Err(DbError::TransactionConflict(message)) if attempt < APPLY_ATTEMPTS => {
                            tracing::debug!(
                                "Retrying application of student {} to job {} (attempt {}): {}",
                                student,
                                job,
                                attempt,
                                message
                            );
                            tokio::time::sleep(APPLY_BACKOFF * attempt).await;
                            attempt += 1;
                        }
                        other => return other,
                    }
                }
            })
            .await?;

        tracing::debug!("Student {} applied to job {}", student, job);

        Ok(())
    }

    async fn try_apply(&self, student: StudentId, job: JobId) -> Result<(), DbError> {
        let response = self
            .db
            .client()
            .query(format!(
                r#"
                BEGIN TRANSACTION;
                LET $student = type::thing('student', $student_id);
                LET $job = type::thing('job', $job_id);
                IF !record::exists($job) {{ THROW "{THROW_NOT_FOUND}: job" }};
                IF !record::exists($student) {{ THROW "{THROW_NOT_FOUND}: student" }};
                IF (SELECT VALUE applied_jobs FROM ONLY $student) CONTAINS $job {{
                    THROW "{THROW_ALREADY_APPLIED}"
                }};
                LET $email = (SELECT VALUE email FROM ONLY $student);
                UPDATE $student SET applied_jobs = array::union(applied_jobs, [$job]);
                UPDATE $job SET candidates = array::union(candidates, [$email]);
                COMMIT TRANSACTION;
                "#
            ))
            .bind(("student_id", student.to_string()))
            .bind(("job_id", job.to_string()))
            .await?;
        check(response)?;
        Ok(())
    }
}
