//! Database schema definitions using SurrealQL.

use crate::{Database, DbError};

/// Initialize the database schema.
///
/// This creates all necessary tables, fields, and indexes. Every statement
/// is idempotent, so it is safe to run on each startup.
pub async fn init_schema(db: &Database) -> Result<(), DbError> {
    tracing::info!("Initializing database schema...");

    db.run(async {
        // Company table
        db.client().query(COMPANY_SCHEMA).await?.check()?;

        // Student table
        db.client().query(STUDENT_SCHEMA).await?.check()?;

        // Job table
        db.client().query(JOB_SCHEMA).await?.check()?;

        // Logged-out tokens
        db.client().query(REVOKED_TOKEN_SCHEMA).await?.check()?;

        Ok(())
    })
    .await?;

    tracing::info!("Database schema initialized");

    Ok(())
}

/// Company table schema.
const COMPANY_SCHEMA: &str = r#"
DEFINE TABLE IF NOT EXISTS company SCHEMAFULL;

DEFINE FIELD IF NOT EXISTS name ON company TYPE string;
DEFINE FIELD IF NOT EXISTS email ON company TYPE string;
DEFINE FIELD IF NOT EXISTS mobile ON company TYPE option<string>;
DEFINE FIELD IF NOT EXISTS password_hash ON company TYPE string;
DEFINE FIELD IF NOT EXISTS posted_jobs ON company TYPE array<record<job>> DEFAULT [];
DEFINE FIELD IF NOT EXISTS verified ON company TYPE bool DEFAULT false;
-- Pending verification code; code and expiry are written and cleared together
DEFINE FIELD IF NOT EXISTS otp ON company FLEXIBLE TYPE option<object>;
DEFINE FIELD IF NOT EXISTS created_at ON company TYPE datetime DEFAULT time::now();

DEFINE INDEX IF NOT EXISTS company_email ON company FIELDS email UNIQUE;
"#;

/// Student table schema.
const STUDENT_SCHEMA: &str = r#"
DEFINE TABLE IF NOT EXISTS student SCHEMAFULL;

DEFINE FIELD IF NOT EXISTS fullname ON student TYPE string;
DEFINE FIELD IF NOT EXISTS email ON student TYPE string;
DEFINE FIELD IF NOT EXISTS password_hash ON student TYPE string;
DEFINE FIELD IF NOT EXISTS applied_jobs ON student TYPE array<record<job>> DEFAULT [];
DEFINE FIELD IF NOT EXISTS created_at ON student TYPE datetime DEFAULT time::now();

-- Not unique: duplicate registration is rejected by a pre-check only
DEFINE INDEX IF NOT EXISTS student_email ON student FIELDS email;
DEFINE INDEX IF NOT EXISTS student_applied ON student FIELDS applied_jobs;
"#;

/// Job table schema.
const JOB_SCHEMA: &str = r#"
DEFINE TABLE IF NOT EXISTS job SCHEMAFULL;

DEFINE FIELD IF NOT EXISTS title ON job TYPE string;
DEFINE FIELD IF NOT EXISTS description ON job TYPE string;
DEFINE FIELD IF NOT EXISTS experience_level ON job TYPE string
    ASSERT $value INSIDE ["BEGINNER", "INTERMEDIATE", "EXPERT"];
DEFINE FIELD IF NOT EXISTS company ON job TYPE record<company>;
DEFINE FIELD IF NOT EXISTS candidates ON job TYPE array<string> DEFAULT [];
DEFINE FIELD IF NOT EXISTS emails ON job TYPE array<string> DEFAULT [];
-- Calendar date, YYYY-MM-DD
DEFINE FIELD IF NOT EXISTS end_date ON job TYPE option<string>;
DEFINE FIELD IF NOT EXISTS created_at ON job TYPE datetime DEFAULT time::now();

DEFINE INDEX IF NOT EXISTS job_company ON job FIELDS company;
DEFINE INDEX IF NOT EXISTS job_created ON job FIELDS created_at;
"#;

/// Revoked token table schema. Record ids are token digests.
const REVOKED_TOKEN_SCHEMA: &str = r#"
DEFINE TABLE IF NOT EXISTS revoked_token SCHEMAFULL;

DEFINE FIELD IF NOT EXISTS expires_at ON revoked_token TYPE datetime;
DEFINE FIELD IF NOT EXISTS revoked_at ON revoked_token TYPE datetime DEFAULT time::now();

DEFINE INDEX IF NOT EXISTS revoked_token_expiry ON revoked_token FIELDS expires_at;
"#;
