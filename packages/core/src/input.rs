//! Typed request inputs and their validation pass.
//!
//! Inputs are deserialized leniently (missing fields become empty values) and
//! then validated as a whole, so a client gets every field problem at once as
//! a list of [`FieldError`]s instead of the first decoding failure.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::ExperienceLevel;

/// One field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Run the validation pass for `input`, flattening failures into a sorted list.
pub fn validate_input<T: Validate>(input: &T) -> Result<(), Vec<FieldError>> {
    input.validate().map_err(field_errors)
}

pub fn field_errors(errors: ValidationErrors) -> Vec<FieldError> {
    let mut out: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let field = camel_case(&field);
            errs.iter()
                .map(|e| FieldError {
                    field: field.clone(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid {field}")),
                })
                .collect::<Vec<_>>()
        })
        .collect();
    out.sort_by(|a, b| a.field.cmp(&b.field).then(a.message.cmp(&b.message)));
    out
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

fn validate_mobile(value: &str) -> Result<(), ValidationError> {
    let digits = value.strip_prefix('+').unwrap_or(value);
    if (7..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(error("mobile", "Please enter a valid mobile number"))
    }
}

fn validate_experience_level(value: &str) -> Result<(), ValidationError> {
    ExperienceLevel::parse(value)
        .map(|_| ())
        .ok_or_else(|| error("experience_level", "Invalid experience level"))
}

fn validate_end_date(value: &str) -> Result<(), ValidationError> {
    parse_end_date(value)
        .map(|_| ())
        .ok_or_else(|| error("end_date", "Invalid end date"))
}

fn validate_addresses(addresses: &[String]) -> Result<(), ValidationError> {
    if addresses.iter().all(|a| validator::ValidateEmail::validate_email(a)) {
        Ok(())
    } else {
        Err(error("email", "Every address must be a valid email"))
    }
}

fn validate_recipients(recipients: &[String]) -> Result<(), ValidationError> {
    if recipients.is_empty() {
        return Err(error("recipients", "At least one recipient is required"));
    }
    validate_addresses(recipients)
}

/// Parse an ISO-8601 date or date-time into the calendar date it falls on (UTC).
pub fn parse_end_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.date())
}

/// `POST /student/register`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct StudentRegistration {
    #[validate(length(min = 3, message = "Name must be at least 3 characters long"))]
    pub fullname: String,
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
}

impl StudentRegistration {
    pub fn normalized(mut self) -> Self {
        self.fullname = self.fullname.trim().to_string();
        self.email = self.email.trim().to_string();
        self
    }
}

/// `POST /company/register`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CompanyRegistration {
    #[validate(length(min = 3, message = "Company name must be at least 3 characters long"))]
    pub companyname: String,
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
    #[validate(custom(function = "validate_mobile"))]
    pub mobile: String,
}

impl CompanyRegistration {
    /// Company emails are stored trimmed and lower-cased.
    pub fn normalized(mut self) -> Self {
        self.companyname = self.companyname.trim().to_string();
        self.email = self.email.trim().to_lowercase();
        self.mobile = self.mobile.trim().to_string();
        self
    }
}

/// `POST /student/login` and `POST /company/login`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginInput {
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
}

/// `POST /company/jobs`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct NewJobInput {
    #[validate(length(min = 1, message = "Job title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Job description is required"))]
    pub description: String,
    #[validate(custom(function = "validate_experience_level"))]
    pub experience_level: String,
    #[validate(custom(function = "validate_end_date"))]
    pub end_date: String,
    #[validate(custom(function = "validate_addresses"))]
    pub emails: Vec<String>,
}

/// A validated job ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewJob {
    pub title: String,
    pub description: String,
    pub experience_level: ExperienceLevel,
    pub end_date: Option<NaiveDate>,
    pub emails: Vec<String>,
}

impl NewJobInput {
    /// Validate and convert into a [`NewJob`].
    pub fn into_new_job(mut self) -> Result<NewJob, Vec<FieldError>> {
        self.title = self.title.trim().to_string();
        self.description = self.description.trim().to_string();
        validate_input(&self)?;
        Ok(NewJob {
            experience_level: ExperienceLevel::parse(&self.experience_level)
                .unwrap_or(ExperienceLevel::Beginner),
            end_date: parse_end_date(&self.end_date),
            title: self.title,
            description: self.description,
            emails: self.emails.into_iter().map(|e| e.trim().to_string()).collect(),
        })
    }
}

/// `PUT /company/jobs/:jobId`. Only the present fields change.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct JobUpdateInput {
    #[validate(length(min = 1, message = "Job title is required"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Job description is required"))]
    pub description: Option<String>,
    #[validate(custom(function = "validate_experience_level"))]
    pub experience_level: Option<String>,
    #[validate(custom(function = "validate_end_date"))]
    pub end_date: Option<String>,
    #[validate(custom(function = "validate_addresses"))]
    pub emails: Option<Vec<String>>,
}

/// A validated partial job update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub experience_level: Option<ExperienceLevel>,
    pub end_date: Option<NaiveDate>,
    pub emails: Option<Vec<String>>,
}

impl JobUpdate {
    pub fn is_empty(&self) -> bool {
        *self == JobUpdate::default()
    }
}

impl JobUpdateInput {
    pub fn into_update(mut self) -> Result<JobUpdate, Vec<FieldError>> {
        self.title = self.title.map(|t| t.trim().to_string());
        self.description = self.description.map(|d| d.trim().to_string());
        validate_input(&self)?;
        Ok(JobUpdate {
            title: self.title,
            description: self.description,
            experience_level: self.experience_level.as_deref().and_then(ExperienceLevel::parse),
            end_date: self.end_date.as_deref().and_then(parse_end_date),
            emails: self.emails,
        })
    }
}

/// `PUT /company/profile`. `verified` and the OTP fields are not writable here.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
#[serde(default)]
pub struct ProfileUpdate {
    #[validate(length(min = 3, message = "Company name must be at least 3 characters long"))]
    pub name: Option<String>,
    #[validate(email(message = "Please enter a valid email"))]
    pub email: Option<String>,
    #[validate(custom(function = "validate_mobile"))]
    pub mobile: Option<String>,
}

impl ProfileUpdate {
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.map(|n| n.trim().to_string()),
            email: self.email.map(|e| e.trim().to_lowercase()),
            mobile: self.mobile.map(|m| m.trim().to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == ProfileUpdate::default()
    }
}

/// `POST /company/send-email`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct OutboundEmailInput {
    #[validate(custom(function = "validate_recipients"))]
    pub recipients: Vec<String>,
    #[validate(length(min = 1, message = "Subject is required"))]
    pub subject: String,
    #[validate(length(min = 1, message = "Body is required"))]
    pub body: String,
    #[validate(length(min = 1, message = "Job id is required"))]
    pub job_id: String,
}

/// `POST /company/verify-otp`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct OtpSubmission {
    #[serde(deserialize_with = "string_or_number")]
    #[validate(length(min = 1, message = "OTP is required"))]
    pub otp: String,
}

/// Codes arrive as either `"123456"` or `123456`.
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }
    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}
