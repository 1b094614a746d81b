//! Outbound email messages.

use board_core::Job;

/// What a message carries besides the envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailKind {
    /// Verification code for a company.
    Otp { code: String },
    /// Free-form notice about a job, sent on behalf of a company.
    Notice {
        body: String,
        company_name: String,
        job_title: String,
    },
}

/// A single email to a single recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub to_name: String,
    pub subject: String,
    pub kind: EmailKind,
}

/// Local part of an address, used as the greeting name.
fn local_part(address: &str) -> &str {
    address.split('@').next().unwrap_or(address)
}

impl EmailMessage {
    /// Verification code addressed to the company itself.
    pub fn otp(to: impl Into<String>, company_name: &str, code: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            to_name: company_name.to_string(),
            subject: format!("OTP for {}", company_name),
            kind: EmailKind::Otp { code: code.into() },
        }
    }

    /// Company-authored message about one of its jobs.
    pub fn notice(
        to: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
        company_name: &str,
        job_title: &str,
    ) -> Self {
        let to = to.into();
        Self {
            to_name: local_part(&to).to_string(),
            to,
            subject: subject.into(),
            kind: EmailKind::Notice {
                body: body.into(),
                company_name: company_name.to_string(),
                job_title: job_title.to_string(),
            },
        }
    }

    /// Announcement sent to a job's notification list when it is posted.
    pub fn job_posted(to: impl Into<String>, company_name: &str, job: &Job) -> Self {
        let body = format!(
            "A new job opportunity has been posted for position {}. Apply now!\n\n\
             Job Description: {}\n\
             Experience Level: {}\n",
            job.title, job.description, job.experience_level
        );
        Self::notice(
            to,
            format!("New Job Opportunity: {} at {}", job.title, company_name),
            body,
            company_name,
            &job.title,
        )
    }
}
