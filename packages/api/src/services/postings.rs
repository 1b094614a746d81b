//! Job postings and company-authored email.

use board_core::input::{NewJob, OutboundEmailInput, validate_input};
use board_core::{Company, Job};
use mailer::{DeliveryReport, EmailMessage};

use super::{job_not_found, parse_job_id};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Post a job for a verified company and notify its `emails` list.
///
/// Notifications are fire-and-forget; their failures are only logged.
pub async fn create_job(state: &AppState, company: &Company, job: NewJob) -> ApiResult<Job> {
    if !company.verified {
        return Err(ApiError::forbidden(
            "Verify your company email before posting jobs",
        ));
    }

    let job = state.jobs.create(company.id, &job).await?;
    tracing::info!("Company {} posted job {}", company.id, job.id);

    let notices: Vec<EmailMessage> = job
        .emails
        .iter()
        .map(|to| EmailMessage::job_posted(to, &company.name, &job))
        .collect();
    state.mailer.broadcast(notices);

    Ok(job)
}

/// Email a list of recipients about one of the company's jobs.
pub async fn send_email(
    state: &AppState,
    company: &Company,
    input: OutboundEmailInput,
) -> ApiResult<DeliveryReport> {
    validate_input(&input)?;
    let job_id = parse_job_id(&input.job_id)?;
    let job = state
        .jobs
        .get_owned(job_id, company.id)
        .await
        .map_err(job_not_found)?;

    let messages = input
        .recipients
        .iter()
        .map(|to| {
            EmailMessage::notice(
                to.trim(),
                input.subject.clone(),
                input.body.clone(),
                &company.name,
                &job.title,
            )
        })
        .collect();

    let report = state.mailer.deliver(messages).await?;
    if !report.all_sent() {
        tracing::warn!(
            "Company {} email about job {}: {} sent, {} failed",
            company.id,
            job.id,
            report.sent,
            report.failed.len()
        );
    }
    Ok(report)
}
