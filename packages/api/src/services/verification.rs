//! Company email verification by one-time code.

use board_core::{Company, CompanyId, OtpChallenge, OtpError, check_pending};
use chrono::{DateTime, Utc};
use mailer::EmailMessage;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Issue a fresh code, replacing any pending one, and email it.
///
/// The code is stored before it is sent. A send failure is returned to the
/// caller; the stored code stays valid until it expires or is replaced.
pub async fn send_otp(state: &AppState, company: &Company, now: DateTime<Utc>) -> ApiResult<()> {
    let challenge = OtpChallenge::issue(now);
    state.companies.store_otp(company.id, &challenge).await?;

    let message = EmailMessage::otp(&company.email, &company.name, &challenge.code);
    if let Err(e) = state.email.send(message).await {
        tracing::error!("Failed to send OTP to company {}: {}", company.id, e);
        return Err(ApiError::internal("Failed to send OTP"));
    }

    tracing::info!("Sent verification code to company {}", company.id);
    Ok(())
}

/// Check a submitted code and mark the company verified.
///
/// Wrong and expired codes leave the pending challenge untouched.
pub async fn verify_otp(
    state: &AppState,
    company: CompanyId,
    submitted: &str,
    now: DateTime<Utc>,
) -> ApiResult<Company> {
    let pending = state.companies.pending_otp(company).await?;
    check_pending(pending.as_ref(), submitted, now)?;
    let code = pending.map(|challenge| challenge.code).unwrap_or_default();

    // The conditional update misses if a newer code replaced this one.
    let verified = state
        .companies
        .mark_verified(company, &code)
        .await?
        .ok_or(OtpError::Invalid)?;

    tracing::info!("Company {} verified", company);
    Ok(verified)
}
