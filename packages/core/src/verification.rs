//! One-time-code challenge used to verify a company's email address.
//!
//! A company moves `Unverified -> Pending -> Verified`. A pending challenge
//! decays back to unverified once its expiry passes; expiry is evaluated
//! lazily when a code is submitted, nothing sweeps challenges in the
//! background.

use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifetime of an issued code.
pub const OTP_TTL: TimeDelta = TimeDelta::minutes(10);

/// Smallest and largest code that can be issued (six digits).
pub const OTP_MIN: u32 = 100_000;
pub const OTP_MAX: u32 = 999_999;

/// Why a submitted code was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OtpError {
    #[error("No OTP has been issued")]
    NotIssued,
    #[error("OTP expired")]
    Expired,
    #[error("Invalid OTP")]
    Invalid,
}

/// A pending verification code together with its expiry.
///
/// Code and expiry only ever exist together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpChallenge {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

impl OtpChallenge {
    /// Issue a fresh challenge at `now` using the thread-local RNG.
    pub fn issue(now: DateTime<Utc>) -> Self {
        Self::issue_with(&mut rand::rng(), now)
    }

    /// Issue a fresh challenge drawing the code from `rng`.
    pub fn issue_with<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> Self {
        let code: u32 = rng.random_range(OTP_MIN..=OTP_MAX);
        Self {
            code: code.to_string(),
            expires_at: now + OTP_TTL,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Check a submitted code. Expiry wins over a mismatch.
    pub fn check(&self, submitted: &str, now: DateTime<Utc>) -> Result<(), OtpError> {
        if self.is_expired(now) {
            return Err(OtpError::Expired);
        }
        if submitted.trim() != self.code {
            return Err(OtpError::Invalid);
        }
        Ok(())
    }
}

/// Check a submission against whatever challenge is currently stored.
pub fn check_pending(
    pending: Option<&OtpChallenge>,
    submitted: &str,
    now: DateTime<Utc>,
) -> Result<(), OtpError> {
    pending.ok_or(OtpError::NotIssued)?.check(submitted, now)
}

/// Observable verification state of a company at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum VerificationState {
    Unverified,
    Pending { expires_at: DateTime<Utc> },
    Verified,
}

impl VerificationState {
    pub fn of(verified: bool, pending: Option<&OtpChallenge>, now: DateTime<Utc>) -> Self {
        if verified {
            return VerificationState::Verified;
        }
        match pending {
            Some(challenge) if !challenge.is_expired(now) => VerificationState::Pending {
                expires_at: challenge.expires_at,
            },
            _ => VerificationState::Unverified,
        }
    }
}
