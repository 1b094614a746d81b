//! Core domain types for the job board.
//!
//! This crate contains shared types used across all packages:
//! - Job, Student and Company documents and their identifiers
//! - The page/limit primitive behind every job listing
//! - The one-time-code challenge that verifies a company
//! - Typed request inputs with a validation pass

mod company;
mod id;
pub mod input;
mod job;
pub mod pagination;
mod student;
pub mod verification;

pub use company::{Company, CompanyProfile};
pub use id::{CompanyId, InvalidId, JobId, StudentId};
pub use input::FieldError;
pub use job::{ExperienceLevel, Job};
pub use pagination::{JobPage, PageQuery, PageRequest};
pub use student::{Applicant, Student};
pub use verification::{OtpChallenge, OtpError, VerificationState, check_pending};
