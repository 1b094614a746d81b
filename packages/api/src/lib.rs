//! Job board REST API.
//!
//! Students browse and apply to jobs; companies verify their email, post
//! jobs and review applicants.

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod password;
pub mod routes;
pub mod services;
pub mod state;

pub use auth::{CompanyIdentity, Role, StudentIdentity, TOKEN_COOKIE, TokenKeys};
pub use config::{ApiConfig, ConfigError, Deployment};
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::{AppState, spawn_revoked_token_sweeper};
