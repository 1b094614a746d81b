//! HTTP handlers.

pub mod company;
pub mod health;
pub mod student;

pub use health::health;

use axum_extra::extract::cookie::{Cookie, SameSite};

use crate::auth::TOKEN_COOKIE;

/// Session cookie carrying `token`.
pub(crate) fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

/// Removal cookie matching [`session_cookie`].
pub(crate) fn cleared_session_cookie() -> Cookie<'static> {
    Cookie::build(TOKEN_COOKIE).path("/").build()
}
