//! API routes.

use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{company, health, student};
use crate::middleware::{cors_layer, redact_internal_errors};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    let student_routes = Router::new()
        .route("/register", post(student::register))
        .route("/login", post(student::login))
        .route("/logout", get(student::logout))
        .route("/profile", get(student::profile))
        .route("/jobs", get(student::jobs))
        .route("/applied-jobs", get(student::applied_jobs))
        .route("/apply-job/:job_id", post(student::apply_job));

    let company_routes = Router::new()
        .route("/register", post(company::register))
        .route("/login", post(company::login))
        .route("/logout", get(company::logout))
        .route("/send-verification", post(company::send_verification))
        .route("/verify-otp", post(company::verify_otp))
        .route("/jobs", get(company::list_jobs).post(company::create_job))
        .route(
            "/jobs/:job_id",
            get(company::get_job)
                .put(company::update_job)
                .delete(company::delete_job),
        )
        .route("/jobs/:job_id/applicants", get(company::applicants))
        .route(
            "/profile",
            get(company::profile).put(company::update_profile),
        )
        .route("/send-email", post(company::send_email));

    let mut router = Router::new()
        .route("/health", get(health))
        .nest("/student", student_routes)
        .nest("/company", company_routes);

    if state.config.is_production() {
        router = router.layer(middleware::from_fn(redact_internal_errors));
    }

    router
        .layer(TimeoutLayer::new(state.config.request_timeout()))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
