//! End-to-end tests driving the router against an in-memory store.

mod common;

use api::ApiError;
use api::services::verification;
use axum::http::StatusCode;
use chrono::{DateTime, TimeDelta, Utc};
use serde_json::json;

use common::spawn_app;

#[tokio::test]
async fn health_reports_up() {
    let app = spawn_app().await;
    let (status, body) = app.request("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Server is up and running");
}

#[tokio::test]
async fn registration_validation_lists_fields() {
    let app = spawn_app().await;
    let (status, body) = app
        .request(
            "POST",
            "/student/register",
            None,
            Some(json!({ "fullname": "Al", "email": "not-an-email", "password": "123" })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["email", "fullname", "password"]);
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = spawn_app().await;
    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/student/login")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();
    let response = tower::ServiceExt::oneshot(app.router.clone(), request)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_student_email_is_rejected() {
    let app = spawn_app().await;
    app.register_student("dup@uni.test").await;

    let (status, body) = app
        .request(
            "POST",
            "/student/register",
            None,
            Some(json!({ "fullname": "Someone Else", "email": "dup@uni.test", "password": "secret1" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User already exist");
}

#[tokio::test]
async fn student_login_returns_user_and_cookie() {
    let app = spawn_app().await;
    app.register_student("login@uni.test").await;

    let (status, body) = app
        .request(
            "POST",
            "/student/login",
            None,
            Some(json!({ "email": "login@uni.test", "password": "wrong-password" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid email or password");

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/student/login")
        .header("content-type", "application/json")
        .body(axum::body::Body::from(
            json!({ "email": "login@uni.test", "password": "secret1" }).to_string(),
        ))
        .unwrap();
    let response = tower::ServiceExt::oneshot(app.router.clone(), request)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get("set-cookie")
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("HttpOnly"));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["user"]["email"], "login@uni.test");
    assert!(body["user"].get("passwordHash").is_none());
    assert!(body["token"].is_string());
}

#[tokio::test]
async fn duplicate_company_email_is_rejected() {
    let app = spawn_app().await;
    app.register_company("hr@acme.test").await;

    let (status, body) = app
        .request(
            "POST",
            "/company/register",
            None,
            Some(json!({
                "companyname": "Acme Again",
                "email": "HR@acme.test",
                "password": "secret1",
                "mobile": "+15550002"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Company already exists");
}

#[tokio::test]
async fn otp_flow_verifies_company() {
    let app = spawn_app().await;
    let token = app.register_company("verify@acme.test").await;

    let (status, body) = app
        .request("POST", "/company/verify-otp", Some(&token), Some(json!({ "otp": "123456" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No OTP has been issued");

    let (status, body) = app
        .request("POST", "/company/send-verification", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "OTP sent successfully");

    let code = app.last_otp("verify@acme.test").unwrap();
    assert_eq!(code.len(), 6);
    let wrong = if code == "000000" { "111111" } else { "000000" };

    let (status, body) = app
        .request("POST", "/company/verify-otp", Some(&token), Some(json!({ "otp": wrong })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid OTP");

    // The real code still works after a wrong guess
    let (status, body) = app
        .request("POST", "/company/verify-otp", Some(&token), Some(json!({ "otp": code })))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["company"]["verified"], true);
    assert!(body["company"].get("otp").is_none());

    // Consumed
    let (status, _) = app
        .request("POST", "/company/verify-otp", Some(&token), Some(json!({ "otp": code })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unverified_company_cannot_post() {
    let app = spawn_app().await;
    let token = app.register_company("new@acme.test").await;

    let (status, body) = app
        .request(
            "POST",
            "/company/jobs",
            Some(&token),
            Some(json!({
                "title": "Backend Engineer",
                "description": "Rust services",
                "experienceLevel": "EXPERT",
                "endDate": "2099-12-31"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn invalid_job_payload_lists_fields() {
    let app = spawn_app().await;
    let token = app.verified_company("fields@acme.test").await;

    let (status, body) = app
        .request(
            "POST",
            "/company/jobs",
            Some(&token),
            Some(json!({
                "title": "",
                "description": "Something",
                "experienceLevel": "GURU",
                "endDate": "someday"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["endDate", "experienceLevel", "title"]);
}

#[tokio::test]
async fn posting_notifies_the_email_list() {
    let app = spawn_app().await;
    let token = app.verified_company("notify@acme.test").await;

    let (status, _) = app
        .request(
            "POST",
            "/company/jobs",
            Some(&token),
            Some(json!({
                "title": "Data Analyst",
                "description": "SQL and dashboards",
                "experienceLevel": "INTERMEDIATE",
                "endDate": "2099-12-31",
                "emails": ["list@uni.test"]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let mut delivered = false;
    for _ in 0..50 {
        delivered = app
            .outbox
            .lock()
            .unwrap()
            .iter()
            .any(|m| m.to == "list@uni.test" && m.subject.contains("Data Analyst"));
        if delivered {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert!(delivered);
}

#[tokio::test]
async fn apply_then_listed_as_applied() {
    let app = spawn_app().await;
    let company = app.verified_company("jobs@acme.test").await;
    let job_id = app.post_job(&company, "Frontend Developer", "2099-12-31").await;
    let other_id = app.post_job(&company, "QA Engineer", "2099-12-31").await;
    let student = app.register_student("apply@uni.test").await;

    let (status, body) = app
        .request("GET", "/student/jobs?page=1&limit=4", Some(&student), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalJobs"], 2);

    let (status, body) = app
        .request("POST", &format!("/student/apply-job/{job_id}"), Some(&student), None)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["message"], "Successfully applied to job");

    let (status, body) = app
        .request("GET", "/student/applied-jobs?page=1&limit=4", Some(&student), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["totalJobs"].as_u64().unwrap() >= 1);
    let applied: Vec<&str> = body["jobs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|j| j["id"].as_str().unwrap())
        .collect();
    assert_eq!(applied, vec![job_id.as_str()]);

    let (_, body) = app
        .request("GET", "/student/jobs?page=1&limit=4", Some(&student), None)
        .await;
    let open: Vec<&str> = body["jobs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|j| j["id"].as_str().unwrap())
        .collect();
    assert_eq!(open, vec![other_id.as_str()]);

    let (status, body) = app
        .request("GET", &format!("/company/jobs/{job_id}/applicants"), Some(&company), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["applicants"][0]["email"], "apply@uni.test");

    let (_, body) = app
        .request("GET", &format!("/company/jobs/{job_id}"), Some(&company), None)
        .await;
    assert_eq!(body["job"]["candidates"], json!(["apply@uni.test"]));
}

#[tokio::test]
async fn second_application_is_rejected() {
    let app = spawn_app().await;
    let company = app.verified_company("twice@acme.test").await;
    let job_id = app.post_job(&company, "Support Engineer", "2099-12-31").await;
    let student = app.register_student("twice@uni.test").await;

    let uri = format!("/student/apply-job/{job_id}");
    let (status, _) = app.request("POST", &uri, Some(&student), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.request("POST", &uri, Some(&student), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Already applied to this job");

    let (_, body) = app.request("GET", "/student/profile", Some(&student), None).await;
    assert_eq!(body["student"]["appliedJobs"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn past_deadline_application_is_rejected() {
    let app = spawn_app().await;
    let company = app.verified_company("late@acme.test").await;
    let job_id = app.post_job(&company, "Intern", "2020-01-01").await;
    let student = app.register_student("late@uni.test").await;

    let (status, body) = app
        .request("POST", &format!("/student/apply-job/{job_id}"), Some(&student), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Job application deadline has passed");

    let (_, body) = app
        .request("GET", "/student/applied-jobs", Some(&student), None)
        .await;
    assert_eq!(body["totalJobs"], 0);
}

#[tokio::test]
async fn malformed_or_unknown_job_ids() {
    let app = spawn_app().await;
    let student = app.register_student("ids@uni.test").await;

    let (status, body) = app
        .request("POST", "/student/apply-job/not-an-id", Some(&student), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid job id");

    let missing = board_core::JobId::new();
    let (status, body) = app
        .request("POST", &format!("/student/apply-job/{missing}"), Some(&student), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Job not found");
}

#[tokio::test]
async fn companies_only_touch_their_own_jobs() {
    let app = spawn_app().await;
    let owner = app.verified_company("owner@acme.test").await;
    let rival = app.verified_company("rival@globex.test").await;
    let job_id = app.post_job(&owner, "Designer", "2099-12-31").await;
    let uri = format!("/company/jobs/{job_id}");

    let (status, _) = app.request("GET", &uri, Some(&rival), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .request("PUT", &uri, Some(&rival), Some(json!({ "title": "Hijacked" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.request("DELETE", &uri, Some(&rival), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .request("PUT", &uri, Some(&owner), Some(json!({ "title": "Senior Designer" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["job"]["title"], "Senior Designer");
    assert_eq!(body["job"]["description"], "Designer description");

    let (status, body) = app.request("DELETE", &uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Job deleted successfully");

    let (_, body) = app.request("GET", "/company/profile", Some(&owner), None).await;
    assert_eq!(body["company"]["postedJobs"], json!([]));
}

#[tokio::test]
async fn company_profile_expands_posted_jobs() {
    let app = spawn_app().await;
    let token = app.verified_company("profile@acme.test").await;
    let job_id = app.post_job(&token, "Recruiter", "2099-12-31").await;

    let (status, body) = app.request("GET", "/company/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["company"]["postedJobs"][0]["id"], job_id.as_str());
    assert_eq!(body["company"]["postedJobs"][0]["title"], "Recruiter");
    assert_eq!(body["verification"]["state"], "verified");

    let (status, body) = app
        .request(
            "PUT",
            "/company/profile",
            Some(&token),
            Some(json!({ "name": "Acme Industries", "verified": false })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["company"]["name"], "Acme Industries");
    assert_eq!(body["company"]["verified"], true);
}

#[tokio::test]
async fn company_jobs_are_paginated() {
    let app = spawn_app().await;
    let token = app.verified_company("pages@acme.test").await;
    for i in 0..5 {
        app.post_job(&token, &format!("Role {i}"), "2099-12-31").await;
    }

    let (status, body) = app
        .request("GET", "/company/jobs?page=2&limit=2", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["currentPage"], 2);
    assert_eq!(body["totalJobs"], 5);
    assert_eq!(body["totalPages"], 3);
    assert_eq!(body["hasMore"], true);
    assert_eq!(body["jobs"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn send_email_reports_delivery() {
    let app = spawn_app().await;
    let token = app.verified_company("mail@acme.test").await;
    let job_id = app.post_job(&token, "Analyst", "2099-12-31").await;

    let (status, body) = app
        .request(
            "POST",
            "/company/send-email",
            Some(&token),
            Some(json!({
                "recipients": ["a@uni.test", "b@uni.test"],
                "subject": "Interview",
                "body": "See you Monday",
                "jobId": job_id
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["message"], "Emails sent successfully");
    assert_eq!(body["report"]["sent"], 2);

    let (status, body) = app
        .request(
            "POST",
            "/company/send-email",
            Some(&token),
            Some(json!({ "recipients": [], "subject": "", "body": "x", "jobId": job_id })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"].is_array());
}

#[tokio::test]
async fn logout_revokes_the_token() {
    let app = spawn_app().await;
    let token = app.register_student("bye@uni.test").await;

    let (status, _) = app.request("GET", "/student/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.request("GET", "/student/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logged out successfully");

    let (status, body) = app.request("GET", "/student/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unauthorized, token has been revoked");
}

#[tokio::test]
async fn tokens_are_scoped_to_their_role() {
    let app = spawn_app().await;
    let student = app.register_student("role@uni.test").await;
    let company = app.register_company("role@acme.test").await;

    let (status, _) = app.request("GET", "/company/profile", Some(&student), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.request("GET", "/student/profile", Some(&company), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.request("GET", "/student/profile", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unauthorized");
}

#[tokio::test]
async fn pending_verification_shows_on_profile() {
    let app = spawn_app().await;
    let token = app.register_company("pending@acme.test").await;

    let (_, body) = app.request("GET", "/company/profile", Some(&token), None).await;
    assert_eq!(body["verification"]["state"], "unverified");

    app.request("POST", "/company/send-verification", Some(&token), None)
        .await;
    let (_, body) = app.request("GET", "/company/profile", Some(&token), None).await;
    assert_eq!(body["verification"]["state"], "pending");
    assert!(body["verification"]["expires_at"].is_string());
}

#[tokio::test]
async fn stored_code_expires_after_ten_minutes() {
    let app = spawn_app().await;
    app.register_company("clock@acme.test").await;

    let (id, _) = app
        .state
        .companies
        .find_credentials("clock@acme.test")
        .await
        .unwrap()
        .unwrap();
    let company = app.state.companies.get(id).await.unwrap();

    let issued: DateTime<Utc> = DateTime::parse_from_rfc3339("2024-03-01T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc);
    verification::send_otp(&app.state, &company, issued).await.unwrap();
    let code = app.last_otp("clock@acme.test").unwrap();

    let late = issued + TimeDelta::minutes(10) + TimeDelta::seconds(1);
    let result = verification::verify_otp(&app.state, id, &code, late).await;
    assert!(matches!(result, Err(ApiError::BadRequest(ref m)) if m == "OTP expired"));

    // An expired submission leaves the challenge in place
    let pending = app.state.companies.pending_otp(id).await.unwrap().unwrap();
    assert_eq!(pending.code, code);
    assert_eq!(pending.expires_at, issued + TimeDelta::minutes(10));
    assert!(!app.state.companies.get(id).await.unwrap().verified);

    let in_time = issued + TimeDelta::minutes(9);
    let verified = verification::verify_otp(&app.state, id, &code, in_time)
        .await
        .unwrap();
    assert!(verified.verified);
    assert!(app.state.companies.pending_otp(id).await.unwrap().is_none());
}
