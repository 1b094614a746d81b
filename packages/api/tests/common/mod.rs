#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use api::{ApiConfig, AppState, create_router};
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use db::Database;
use mailer::{EmailKind, EmailMessage, EmailSender, FnSender, Mailer, SendFuture};
use serde_json::{Value, json};
use tower::ServiceExt;

/// Router plus the outbox every email lands in.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub outbox: Arc<Mutex<Vec<EmailMessage>>>,
}

/// Every call opens a separate in-memory store.
pub async fn spawn_app() -> TestApp {
    let db = Database::memory().await.unwrap();

    let outbox: Arc<Mutex<Vec<EmailMessage>>> = Arc::new(Mutex::new(Vec::new()));
    let recorded = outbox.clone();
    let email: Arc<dyn EmailSender> = Arc::new(FnSender::new(move |message: EmailMessage| -> SendFuture {
        let recorded = recorded.clone();
        Box::pin(async move {
            recorded.lock().unwrap().push(message);
            Ok(())
        })
    }));

    let (mailer, _handle) = Mailer::start(email.clone()).await.unwrap();
    let state = AppState::new(ApiConfig::default(), db, email, mailer);

    TestApp {
        router: create_router(state.clone()),
        state,
        outbox,
    }
}

impl TestApp {
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    pub async fn register_student(&self, email: &str) -> String {
        let (status, body) = self
            .request(
                "POST",
                "/student/register",
                None,
                Some(json!({ "fullname": "Test Student", "email": email, "password": "secret1" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["token"].as_str().unwrap().to_string()
    }

    pub async fn register_company(&self, email: &str) -> String {
        let (status, body) = self
            .request(
                "POST",
                "/company/register",
                None,
                Some(json!({
                    "companyname": "Acme Corp",
                    "email": email,
                    "password": "secret1",
                    "mobile": "+15550001"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["token"].as_str().unwrap().to_string()
    }

    /// Most recent verification code emailed to `to`.
    pub fn last_otp(&self, to: &str) -> Option<String> {
        self.outbox
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find_map(|m| match &m.kind {
                EmailKind::Otp { code } if m.to == to => Some(code.clone()),
                _ => None,
            })
    }

    /// Register a company and complete email verification.
    pub async fn verified_company(&self, email: &str) -> String {
        let token = self.register_company(email).await;
        let (status, _) = self
            .request("POST", "/company/send-verification", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::OK);

        let code = self.last_otp(email).unwrap();
        let (status, body) = self
            .request("POST", "/company/verify-otp", Some(&token), Some(json!({ "otp": code })))
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        token
    }

    /// Post a job and return its id.
    pub async fn post_job(&self, token: &str, title: &str, end_date: &str) -> String {
        let (status, body) = self
            .request(
                "POST",
                "/company/jobs",
                Some(token),
                Some(json!({
                    "title": title,
                    "description": format!("{title} description"),
                    "experienceLevel": "BEGINNER",
                    "endDate": end_date,
                    "emails": []
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["job"]["id"].as_str().unwrap().to_string()
    }
}
