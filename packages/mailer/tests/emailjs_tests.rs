use std::error::Error;
use std::sync::Arc;

use mailer::{EmailJsConfig, EmailJsSender, EmailMessage, EmailSender, MailError, Mailer};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer) -> EmailJsConfig {
    EmailJsConfig::new("service_1", "template_notice", "template_otp", "public")
        .with_private_key("private")
        .with_base_url(server.uri())
}

#[tokio::test]
async fn test_otp_is_posted_to_emailjs() -> Result<(), Box<dyn Error>> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1.0/email/send"))
        .and(body_partial_json(json!({
            "service_id": "service_1",
            "template_id": "template_otp",
            "user_id": "public",
            "accessToken": "private",
            "template_params": { "to_email": "hr@acme.test", "otp_code": "123456" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .expect(1)
        .mount(&server)
        .await;

    let sender = EmailJsSender::new(config(&server))?;
    sender
        .send(EmailMessage::otp("hr@acme.test", "Acme", "123456"))
        .await?;

    Ok(())
}

#[tokio::test]
async fn test_rejected_request_surfaces_status() -> Result<(), Box<dyn Error>> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1.0/email/send"))
        .respond_with(ResponseTemplate::new(400).set_body_string("The user ID is invalid"))
        .mount(&server)
        .await;

    let sender = EmailJsSender::new(config(&server))?;
    let result = sender
        .send(EmailMessage::otp("hr@acme.test", "Acme", "123456"))
        .await;

    match result {
        Err(MailError::Rejected { status, body }) => {
            assert_eq!(status, 400);
            assert_eq!(body, "The user ID is invalid");
        }
        other => panic!("expected rejection, got {other:?}"),
    }

    Ok(())
}

#[tokio::test]
async fn test_mailer_reports_partial_failure() -> Result<(), Box<dyn Error>> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "template_params": { "to_email": "broken@uni.test" } })))
        .respond_with(ResponseTemplate::new(422))
        .with_priority(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .with_priority(2)
        .mount(&server)
        .await;

    let sender = EmailJsSender::new(config(&server))?;
    let (mailer, _handle) = Mailer::start(Arc::new(sender)).await?;

    let messages = ["ok@uni.test", "broken@uni.test", "fine@uni.test"]
        .into_iter()
        .map(|to| EmailMessage::notice(to, "Interview", "Details inside", "Acme", "Dev"))
        .collect();
    let report = mailer.deliver(messages).await?;

    assert_eq!(report.sent, 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].recipient, "broken@uni.test");

    mailer.stop();
    Ok(())
}
