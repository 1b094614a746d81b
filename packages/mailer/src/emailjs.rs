//! EmailJS REST implementation of [`EmailSender`].

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::{Value, json};

use crate::{EmailKind, EmailMessage, EmailSender, MailError, SendFuture};

/// Public EmailJS endpoint.
pub const EMAILJS_BASE_URL: &str = "https://api.emailjs.com";

const SEND_PATH: &str = "/api/v1.0/email/send";

/// EmailJS account settings.
#[derive(Debug, Clone)]
pub struct EmailJsConfig {
    /// Scheme and host, without a trailing slash.
    pub base_url: String,
    pub service_id: String,
    /// Template for notices.
    pub template_id: String,
    /// Template for verification codes.
    pub otp_template_id: String,
    /// Account public key, sent as `user_id`.
    pub public_key: String,
    /// Account private key, sent as `accessToken` when present.
    pub private_key: Option<String>,
    /// Reply address shown in notices.
    pub contact_email: Option<String>,
    pub request_timeout: Duration,
}

impl EmailJsConfig {
    pub fn new(
        service_id: impl Into<String>,
        template_id: impl Into<String>,
        otp_template_id: impl Into<String>,
        public_key: impl Into<String>,
    ) -> Self {
        Self {
            base_url: EMAILJS_BASE_URL.to_string(),
            service_id: service_id.into(),
            template_id: template_id.into(),
            otp_template_id: otp_template_id.into(),
            public_key: public_key.into(),
            private_key: None,
            contact_email: None,
            request_timeout: Duration::from_secs(10),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_private_key(mut self, private_key: impl Into<String>) -> Self {
        self.private_key = Some(private_key.into());
        self
    }

    pub fn with_contact_email(mut self, contact_email: impl Into<String>) -> Self {
        self.contact_email = Some(contact_email.into());
        self
    }
}

/// Sends through the EmailJS REST API.
#[derive(Debug, Clone)]
pub struct EmailJsSender {
    client: reqwest::Client,
    config: Arc<EmailJsConfig>,
}

impl EmailJsSender {
    pub fn new(config: EmailJsConfig) -> Result<Self, MailError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    fn url(&self) -> String {
        format!("{}{}", self.config.base_url, SEND_PATH)
    }

    /// Request body for one message.
    fn payload(&self, message: &EmailMessage) -> Value {
        let (template_id, template_params) = match &message.kind {
            EmailKind::Otp { code } => (
                &self.config.otp_template_id,
                json!({
                    "to_name": message.to_name,
                    "to_email": message.to,
                    "subject": message.subject,
                    "otp_code": code,
                }),
            ),
            EmailKind::Notice {
                body,
                company_name,
                job_title,
            } => (
                &self.config.template_id,
                json!({
                    "to_name": message.to_name,
                    "to_email": message.to,
                    "subject": message.subject,
                    "custom_message": body,
                    "company_name": company_name,
                    "job_title": job_title,
                    "application_date": Utc::now().date_naive().format("%Y-%m-%d").to_string(),
                    "contact_email": self.config.contact_email,
                }),
            ),
        };

        let mut payload = json!({
            "service_id": self.config.service_id,
            "template_id": template_id,
            "user_id": self.config.public_key,
            "template_params": template_params,
        });
        if let Some(private_key) = &self.config.private_key {
            payload["accessToken"] = json!(private_key);
        }
        payload
    }
}

impl EmailSender for EmailJsSender {
    fn send(&self, message: EmailMessage) -> SendFuture {
        let client = self.client.clone();
        let url = self.url();
        let payload = self.payload(&message);

        Box::pin(async move {
            let response = client.post(url).json(&payload).send().await?;
            let status = response.status();
            if status.is_success() {
                tracing::debug!("Sent '{}' to {}", message.subject, message.to);
                return Ok(());
            }

            let body = response.text().await.unwrap_or_default();
            Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            })
        })
    }
}
