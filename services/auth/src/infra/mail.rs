use std::sync::Arc;

use anyhow::{Context as _, bail};
use serde::Serialize;

use crate::domain::repository::Mailer;
use crate::domain::types::OutgoingEmail;

/// EmailJS account settings.
#[derive(Debug, Clone)]
pub struct EmailJsSettings {
    pub endpoint: String,
    pub service_id: String,
    pub template_id: String,
    pub public_key: String,
}

/// Mail relay through the EmailJS REST API.
#[derive(Clone)]
pub struct EmailJsMailer {
    client: reqwest::Client,
    settings: Arc<EmailJsSettings>,
}

impl EmailJsMailer {
    pub fn new(client: reqwest::Client, settings: EmailJsSettings) -> Self {
        Self {
            client,
            settings: Arc::new(settings),
        }
    }
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: TemplateParams<'a>,
}

#[derive(Debug, Serialize)]
struct TemplateParams<'a> {
    to_email: String,
    from_name: &'a str,
    from_email: &'a str,
    cc_email: String,
    subject: &'a str,
    message: &'a str,
}

fn send_request<'a>(settings: &'a EmailJsSettings, email: &'a OutgoingEmail) -> SendRequest<'a> {
    SendRequest {
        service_id: &settings.service_id,
        template_id: &settings.template_id,
        user_id: &settings.public_key,
        template_params: TemplateParams {
            to_email: email.to.join(", "),
            from_name: &email.from.name,
            from_email: &email.from.email,
            cc_email: email.cc.join(", "),
            subject: &email.subject,
            message: &email.message,
        },
    }
}

impl Mailer for EmailJsMailer {
    async fn send(&self, email: &OutgoingEmail) -> anyhow::Result<()> {
        let resp = self
            .client
            .post(&self.settings.endpoint)
            .json(&send_request(&self.settings, email))
            .send()
            .await
            .context("emailjs request")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("emailjs returned {status}: {body}");
        }
        tracing::debug!(recipients = email.to.len(), "email relayed");
        Ok(())
    }
}
