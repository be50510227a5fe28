use serde_json::json;

use notifydesk_domain::audit::{AuditAction, AuditEntry};
use notifydesk_domain::email::parse_recipients;

use crate::domain::repository::{AuditLog, Mailer};
use crate::domain::types::{MailIdentity, OutgoingEmail};
use crate::error::AuthServiceError;
use crate::usecase::audit::record;

pub struct SendNotificationInput {
    /// Acting user, recorded in the audit trail.
    pub sender_email: String,
    /// Comma-separated.
    pub to: String,
    /// Comma-separated.
    pub cc: Option<String>,
    pub subject: String,
    pub message: Option<String>,
    pub from_name: Option<String>,
    pub from_email: Option<String>,
}

pub struct SendNotificationUseCase<M, A>
where
    M: Mailer,
    A: AuditLog,
{
    pub mailer: M,
    pub audit: A,
    /// Used for any sender field the caller leaves blank.
    pub sender: MailIdentity,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl<M, A> SendNotificationUseCase<M, A>
where
    M: Mailer,
    A: AuditLog,
{
    pub async fn execute(&self, input: SendNotificationInput) -> Result<(), AuthServiceError> {
        if input.to.trim().is_empty() || input.subject.trim().is_empty() {
            return Err(AuthServiceError::MissingFields(
                "Missing required fields (toEmail, subject)",
            ));
        }
        let to = parse_recipients(&input.to).map_err(|_| AuthServiceError::InvalidEmailFormat)?;
        let cc = match non_blank(input.cc) {
            Some(cc) => parse_recipients(&cc).map_err(|_| AuthServiceError::InvalidEmailFormat)?,
            None => Vec::new(),
        };
        if to.is_empty() {
            return Err(AuthServiceError::MissingFields(
                "Missing required fields (toEmail, subject)",
            ));
        }

        let email = OutgoingEmail {
            to,
            cc,
            from: MailIdentity {
                name: non_blank(input.from_name).unwrap_or_else(|| self.sender.name.clone()),
                email: non_blank(input.from_email).unwrap_or_else(|| self.sender.email.clone()),
            },
            subject: input.subject.trim().to_owned(),
            message: input.message.unwrap_or_default(),
        };

        match self.mailer.send(&email).await {
            Ok(()) => {
                let entry = AuditEntry::new(
                    &input.sender_email,
                    AuditAction::SendEmail,
                    json!({ "to": email.to, "cc": email.cc, "subject": email.subject }),
                );
                record(&self.audit, entry).await;
                tracing::info!(recipients = email.to.len(), "notification sent");
                Ok(())
            }
            Err(e) => {
                let entry = AuditEntry::new(
                    &input.sender_email,
                    AuditAction::SendEmailFailed,
                    json!({ "to": email.to, "subject": email.subject, "error": "delivery failed" }),
                );
                record(&self.audit, entry).await;
                Err(AuthServiceError::EmailDelivery(e))
            }
        }
    }
}
