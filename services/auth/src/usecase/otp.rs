use std::sync::Arc;

use serde_json::json;

use notifydesk_domain::audit::{AuditAction, AuditEntry};
use notifydesk_domain::email::{is_valid_email, normalize_email};
use notifydesk_otp::{IssuedOtp, OtpRejection, OtpSigner};

use crate::domain::repository::{AuditLog, IdentityProvider, Mailer};
use crate::domain::types::{MailIdentity, OutgoingEmail, PasswordCheck};
use crate::error::AuthServiceError;
use crate::usecase::audit::record;

const OTP_SUBJECT: &str = "Notification Dashboard - Your OTP Code";

fn otp_message(code: &str, ttl_minutes: i64) -> String {
    format!(
        "Your one-time password (OTP) is: {code}\n\n\
         This code expires in {ttl_minutes} minutes.\n\n\
         If you didn't request this code, please ignore this email."
    )
}

/// Normalized, shape-checked email. Every token, registry key and audit
/// entry uses this form.
pub(crate) fn require_email(email: &str) -> Result<String, AuthServiceError> {
    let email = normalize_email(email);
    if email.is_empty() {
        return Err(AuthServiceError::EmailRequired);
    }
    if !is_valid_email(&email) {
        return Err(AuthServiceError::InvalidEmailFormat);
    }
    Ok(email)
}

/// First factor. Audits `LOGIN_FAILED` on rejection.
pub(crate) async fn check_password<I, A>(
    identity: &I,
    audit: &A,
    email: &str,
    password: &str,
    client: Option<&str>,
) -> Result<(), AuthServiceError>
where
    I: IdentityProvider,
    A: AuditLog,
{
    let (error_code, err) = match identity.check_password(email, password).await? {
        PasswordCheck::Accepted => return Ok(()),
        PasswordCheck::Rejected { code } => (code, AuthServiceError::InvalidCredentials),
        PasswordCheck::Throttled => (
            "TOO_MANY_ATTEMPTS_TRY_LATER".to_owned(),
            AuthServiceError::TooManyAttempts,
        ),
    };
    tracing::info!(%email, %error_code, "password check failed");
    let entry = AuditEntry::new(
        email,
        AuditAction::LoginFailed,
        json!({ "step": "password", "errorCode": error_code }),
    )
    .with_client(client.map(str::to_owned));
    record(audit, entry).await;
    Err(err)
}

// ── Issue ────────────────────────────────────────────────────────────────────

pub struct IssueOtpInput {
    pub email: String,
    pub client: Option<String>,
}

#[derive(Debug)]
pub struct IssueOtpOutput {
    pub otp_token: String,
    /// Epoch milliseconds.
    pub expires_at: i64,
}

pub struct IssueOtpUseCase<M, A>
where
    M: Mailer,
    A: AuditLog,
{
    pub signer: Arc<OtpSigner>,
    pub mailer: M,
    pub audit: A,
    pub sender: MailIdentity,
}

impl<M, A> IssueOtpUseCase<M, A>
where
    M: Mailer,
    A: AuditLog,
{
    pub async fn execute(&self, input: IssueOtpInput) -> Result<IssueOtpOutput, AuthServiceError> {
        let email = require_email(&input.email)?;

        let IssuedOtp {
            code,
            token,
            expires_at,
        } = self.signer.issue(&email)?;

        let message = OutgoingEmail {
            to: vec![email.clone()],
            cc: Vec::new(),
            from: self.sender.clone(),
            subject: OTP_SUBJECT.to_owned(),
            message: otp_message(&code, self.signer.ttl().num_minutes()),
        };
        self.mailer
            .send(&message)
            .await
            .map_err(AuthServiceError::OtpDelivery)?;

        let expires_at = expires_at.timestamp_millis();
        let entry = AuditEntry::new(
            &email,
            AuditAction::OtpSent,
            json!({ "step": "email_otp", "expiresAt": expires_at }),
        )
        .with_client(input.client);
        record(&self.audit, entry).await;

        tracing::info!(%email, "otp issued");
        Ok(IssueOtpOutput {
            otp_token: token,
            expires_at,
        })
    }
}

// ── Verify ───────────────────────────────────────────────────────────────────

pub struct VerifyOtpInput {
    pub email: String,
    pub otp: String,
    pub otp_token: String,
    pub client: Option<String>,
}

pub struct VerifyOtpUseCase<A: AuditLog> {
    pub signer: Arc<OtpSigner>,
    pub audit: A,
}

impl<A: AuditLog> VerifyOtpUseCase<A> {
    /// `Err(Otp(_))` carries the reason the code was refused.
    pub async fn execute(&self, input: VerifyOtpInput) -> Result<(), AuthServiceError> {
        let email = normalize_email(&input.email);
        let otp = input.otp.trim();
        if email.is_empty() || otp.is_empty() || input.otp_token.trim().is_empty() {
            return Err(AuthServiceError::MissingFields(
                "Email, OTP, and token are required",
            ));
        }

        let outcome = self.signer.verify(input.otp_token.trim(), &email, otp);
        audit_verification(&self.audit, &email, &outcome, input.client).await;
        Ok(outcome?)
    }
}

/// `OTP_VERIFIED` or `OTP_FAILED` for one attempt.
pub(crate) async fn audit_verification<A: AuditLog>(
    audit: &A,
    email: &str,
    outcome: &Result<(), OtpRejection>,
    client: Option<String>,
) {
    let entry = match outcome {
        Ok(()) => AuditEntry::new(email, AuditAction::OtpVerified, json!({ "step": "email_otp" })),
        Err(rejection) => {
            tracing::info!(%email, reason = rejection.kind(), "otp rejected");
            AuditEntry::new(
                email,
                AuditAction::OtpFailed,
                json!({ "step": "email_otp", "message": rejection.to_string() }),
            )
        }
    };
    record(audit, entry.with_client(client)).await;
}

// ── Credentials ──────────────────────────────────────────────────────────────

pub struct CheckCredentialsInput {
    pub email: String,
    pub password: String,
    pub client: Option<String>,
}

/// Password first, then an OTP to the same address.
pub struct CheckCredentialsUseCase<I, M, A>
where
    I: IdentityProvider,
    M: Mailer,
    A: AuditLog,
{
    pub identity: I,
    pub issue: IssueOtpUseCase<M, A>,
}

impl<I, M, A> CheckCredentialsUseCase<I, M, A>
where
    I: IdentityProvider,
    M: Mailer,
    A: AuditLog,
{
    pub async fn execute(
        &self,
        input: CheckCredentialsInput,
    ) -> Result<IssueOtpOutput, AuthServiceError> {
        if input.email.trim().is_empty() || input.password.is_empty() {
            return Err(AuthServiceError::MissingFields(
                "Please enter both email and password",
            ));
        }
        let email = require_email(&input.email)?;

        check_password(
            &self.identity,
            &self.issue.audit,
            &email,
            &input.password,
            input.client.as_deref(),
        )
        .await?;

        self.issue
            .execute(IssueOtpInput {
                email,
                client: input.client,
            })
            .await
    }
}
