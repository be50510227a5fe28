use std::sync::Arc;

use serde_json::json;
use tokio::sync::mpsc;

use notifydesk_domain::audit::{AuditAction, AuditEntry};
use notifydesk_otp::OtpSigner;
use notifydesk_session::{
    GuardEvent, InactivityWatchdog, SessionGuard, SessionHeaders, SessionKey, SessionRecord,
    SessionRegistry, SessionUpdates, WatchdogOutcome,
};

use crate::domain::repository::{AuditLog, IdentityProvider};
use crate::error::AuthServiceError;
use crate::usecase::audit::record;
use crate::usecase::otp::{audit_verification, check_password, require_email};

// ── Create ───────────────────────────────────────────────────────────────────

pub struct CreateSessionInput {
    pub email: String,
    pub password: String,
    pub otp: String,
    pub otp_token: String,
    pub client: Option<String>,
}

/// Two-factor login. Both factors are checked again here so a verified OTP
/// alone never yields a session.
pub struct CreateSessionUseCase<I, R, A>
where
    I: IdentityProvider,
    R: SessionRegistry,
    A: AuditLog,
{
    pub identity: I,
    pub sessions: R,
    pub audit: A,
    pub signer: Arc<OtpSigner>,
}

impl<I, R, A> CreateSessionUseCase<I, R, A>
where
    I: IdentityProvider,
    R: SessionRegistry,
    A: AuditLog,
{
    pub async fn execute(&self, input: CreateSessionInput) -> Result<SessionRecord, AuthServiceError> {
        if input.email.trim().is_empty()
            || input.password.is_empty()
            || input.otp.trim().is_empty()
            || input.otp_token.trim().is_empty()
        {
            return Err(AuthServiceError::MissingFields(
                "Email, password, OTP, and token are required",
            ));
        }
        let email = require_email(&input.email)?;

        check_password(
            &self.identity,
            &self.audit,
            &email,
            &input.password,
            input.client.as_deref(),
        )
        .await?;

        let outcome = self
            .signer
            .verify(input.otp_token.trim(), &email, input.otp.trim());
        audit_verification(&self.audit, &email, &outcome, input.client.clone()).await;
        outcome?;

        // Overwrites whatever session this user held before.
        let session = SessionRecord::new(&email, input.client.clone().unwrap_or_default());
        self.sessions
            .put(&SessionKey::from_email(&email), &session)
            .await?;

        let entry = AuditEntry::new(
            &email,
            AuditAction::LoginSuccess,
            json!({
                "method": "2-layer-auth",
                "steps": ["password", "email_otp"],
                "sessionId": session.session_id,
            }),
        )
        .with_client(input.client);
        record(&self.audit, entry).await;

        tracing::info!(%email, session_id = %session.session_id, "session created");
        Ok(session)
    }
}

// ── Authorize ────────────────────────────────────────────────────────────────

pub struct AuthorizeSessionUseCase<R: SessionRegistry> {
    pub sessions: R,
}

impl<R: SessionRegistry> AuthorizeSessionUseCase<R> {
    /// The registered record, if the caller's session id is still the current
    /// one and was created by a login as the caller's email.
    pub async fn execute(&self, holder: &SessionHeaders) -> Result<SessionRecord, AuthServiceError> {
        match self.sessions.current(&holder.key()).await? {
            Some(current) if current.is_held_by(&holder.email, &holder.session_id) => Ok(current),
            _ => Err(AuthServiceError::InvalidSession),
        }
    }
}

// ── End ──────────────────────────────────────────────────────────────────────

pub struct EndSessionUseCase<R, A>
where
    R: SessionRegistry,
    A: AuditLog,
{
    pub sessions: R,
    pub audit: A,
}

impl<R, A> EndSessionUseCase<R, A>
where
    R: SessionRegistry,
    A: AuditLog,
{
    /// Voluntary logout. The record is removed only if it is still ours, so
    /// logging out a superseded session never evicts the newer one.
    pub async fn execute(
        &self,
        holder: &SessionHeaders,
        client: Option<String>,
    ) -> Result<bool, AuthServiceError> {
        // Emails sharing a key must not log each other out under a borrowed name.
        let current = self.sessions.current(&holder.key()).await?;
        if current.is_some_and(|c| {
            c.is_owned_by(&holder.session_id) && !c.is_held_by(&holder.email, &holder.session_id)
        }) {
            return Err(AuthServiceError::InvalidSession);
        }

        let removed = self
            .sessions
            .remove_if_owned(&holder.key(), &holder.session_id)
            .await?;

        let entry = AuditEntry::new(
            &holder.email,
            AuditAction::Logout,
            json!({ "sessionId": holder.session_id, "removed": removed }),
        )
        .with_client(client);
        record(&self.audit, entry).await;

        tracing::info!(email = %holder.email, removed, "session ended");
        Ok(removed)
    }
}

// ── Monitor ──────────────────────────────────────────────────────────────────

/// Pushed to the client holding a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The record still names this session.
    Active(SessionRecord),
    /// Another login took the session over.
    Superseded(SessionRecord),
    /// The record is gone (logout elsewhere, or the watchdog was cancelled).
    Ended,
    IdleTimeout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorOutcome {
    Superseded,
    Ended,
    IdleTimeout,
    /// The client went away or the registry stream closed.
    Disconnected,
}

/// Drives one client's event stream until the session is over for it.
pub struct MonitorSessionUseCase<R, A>
where
    R: SessionRegistry,
    A: AuditLog,
{
    pub sessions: R,
    pub audit: A,
}

impl<R, A> MonitorSessionUseCase<R, A>
where
    R: SessionRegistry,
    A: AuditLog,
{
    pub async fn execute(
        &self,
        holder: SessionHeaders,
        mut updates: SessionUpdates,
        mut watchdog: InactivityWatchdog,
        events: mpsc::Sender<SessionEvent>,
    ) -> MonitorOutcome {
        let guard = SessionGuard::new(holder.session_id.clone());

        loop {
            tokio::select! {
                event = guard.next_event(&mut updates) => match event {
                    GuardEvent::Current(current) => {
                        if events.send(SessionEvent::Active(current)).await.is_err() {
                            return MonitorOutcome::Disconnected;
                        }
                    }
                    GuardEvent::Superseded(newer) => {
                        self.audit_forced_logout(&holder, &newer).await;
                        let _ = events.send(SessionEvent::Superseded(newer)).await;
                        return MonitorOutcome::Superseded;
                    }
                    GuardEvent::Ended => {
                        let _ = events.send(SessionEvent::Ended).await;
                        return MonitorOutcome::Ended;
                    }
                    GuardEvent::Closed => return MonitorOutcome::Disconnected,
                },
                outcome = watchdog.expired() => match outcome {
                    WatchdogOutcome::IdleTimeout => {
                        self.expire(&holder, &watchdog).await;
                        let _ = events.send(SessionEvent::IdleTimeout).await;
                        return MonitorOutcome::IdleTimeout;
                    }
                    WatchdogOutcome::Cancelled => {
                        let _ = events.send(SessionEvent::Ended).await;
                        return MonitorOutcome::Ended;
                    }
                },
                () = events.closed() => return MonitorOutcome::Disconnected,
            }
        }
    }

    async fn audit_forced_logout(&self, holder: &SessionHeaders, newer: &SessionRecord) {
        tracing::info!(email = %holder.email, session_id = %holder.session_id, "session superseded");
        let entry = AuditEntry::new(
            &holder.email,
            AuditAction::ForcedLogout,
            json!({
                "reason": "concurrent_login",
                "sessionId": holder.session_id,
                "newLoginTime": newer.login_time,
            }),
        );
        record(&self.audit, entry).await;
    }

    async fn expire(&self, holder: &SessionHeaders, watchdog: &InactivityWatchdog) {
        tracing::info!(email = %holder.email, session_id = %holder.session_id, "session idle");
        if let Err(e) = self
            .sessions
            .remove_if_owned(&holder.key(), &holder.session_id)
            .await
        {
            tracing::warn!(error = ?e, email = %holder.email, "failed to remove idle session");
        }
        let entry = AuditEntry::new(
            &holder.email,
            AuditAction::SessionTimeout,
            json!({
                "sessionId": holder.session_id,
                "idleMinutes": watchdog.idle().as_secs() / 60,
            }),
        );
        record(&self.audit, entry).await;
    }
}
