use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use notifydesk_domain::audit::{AuditAction, AuditEntry};
use notifydesk_otp::OtpSigner;

use notifydesk_auth::domain::repository::{AuditLog, IdentityProvider, Mailer};
use notifydesk_auth::domain::types::{AuditQuery, MailIdentity, OutgoingEmail, PasswordCheck};
use notifydesk_auth::error::AuthServiceError;

pub const SECRET: &str = "integration-secret";
pub const EMAIL: &str = "user@x.com";
pub const PASSWORD: &str = "correct horse";
pub const BROWSER: &str = "Mozilla/5.0 (X11; Linux x86_64)";

pub fn signer() -> Arc<OtpSigner> {
    Arc::new(OtpSigner::new(SECRET))
}

pub fn sender() -> MailIdentity {
    MailIdentity {
        name: "Notification Dashboard".to_owned(),
        email: "noreply@notifydesk.local".to_owned(),
    }
}

// ── MockAuditLog ─────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockAuditLog {
    pub entries: Arc<Mutex<Vec<AuditEntry>>>,
    pub fail_writes: bool,
}

impl MockAuditLog {
    pub fn new(entries: Vec<AuditEntry>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(entries)),
            fail_writes: false,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Every append fails; reads still work.
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn actions(&self) -> Vec<AuditAction> {
        self.entries.lock().unwrap().iter().map(|e| e.action).collect()
    }

    pub fn last(&self) -> Option<AuditEntry> {
        self.entries.lock().unwrap().last().cloned()
    }
}

impl AuditLog for MockAuditLog {
    async fn append(&self, entry: &AuditEntry) -> Result<(), AuthServiceError> {
        if self.fail_writes {
            return Err(AuthServiceError::Internal(anyhow::anyhow!("audit store down")));
        }
        self.entries.lock().unwrap().push(entry.clone());
        Ok(())
    }

    async fn list(&self, query: &AuditQuery) -> Result<Vec<AuditEntry>, AuthServiceError> {
        let from = query.from.map(|d| d.format("%Y-%m-%d").to_string());
        let to = query.to.map(|d| d.format("%Y-%m-%d").to_string());
        let mut matched: Vec<AuditEntry> = self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| query.user.as_ref().is_none_or(|u| &e.user_email == u))
            .filter(|e| from.as_ref().is_none_or(|f| &e.date >= f))
            .filter(|e| to.as_ref().is_none_or(|t| &e.date <= t))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        matched.truncate(query.limit as usize);
        Ok(matched)
    }

    async fn count_by_user(
        &self,
        action: AuditAction,
    ) -> Result<BTreeMap<String, u64>, AuthServiceError> {
        let mut counts = BTreeMap::new();
        for e in self.entries.lock().unwrap().iter().filter(|e| e.action == action) {
            *counts.entry(e.user_email.clone()).or_insert(0) += 1;
        }
        Ok(counts)
    }
}

// ── MockMailer ───────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockMailer {
    pub sent: Arc<Mutex<Vec<OutgoingEmail>>>,
    pub fail: bool,
}

impl MockMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Returns a shared handle to the outbox for post-execution inspection.
    pub fn sent_handle(&self) -> Arc<Mutex<Vec<OutgoingEmail>>> {
        Arc::clone(&self.sent)
    }
}

impl Mailer for MockMailer {
    async fn send(&self, email: &OutgoingEmail) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("relay rejected the message");
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

/// Six-digit code from the most recent OTP mail.
pub fn last_code(sent: &Arc<Mutex<Vec<OutgoingEmail>>>) -> String {
    let sent = sent.lock().unwrap();
    let message = &sent.last().expect("no mail sent").message;
    message
        .split(|c: char| !c.is_ascii_digit())
        .find(|part| part.len() == 6)
        .expect("no code in message")
        .to_owned()
}

// ── MockIdentity ─────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockIdentity {
    pub password: String,
    pub throttled: bool,
}

impl MockIdentity {
    pub fn new() -> Self {
        Self {
            password: PASSWORD.to_owned(),
            throttled: false,
        }
    }

    pub fn throttled() -> Self {
        Self {
            throttled: true,
            ..Self::new()
        }
    }
}

impl IdentityProvider for MockIdentity {
    async fn check_password(
        &self,
        _email: &str,
        password: &str,
    ) -> Result<PasswordCheck, AuthServiceError> {
        if self.throttled {
            return Ok(PasswordCheck::Throttled);
        }
        if password == self.password {
            Ok(PasswordCheck::Accepted)
        } else {
            Ok(PasswordCheck::Rejected {
                code: "INVALID_LOGIN_CREDENTIALS".to_owned(),
            })
        }
    }
}
