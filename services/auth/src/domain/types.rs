use chrono::NaiveDate;

/// Default number of audit entries returned by a log query.
pub const DEFAULT_AUDIT_LIMIT: u64 = 100;
/// Upper bound accepted for `limit` on a log query.
pub const MAX_AUDIT_LIMIT: u64 = 1000;

/// Display identity used as the sender of outgoing mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailIdentity {
    pub name: String,
    pub email: String,
}

/// One message handed to the mail relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub from: MailIdentity,
    pub subject: String,
    pub message: String,
}

/// Result of checking an email/password pair with the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordCheck {
    Accepted,
    /// Wrong password, unknown account or disabled account. Carries the provider's code.
    Rejected { code: String },
    /// The provider is throttling this account.
    Throttled,
}

/// Filter for audit log reads. Dates are inclusive UTC calendar days.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditQuery {
    pub user: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: u64,
}

impl AuditQuery {
    /// Most recent entries, newest first.
    pub fn recent(limit: u64) -> Self {
        Self {
            user: None,
            from: None,
            to: None,
            limit: limit.clamp(1, MAX_AUDIT_LIMIT),
        }
    }

    pub fn for_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn between(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.from = from;
        self.to = to;
        self
    }
}

impl Default for AuditQuery {
    fn default() -> Self {
        Self::recent(DEFAULT_AUDIT_LIMIT)
    }
}
