#![allow(async_fn_in_trait)]

use std::collections::BTreeMap;

use notifydesk_domain::audit::{AuditAction, AuditEntry};

use crate::domain::types::{AuditQuery, OutgoingEmail, PasswordCheck};
use crate::error::AuthServiceError;

/// Append-only audit trail.
pub trait AuditLog: Send + Sync {
    async fn append(&self, entry: &AuditEntry) -> Result<(), AuthServiceError>;

    /// Entries matching `query`, newest first.
    async fn list(&self, query: &AuditQuery) -> Result<Vec<AuditEntry>, AuthServiceError>;

    /// Number of entries with `action`, grouped by user email.
    async fn count_by_user(
        &self,
        action: AuditAction,
    ) -> Result<BTreeMap<String, u64>, AuthServiceError>;
}

/// Outbound mail relay.
pub trait Mailer: Send + Sync {
    /// Errors carry the relay's cause; callers pick the variant shown to the client.
    async fn send(&self, email: &OutgoingEmail) -> anyhow::Result<()>;
}

/// First-factor password check.
pub trait IdentityProvider: Send + Sync {
    async fn check_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<PasswordCheck, AuthServiceError>;
}
