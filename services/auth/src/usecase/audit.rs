use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use notifydesk_domain::audit::{AuditAction, AuditEntry, date_key};
use notifydesk_domain::stats::{STATS_WINDOW, UsageStats};

use crate::domain::repository::AuditLog;
use crate::domain::types::AuditQuery;
use crate::error::AuthServiceError;

/// Append `entry` to the trail. A failed write is logged and dropped so it
/// never fails the request that triggered it.
pub async fn record<A: AuditLog>(audit: &A, entry: AuditEntry) {
    if let Err(e) = audit.append(&entry).await {
        tracing::warn!(
            error = ?e,
            action = %entry.action,
            user = %entry.user_email,
            "audit write failed"
        );
    }
}

pub struct ListAuditLogsUseCase<A: AuditLog> {
    pub audit: A,
}

impl<A: AuditLog> ListAuditLogsUseCase<A> {
    pub async fn execute(&self, query: AuditQuery) -> Result<Vec<AuditEntry>, AuthServiceError> {
        self.audit.list(&query).await
    }
}

pub struct EmailCountsUseCase<A: AuditLog> {
    pub audit: A,
}

impl<A: AuditLog> EmailCountsUseCase<A> {
    /// Sent emails per user.
    pub async fn execute(&self) -> Result<BTreeMap<String, u64>, AuthServiceError> {
        self.audit.count_by_user(AuditAction::SendEmail).await
    }
}

pub struct UsageStatsUseCase<A: AuditLog> {
    pub audit: A,
}

impl<A: AuditLog> UsageStatsUseCase<A> {
    pub async fn execute(&self) -> Result<UsageStats, AuthServiceError> {
        self.execute_at(Utc::now()).await
    }

    /// Statistics over the latest entries, with "today" taken from `now`.
    pub async fn execute_at(&self, now: DateTime<Utc>) -> Result<UsageStats, AuthServiceError> {
        let recent = self.audit.list(&AuditQuery::recent(STATS_WINDOW)).await?;
        Ok(UsageStats::tally(&recent, &date_key(now)))
    }
}
