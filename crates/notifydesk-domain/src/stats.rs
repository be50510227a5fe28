//! Usage statistics derived from the audit trail.

use serde::Serialize;

use crate::audit::{AuditAction, AuditEntry};

/// Number of most recent audit entries the statistics are computed over.
pub const STATS_WINDOW: u64 = 200;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStats {
    pub total_logins: u64,
    pub total_emails: u64,
    pub failed_logins: u64,
    pub today_logins: u64,
    pub today_emails: u64,
}

impl UsageStats {
    /// Tally `entries`; `today` is a `YYYY-MM-DD` key compared against [`AuditEntry::date`].
    pub fn tally<'a, I>(entries: I, today: &str) -> Self
    where
        I: IntoIterator<Item = &'a AuditEntry>,
    {
        entries.into_iter().fold(Self::default(), |mut acc, e| {
            let is_today = e.date == today;
            match e.action {
                AuditAction::LoginSuccess => {
                    acc.total_logins += 1;
                    if is_today {
                        acc.today_logins += 1;
                    }
                }
                AuditAction::SendEmail => {
                    acc.total_emails += 1;
                    if is_today {
                        acc.today_emails += 1;
                    }
                }
                AuditAction::LoginFailed => acc.failed_logins += 1,
                _ => {}
            }
            acc
        })
    }
}
