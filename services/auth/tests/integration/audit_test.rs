use chrono::{Duration, NaiveDate, TimeZone, Utc};
use serde_json::json;

use notifydesk_domain::audit::{AuditAction, AuditEntry};

use notifydesk_auth::domain::types::AuditQuery;
use notifydesk_auth::usecase::audit::{
    EmailCountsUseCase, ListAuditLogsUseCase, UsageStatsUseCase, record,
};

use crate::helpers::MockAuditLog;

fn entry(email: &str, action: AuditAction, days_ago: i64) -> AuditEntry {
    let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
    AuditEntry::at(email, action, json!({}), now - Duration::days(days_ago))
}

fn seeded() -> MockAuditLog {
    MockAuditLog::new(vec![
        entry("a@x.com", AuditAction::LoginSuccess, 2),
        entry("a@x.com", AuditAction::SendEmail, 1),
        entry("b@x.com", AuditAction::LoginFailed, 1),
        entry("b@x.com", AuditAction::SendEmail, 0),
        entry("a@x.com", AuditAction::SendEmail, 0),
        entry("a@x.com", AuditAction::LoginSuccess, 0),
    ])
}

#[tokio::test]
async fn should_list_newest_first_with_limit() {
    let usecase = ListAuditLogsUseCase { audit: seeded() };

    let logs = usecase.execute(AuditQuery::recent(3)).await.unwrap();

    assert_eq!(logs.len(), 3);
    assert!(logs.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
    assert_eq!(logs[0].date, "2026-10-19");
}

#[tokio::test]
async fn should_filter_by_user_and_date_range() {
    let usecase = ListAuditLogsUseCase { audit: seeded() };
    let day = NaiveDate::from_ymd_opt(2026, 10, 18);

    let logs = usecase
        .execute(AuditQuery::recent(100).for_user("a@x.com").between(day, day))
        .await
        .unwrap();

    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].action, AuditAction::SendEmail);
}

#[tokio::test]
async fn should_count_sent_emails_per_user() {
    let usecase = EmailCountsUseCase { audit: seeded() };

    let counts = usecase.execute().await.unwrap();

    assert_eq!(counts.get("a@x.com"), Some(&2));
    assert_eq!(counts.get("b@x.com"), Some(&1));
}

#[tokio::test]
async fn should_compute_usage_stats_for_today() {
    let usecase = UsageStatsUseCase { audit: seeded() };
    let now = Utc.with_ymd_and_hms(2026, 10, 19, 18, 0, 0).unwrap();

    let stats = usecase.execute_at(now).await.unwrap();

    assert_eq!(stats.total_logins, 2);
    assert_eq!(stats.total_emails, 3);
    assert_eq!(stats.failed_logins, 1);
    assert_eq!(stats.today_logins, 1);
    assert_eq!(stats.today_emails, 2);
}

#[tokio::test]
async fn should_swallow_audit_write_failures() {
    let audit = MockAuditLog::failing();

    record(&audit, entry("a@x.com", AuditAction::Logout, 0)).await;

    assert!(audit.actions().is_empty());
}
