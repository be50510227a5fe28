use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::NaiveDate;
use serde::Deserialize;

use notifydesk_domain::audit::AuditEntry;
use notifydesk_domain::email::normalize_email;
use notifydesk_domain::stats::UsageStats;
use notifydesk_session::SessionHeaders;

use crate::domain::types::{AuditQuery, DEFAULT_AUDIT_LIMIT};
use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::usecase::audit::{EmailCountsUseCase, ListAuditLogsUseCase, UsageStatsUseCase};
use crate::usecase::session::AuthorizeSessionUseCase;

/// Current session whose email is on the admin list.
async fn require_admin(state: &AppState, holder: &SessionHeaders) -> Result<(), AuthServiceError> {
    AuthorizeSessionUseCase {
        sessions: state.sessions(),
    }
    .execute(holder)
    .await?;
    if !state.is_admin(&holder.email) {
        return Err(AuthServiceError::Forbidden);
    }
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
pub struct AuditLogParams {
    pub limit: Option<u64>,
    pub user: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl From<AuditLogParams> for AuditQuery {
    fn from(p: AuditLogParams) -> Self {
        let query = AuditQuery::recent(p.limit.unwrap_or(DEFAULT_AUDIT_LIMIT)).between(p.from, p.to);
        match p.user.filter(|u| !u.trim().is_empty()) {
            Some(user) => query.for_user(normalize_email(&user)),
            None => query,
        }
    }
}

pub async fn list_audit_logs(
    State(state): State<AppState>,
    holder: SessionHeaders,
    Query(params): Query<AuditLogParams>,
) -> Result<Json<Vec<AuditEntry>>, AuthServiceError> {
    require_admin(&state, &holder).await?;
    let usecase = ListAuditLogsUseCase {
        audit: state.audit_log(),
    };
    Ok(Json(usecase.execute(params.into()).await?))
}

pub async fn email_counts(
    State(state): State<AppState>,
    holder: SessionHeaders,
) -> Result<Json<BTreeMap<String, u64>>, AuthServiceError> {
    require_admin(&state, &holder).await?;
    let usecase = EmailCountsUseCase {
        audit: state.audit_log(),
    };
    Ok(Json(usecase.execute().await?))
}

pub async fn usage_stats(
    State(state): State<AppState>,
    holder: SessionHeaders,
) -> Result<Json<UsageStats>, AuthServiceError> {
    require_admin(&state, &holder).await?;
    let usecase = UsageStatsUseCase {
        audit: state.audit_log(),
    };
    Ok(Json(usecase.execute().await?))
}
