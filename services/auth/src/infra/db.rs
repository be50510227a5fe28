use std::collections::BTreeMap;

use anyhow::Context as _;
use chrono::NaiveDate;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

use notifydesk_auth_schema::audit_logs;
use notifydesk_domain::audit::{AuditAction, AuditEntry};

use crate::domain::repository::AuditLog;
use crate::domain::types::AuditQuery;
use crate::error::AuthServiceError;

// ── Audit log ────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAuditLog {
    pub db: DatabaseConnection,
}

impl AuditLog for DbAuditLog {
    async fn append(&self, entry: &AuditEntry) -> Result<(), AuthServiceError> {
        audit_logs::Entity::insert(active_model_from_entry(entry))
            .exec(&self.db)
            .await
            .context("insert audit entry")?;
        Ok(())
    }

    async fn list(&self, query: &AuditQuery) -> Result<Vec<AuditEntry>, AuthServiceError> {
        let mut select = audit_logs::Entity::find();
        if let Some(user) = &query.user {
            select = select.filter(audit_logs::Column::UserEmail.eq(user.as_str()));
        }
        // `date` is zero-padded YYYY-MM-DD, so string order is calendar order.
        if let Some(from) = query.from {
            select = select.filter(audit_logs::Column::Date.gte(day_key(from)));
        }
        if let Some(to) = query.to {
            select = select.filter(audit_logs::Column::Date.lte(day_key(to)));
        }
        let models = select
            .order_by_desc(audit_logs::Column::Timestamp)
            .limit(query.limit)
            .all(&self.db)
            .await
            .context("list audit entries")?;

        Ok(models.into_iter().filter_map(entry_from_model).collect())
    }

    async fn count_by_user(
        &self,
        action: AuditAction,
    ) -> Result<BTreeMap<String, u64>, AuthServiceError> {
        let rows: Vec<(String, i64)> = audit_logs::Entity::find()
            .select_only()
            .column(audit_logs::Column::UserEmail)
            .column_as(Expr::col(audit_logs::Column::Id).count(), "count")
            .filter(audit_logs::Column::Action.eq(action.as_str()))
            .group_by(audit_logs::Column::UserEmail)
            .into_tuple()
            .all(&self.db)
            .await
            .context("count audit entries by user")?;

        Ok(rows
            .into_iter()
            .map(|(email, count)| (email, count.max(0) as u64))
            .collect())
    }
}

// ── Conversion helpers ───────────────────────────────────────────────────────

fn day_key(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

fn active_model_from_entry(entry: &AuditEntry) -> audit_logs::ActiveModel {
    audit_logs::ActiveModel {
        id: Set(entry.id),
        user_email: Set(entry.user_email.clone()),
        action: Set(entry.action.as_str().to_owned()),
        details: Set(entry.details.clone()),
        timestamp: Set(entry.timestamp),
        date: Set(entry.date.clone()),
        client_descriptor: Set(entry.client_descriptor.clone()),
    }
}

/// Rows with an action this build does not know are skipped.
fn entry_from_model(m: audit_logs::Model) -> Option<AuditEntry> {
    let action = match m.action.parse::<AuditAction>() {
        Ok(action) => action,
        Err(e) => {
            tracing::warn!(id = %m.id, error = %e, "skipping audit row");
            return None;
        }
    };
    Some(AuditEntry {
        id: m.id,
        user_email: m.user_email,
        action,
        details: m.details,
        timestamp: m.timestamp,
        date: m.date,
        client_descriptor: m.client_descriptor,
    })
}
