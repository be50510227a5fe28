use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use deadpool_redis::Pool as RedisPool;
use deadpool_redis::redis;
use sea_orm::DatabaseConnection;

use notifydesk_core::health::Readiness;
use notifydesk_otp::OtpSigner;

use crate::domain::types::MailIdentity;
use crate::infra::activity::ActivityHub;
use crate::infra::cache::RedisSessionRegistry;
use crate::infra::db::DbAuditLog;
use crate::infra::identity::FirebaseIdentity;
use crate::infra::mail::EmailJsMailer;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub redis: RedisPool,
    /// Pub/sub connections for session watches are opened from this client.
    pub redis_client: redis::Client,
    pub otp: Arc<OtpSigner>,
    pub mailer: EmailJsMailer,
    pub identity: FirebaseIdentity,
    pub activity: ActivityHub,
    pub sender: MailIdentity,
    /// Lowercased.
    pub admin_emails: Arc<HashSet<String>>,
    pub idle_timeout: Duration,
}

impl AppState {
    pub fn audit_log(&self) -> DbAuditLog {
        DbAuditLog {
            db: self.db.clone(),
        }
    }

    pub fn sessions(&self) -> RedisSessionRegistry {
        RedisSessionRegistry {
            pool: self.redis.clone(),
            client: self.redis_client.clone(),
        }
    }

    pub fn is_admin(&self, email: &str) -> bool {
        self.admin_emails.contains(&email.trim().to_lowercase())
    }
}

impl Readiness for AppState {
    fn check(&self) -> impl std::future::Future<Output = Result<(), String>> + Send {
        let db = self.db.clone();
        let pool = self.redis.clone();
        async move {
            db.ping().await.map_err(|e| format!("database: {e}"))?;
            let mut conn = pool.get().await.map_err(|e| format!("redis: {e}"))?;
            let _: String = redis::cmd("PING")
                .query_async(&mut conn)
                .await
                .map_err(|e| format!("redis: {e}"))?;
            Ok(())
        }
    }
}
