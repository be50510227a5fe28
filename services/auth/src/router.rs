use axum::{
    Router,
    routing::{get, post},
};

use notifydesk_core::health::{healthz, readyz};
use notifydesk_core::middleware::{propagate_request_id_layer, request_id_layer, trace_layer};

use crate::handlers::{
    audit::{email_counts, list_audit_logs, usage_stats},
    notification::send_notification,
    otp::{check_credentials, issue_otp, verify_otp},
    session::{create_session, delete_session, get_session, record_activity, session_events},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz::<AppState>))
        // OTP
        .route("/auth/otp", post(issue_otp))
        .route("/auth/otp/verification", post(verify_otp))
        .route("/auth/credentials", post(check_credentials))
        // Session
        .route(
            "/auth/session",
            post(create_session).get(get_session).delete(delete_session),
        )
        .route("/auth/session/events", get(session_events))
        .route("/auth/session/activity", post(record_activity))
        // Notifications
        .route("/notifications", post(send_notification))
        // Audit (admin)
        .route("/audit/logs", get(list_audit_logs))
        .route("/audit/email-counts", get(email_counts))
        .route("/audit/stats", get(usage_stats))
        .layer(propagate_request_id_layer())
        .layer(trace_layer())
        .layer(request_id_layer())
        .with_state(state)
}
