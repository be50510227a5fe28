use axum::extract::State;
use axum::http::StatusCode;

/// Dependency check behind `GET /readyz`.
pub trait Readiness: Clone + Send + Sync + 'static {
    /// Returns `Err` with a short reason when a backing dependency is unreachable.
    fn check(&self) -> impl std::future::Future<Output = Result<(), String>> + Send;
}

/// Handler for `GET /healthz` — liveness check.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Handler for `GET /readyz` — 503 until every dependency answers.
pub async fn readyz<S: Readiness>(State(state): State<S>) -> StatusCode {
    match state.check().await {
        Ok(()) => StatusCode::OK,
        Err(reason) => {
            tracing::warn!(%reason, "readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
