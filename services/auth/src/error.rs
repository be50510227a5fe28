use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use notifydesk_otp::{OtpError, OtpRejection};
use notifydesk_session::RegistryError;

/// Auth service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("Email is required")]
    EmailRequired,
    #[error("Invalid email format")]
    InvalidEmailFormat,
    #[error("{0}")]
    MissingFields(&'static str),
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Too many failed attempts. Please try again later.")]
    TooManyAttempts,
    #[error(transparent)]
    Otp(#[from] OtpRejection),
    #[error("session is no longer active")]
    InvalidSession,
    #[error("admin access required")]
    Forbidden,
    #[error("Failed to send OTP")]
    OtpDelivery(#[source] anyhow::Error),
    #[error("Failed to send email")]
    EmailDelivery(#[source] anyhow::Error),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl AuthServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmailRequired => "EMAIL_REQUIRED",
            Self::InvalidEmailFormat => "INVALID_EMAIL_FORMAT",
            Self::MissingFields(_) => "MISSING_FIELDS",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::TooManyAttempts => "TOO_MANY_ATTEMPTS",
            Self::Otp(rejection) => rejection.kind(),
            Self::InvalidSession => "INVALID_SESSION",
            Self::Forbidden => "FORBIDDEN",
            Self::OtpDelivery(_) => "OTP_DELIVERY_FAILED",
            Self::EmailDelivery(_) => "EMAIL_DELIVERY_FAILED",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::EmailRequired | Self::InvalidEmailFormat | Self::MissingFields(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::InvalidCredentials | Self::Otp(_) | Self::InvalidSession => {
                StatusCode::UNAUTHORIZED
            }
            Self::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::OtpDelivery(_) | Self::EmailDelivery(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<RegistryError> for AuthServiceError {
    fn from(e: RegistryError) -> Self {
        Self::Internal(e.into())
    }
}

impl From<OtpError> for AuthServiceError {
    fn from(e: OtpError) -> Self {
        Self::Internal(e.into())
    }
}

impl IntoResponse for AuthServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        // 4xx are expected client errors and already visible in the TraceLayer span.
        // 5xx carry an infra cause that only shows up here.
        match &self {
            Self::OtpDelivery(e) | Self::EmailDelivery(e) | Self::Internal(e) => {
                tracing::error!(error = ?e, kind = self.kind(), "request failed");
            }
            _ => {}
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "error": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
