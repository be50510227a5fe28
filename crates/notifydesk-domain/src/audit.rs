//! Audit trail types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of event recorded in the audit trail.
///
/// Wire format: SCREAMING_SNAKE_CASE string (`"LOGIN_SUCCESS"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    LoginSuccess,
    LoginFailed,
    OtpSent,
    OtpVerified,
    OtpFailed,
    /// Voluntary logout.
    Logout,
    /// Session evicted by a newer login for the same user.
    ForcedLogout,
    /// Session ended by the inactivity watchdog.
    SessionTimeout,
    SendEmail,
    SendEmailFailed,
}

impl AuditAction {
    pub const ALL: [AuditAction; 10] = [
        Self::LoginSuccess,
        Self::LoginFailed,
        Self::OtpSent,
        Self::OtpVerified,
        Self::OtpFailed,
        Self::Logout,
        Self::ForcedLogout,
        Self::SessionTimeout,
        Self::SendEmail,
        Self::SendEmailFailed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::LoginSuccess => "LOGIN_SUCCESS",
            Self::LoginFailed => "LOGIN_FAILED",
            Self::OtpSent => "OTP_SENT",
            Self::OtpVerified => "OTP_VERIFIED",
            Self::OtpFailed => "OTP_FAILED",
            Self::Logout => "LOGOUT",
            Self::ForcedLogout => "FORCED_LOGOUT",
            Self::SessionTimeout => "SESSION_TIMEOUT",
            Self::SendEmail => "SEND_EMAIL",
            Self::SendEmailFailed => "SEND_EMAIL_FAILED",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown audit action: {0}")]
pub struct UnknownAuditAction(pub String);

impl FromStr for AuditAction {
    type Err = UnknownAuditAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| UnknownAuditAction(s.to_owned()))
    }
}

/// Placeholder recorded when the acting user is not known.
pub const UNKNOWN_USER: &str = "unknown";

/// One append-only audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: Uuid,
    pub user_email: String,
    pub action: AuditAction,
    /// Free-form detail map.
    pub details: serde_json::Value,
    /// Milliseconds since the UNIX epoch.
    pub timestamp: i64,
    /// UTC calendar date of `timestamp`, `YYYY-MM-DD`.
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_descriptor: Option<String>,
}

impl AuditEntry {
    pub fn new(user_email: &str, action: AuditAction, details: serde_json::Value) -> Self {
        Self::at(user_email, action, details, Utc::now())
    }

    pub fn at(
        user_email: &str,
        action: AuditAction,
        details: serde_json::Value,
        now: DateTime<Utc>,
    ) -> Self {
        let user_email = if user_email.trim().is_empty() {
            UNKNOWN_USER.to_owned()
        } else {
            user_email.to_owned()
        };
        Self {
            id: Uuid::new_v4(),
            user_email,
            action,
            details,
            timestamp: now.timestamp_millis(),
            date: date_key(now),
            client_descriptor: None,
        }
    }

    pub fn with_client(mut self, client_descriptor: Option<String>) -> Self {
        self.client_descriptor = client_descriptor;
        self
    }
}

/// `YYYY-MM-DD` bucket used for date-range queries and "today" statistics.
pub fn date_key(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}
