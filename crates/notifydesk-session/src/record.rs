use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Random identifier of one login.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The single registry record a user owns.
///
/// JSON shape: `{"sessionId", "email", "loginTime", "userAgent"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub session_id: SessionId,
    /// Normalized email of the login that wrote the record. Several emails can
    /// share one key, so this is what ties the record to a user.
    #[serde(default)]
    pub email: String,
    /// Milliseconds since the UNIX epoch.
    pub login_time: i64,
    #[serde(rename = "userAgent", default)]
    pub client_descriptor: String,
}

impl SessionRecord {
    /// A new login happening now, with a fresh random id.
    pub fn new(email: impl Into<String>, client_descriptor: impl Into<String>) -> Self {
        Self {
            session_id: SessionId::generate(),
            email: email.into(),
            login_time: Utc::now().timestamp_millis(),
            client_descriptor: client_descriptor.into(),
        }
    }

    pub fn is_owned_by(&self, session_id: &SessionId) -> bool {
        &self.session_id == session_id
    }

    /// Same session id, written by a login as `email`.
    pub fn is_held_by(&self, email: &str, session_id: &SessionId) -> bool {
        self.is_owned_by(session_id) && self.email == email
    }
}
