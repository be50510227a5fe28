//! Session identity carried on authenticated requests.

use axum::extract::FromRequestParts;
use http::StatusCode;
use http::request::Parts;

use crate::key::SessionKey;
use crate::record::SessionId;

pub const X_SESSION_EMAIL: &str = "x-session-email";
pub const X_SESSION_ID: &str = "x-session-id";

/// The session a client claims to hold, from `x-session-email` + `x-session-id`.
///
/// Returns 401 if either header is absent or blank. The email is lowercased
/// to match the form logins are stored under. Whether the claimed session is
/// still the registered one is checked by handlers after extraction.
#[derive(Debug, Clone)]
pub struct SessionHeaders {
    pub email: String,
    pub session_id: SessionId,
}

impl SessionHeaders {
    pub fn key(&self) -> SessionKey {
        SessionKey::from_email(&self.email)
    }
}

fn header_value(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

impl<S> FromRequestParts<S> for SessionHeaders
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    // Values are read synchronously so the returned future does not borrow `parts`.
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let email = header_value(parts, X_SESSION_EMAIL);
        let session_id = header_value(parts, X_SESSION_ID);

        async move {
            let email = email.ok_or(StatusCode::UNAUTHORIZED)?;
            let session_id = session_id.ok_or(StatusCode::UNAUTHORIZED)?;
            Ok(Self {
                email: email.to_lowercase(),
                session_id: SessionId::from(session_id),
            })
        }
    }
}
