use axum_extra::TypedHeader;
use axum_extra::headers::UserAgent;

pub mod audit;
pub mod notification;
pub mod otp;
pub mod session;

/// `User-Agent` of the caller, recorded with sessions and audit entries.
pub(crate) fn client_descriptor(user_agent: Option<TypedHeader<UserAgent>>) -> Option<String> {
    user_agent.map(|TypedHeader(ua)| ua.as_str().to_owned())
}
