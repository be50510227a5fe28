//! Email address validation.

use std::sync::LazyLock;

use regex::Regex;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

/// Loose shape check: one `@`, no whitespace, a dot in the domain part.
pub fn is_valid_email(candidate: &str) -> bool {
    EMAIL_RE.is_match(candidate)
}

/// Trimmed and lowercased. Mailboxes and the identity provider treat
/// addresses case-insensitively, so one user has exactly one form.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid email address: {0}")]
pub struct InvalidEmail(pub String);

/// Split a comma-separated recipient list, trimming blanks.
///
/// Empty segments are skipped; any non-empty segment that fails
/// [`is_valid_email`] rejects the whole list.
pub fn parse_recipients(list: &str) -> Result<Vec<String>, InvalidEmail> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            if is_valid_email(s) {
                Ok(s.to_owned())
            } else {
                Err(InvalidEmail(s.to_owned()))
            }
        })
        .collect()
}
