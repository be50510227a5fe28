use std::fmt;

/// Registry location of a user's session record.
///
/// Derived from the email with `.`, `#`, `$`, `[` and `]` replaced by `_`,
/// the characters the realtime store forbids in key paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey(String);

impl SessionKey {
    pub fn from_email(email: &str) -> Self {
        Self(
            email
                .chars()
                .map(|c| match c {
                    '.' | '#' | '$' | '[' | ']' => '_',
                    other => other,
                })
                .collect(),
        )
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
