//! Signed OTP tokens.
//!
//! Wire format (compatible with the dashboard's browser client):
//!
//! ```text
//! base64(json{"email", "otpHash", "expiresAt"}) "." hex(HMAC-SHA256(secret, base64-payload))
//! ```
//!
//! `otpHash` is `hex(SHA-256(code || secret))`, `expiresAt` is epoch milliseconds.
//! The base64 alphabet is the standard one with padding.

use std::fmt;

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::code::generate_code;

type HmacSha256 = Hmac<Sha256>;

const DELIMITER: char = '.';

/// Default lifetime of an issued code (5 minutes).
pub const DEFAULT_TTL_SECS: i64 = 300;

/// Message returned alongside a successful verification.
pub const VERIFIED_MESSAGE: &str = "Email verified successfully";

/// Why a verification attempt was rejected.
///
/// `Display` is the human-readable reason shown to the caller. Malformed and
/// badly-signed tokens both surface as [`OtpRejection::InvalidToken`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum OtpRejection {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Email mismatch")]
    EmailMismatch,
    #[error("OTP has expired. Please request a new OTP.")]
    Expired,
    #[error("Invalid OTP. Please try again.")]
    InvalidOtp,
}

impl OtpRejection {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidToken => "INVALID_TOKEN",
            Self::EmailMismatch => "EMAIL_MISMATCH",
            Self::Expired => "OTP_EXPIRED",
            Self::InvalidOtp => "INVALID_OTP",
        }
    }
}

/// Errors while building a token.
#[derive(Debug, thiserror::Error)]
pub enum OtpError {
    #[error("failed to encode otp claims")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OtpClaims {
    email: String,
    otp_hash: String,
    expires_at: i64,
}

/// A freshly issued code and the token that proves it.
///
/// `code` goes out-of-band to the user; `token` goes back to the caller.
pub struct IssuedOtp {
    pub code: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl fmt::Debug for IssuedOtp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedOtp")
            .field("code", &"<redacted>")
            .field("token", &self.token)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Issues and verifies OTP tokens with a shared secret.
#[derive(Clone)]
pub struct OtpSigner {
    secret: String,
    ttl: Duration,
}

impl fmt::Debug for OtpSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OtpSigner")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl OtpSigner {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ttl: Duration::seconds(DEFAULT_TTL_SECS),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, email: &str) -> Result<IssuedOtp, OtpError> {
        self.issue_at(email, Utc::now())
    }

    /// Issue a new code for `email` as if the clock read `now`.
    pub fn issue_at(&self, email: &str, now: DateTime<Utc>) -> Result<IssuedOtp, OtpError> {
        let code = generate_code();
        let token = self.sign_code(email, &code, now)?;
        Ok(IssuedOtp {
            code,
            token,
            expires_at: now + self.ttl,
        })
    }

    /// Build the token for a known code. Exposed for deterministic tests.
    pub fn sign_code(
        &self,
        email: &str,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<String, OtpError> {
        let claims = OtpClaims {
            email: email.to_owned(),
            otp_hash: self.hash_code(code),
            expires_at: (now + self.ttl).timestamp_millis(),
        };
        let payload = STANDARD.encode(serde_json::to_vec(&claims)?);
        let signature = hex::encode(self.mac(&payload).finalize().into_bytes());
        Ok(format!("{payload}{DELIMITER}{signature}"))
    }

    pub fn verify(&self, token: &str, email: &str, code: &str) -> Result<(), OtpRejection> {
        self.verify_at(token, email, code, Utc::now())
    }

    /// Check, in order: signature, email binding, expiry, code.
    ///
    /// The code is only compared once the token is known to be authentic,
    /// bound to `email` and unexpired.
    pub fn verify_at(
        &self,
        token: &str,
        email: &str,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<(), OtpRejection> {
        let (payload, signature) = token
            .split_once(DELIMITER)
            .ok_or(OtpRejection::InvalidToken)?;
        if signature.contains(DELIMITER) || !is_lower_hex(signature) {
            return Err(OtpRejection::InvalidToken);
        }

        let signature = hex::decode(signature).map_err(|_| OtpRejection::InvalidToken)?;
        self.mac(payload)
            .verify_slice(&signature)
            .map_err(|_| OtpRejection::InvalidToken)?;

        let raw = STANDARD
            .decode(payload)
            .map_err(|_| OtpRejection::InvalidToken)?;
        let claims: OtpClaims =
            serde_json::from_slice(&raw).map_err(|_| OtpRejection::InvalidToken)?;

        if claims.email != email {
            return Err(OtpRejection::EmailMismatch);
        }
        if now.timestamp_millis() > claims.expires_at {
            return Err(OtpRejection::Expired);
        }

        let candidate = self.hash_code(code);
        if !constant_time_eq(candidate.as_bytes(), claims.otp_hash.as_bytes()) {
            return Err(OtpRejection::InvalidOtp);
        }
        Ok(())
    }

    fn hash_code(&self, code: &str) -> String {
        let mut h = Sha256::new();
        h.update(code.as_bytes());
        h.update(self.secret.as_bytes());
        hex::encode(h.finalize())
    }

    fn mac(&self, payload: &str) -> HmacSha256 {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC can accept any key length");
        mac.update(payload.as_bytes());
        mac
    }
}

/// Signatures are issued as lowercase hex and must come back that way.
fn is_lower_hex(s: &str) -> bool {
    s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
