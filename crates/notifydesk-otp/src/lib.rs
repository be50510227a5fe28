//! Stateless email one-time passwords.
//!
//! [`OtpSigner`] issues a 6-digit code together with a self-describing signed
//! token and later verifies `(token, email, code)` without any server-side
//! storage. The token is the only state carrier between issue and verify.

pub mod code;
pub mod token;

pub use code::{OTP_LEN, generate_code};
pub use token::{IssuedOtp, OtpError, OtpRejection, OtpSigner, VERIFIED_MESSAGE};
