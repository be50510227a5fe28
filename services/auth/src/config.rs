use serde::Deserialize;

use notifydesk_core::config::Config;

/// Auth service configuration loaded from environment variables.
#[derive(Debug, Deserialize)]
pub struct AuthConfig {
    /// PostgreSQL connection URL (audit log).
    pub database_url: String,
    /// Redis connection URL (session registry).
    pub redis_url: String,
    /// HMAC secret for OTP tokens. Required; there is no built-in fallback.
    pub otp_secret_key: String,
    /// OTP lifetime in seconds (default 300).
    #[serde(default = "default_otp_ttl_secs")]
    pub otp_ttl_secs: i64,
    /// Session idle timeout in seconds (default 900).
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
    /// TCP port to listen on (default 3112). Env var: `AUTH_PORT`.
    #[serde(default = "default_auth_port")]
    pub auth_port: u16,
    pub emailjs_service_id: String,
    pub emailjs_template_id: String,
    pub emailjs_public_key: String,
    #[serde(default = "default_emailjs_endpoint")]
    pub emailjs_endpoint: String,
    /// Web API key for the Firebase Identity Toolkit password check.
    pub firebase_api_key: String,
    #[serde(default = "default_firebase_endpoint")]
    pub firebase_endpoint: String,
    /// Comma-separated list of emails allowed to read the audit log.
    #[serde(default)]
    pub admin_emails: Vec<String>,
    #[serde(default = "default_mail_from_name")]
    pub mail_from_name: String,
    #[serde(default = "default_mail_from_email")]
    pub mail_from_email: String,
}

impl Config for AuthConfig {}

fn default_otp_ttl_secs() -> i64 {
    300
}

fn default_idle_timeout_secs() -> u64 {
    15 * 60
}

fn default_auth_port() -> u16 {
    3112
}

fn default_emailjs_endpoint() -> String {
    "https://api.emailjs.com/api/v1.0/email/send".to_owned()
}

fn default_firebase_endpoint() -> String {
    "https://identitytoolkit.googleapis.com/v1/accounts:signInWithPassword".to_owned()
}

fn default_mail_from_name() -> String {
    "Notification Dashboard".to_owned()
}

fn default_mail_from_email() -> String {
    "noreply@notifydesk.local".to_owned()
}
