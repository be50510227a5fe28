use std::sync::Arc;

use anyhow::{Context as _, anyhow};
use serde::{Deserialize, Serialize};

use crate::domain::repository::IdentityProvider;
use crate::domain::types::PasswordCheck;
use crate::error::AuthServiceError;

/// Password check against the Firebase Identity Toolkit `signInWithPassword` endpoint.
#[derive(Clone)]
pub struct FirebaseIdentity {
    client: reqwest::Client,
    endpoint: Arc<str>,
    api_key: Arc<str>,
}

impl FirebaseIdentity {
    pub fn new(client: reqwest::Client, endpoint: &str, api_key: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Map a failed sign-in response to a check outcome.
///
/// Firebase puts a code in `error.message`, sometimes followed by ` : detail`.
fn classify_failure(status: u16, body: &str) -> anyhow::Result<PasswordCheck> {
    let envelope: ErrorEnvelope = serde_json::from_str(body)
        .with_context(|| format!("unexpected identity response ({status})"))?;
    let code = envelope
        .error
        .message
        .split([' ', ':'])
        .next()
        .unwrap_or_default()
        .to_owned();

    match code.as_str() {
        "TOO_MANY_ATTEMPTS_TRY_LATER" => Ok(PasswordCheck::Throttled),
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS"
        | "USER_DISABLED" | "INVALID_EMAIL" | "MISSING_PASSWORD" => {
            Ok(PasswordCheck::Rejected { code })
        }
        _ => Err(anyhow!("identity provider returned {status}: {}", envelope.error.message)),
    }
}

impl IdentityProvider for FirebaseIdentity {
    async fn check_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<PasswordCheck, AuthServiceError> {
        let url = format!("{}?key={}", self.endpoint, self.api_key);
        let resp = self
            .client
            .post(url)
            .json(&SignInRequest {
                email,
                password,
                return_secure_token: true,
            })
            .send()
            .await
            .context("identity request")?;

        let status = resp.status();
        if status.is_success() {
            return Ok(PasswordCheck::Accepted);
        }
        let body = resp.text().await.context("read identity response")?;
        Ok(classify_failure(status.as_u16(), &body)?)
    }
}
