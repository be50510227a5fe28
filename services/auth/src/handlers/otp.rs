use axum::{Json, extract::State, http::StatusCode};
use axum_extra::TypedHeader;
use axum_extra::headers::UserAgent;
use serde::{Deserialize, Serialize};

use notifydesk_otp::VERIFIED_MESSAGE;

use crate::error::AuthServiceError;
use crate::handlers::client_descriptor;
use crate::infra::db::DbAuditLog;
use crate::infra::mail::EmailJsMailer;
use crate::state::AppState;
use crate::usecase::otp::{
    CheckCredentialsInput, CheckCredentialsUseCase, IssueOtpInput, IssueOtpOutput,
    IssueOtpUseCase, VerifyOtpInput, VerifyOtpUseCase,
};

const OTP_SENT_MESSAGE: &str = "OTP sent successfully to your email";

#[derive(Deserialize)]
pub struct IssueOtpRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueOtpResponse {
    pub success: bool,
    pub message: &'static str,
    pub otp_token: String,
    pub expires_at: i64,
}

impl From<IssueOtpOutput> for IssueOtpResponse {
    fn from(out: IssueOtpOutput) -> Self {
        Self {
            success: true,
            message: OTP_SENT_MESSAGE,
            otp_token: out.otp_token,
            expires_at: out.expires_at,
        }
    }
}

fn issue_usecase(state: &AppState) -> IssueOtpUseCase<EmailJsMailer, DbAuditLog> {
    IssueOtpUseCase {
        signer: state.otp.clone(),
        mailer: state.mailer.clone(),
        audit: state.audit_log(),
        sender: state.sender.clone(),
    }
}

pub async fn issue_otp(
    State(state): State<AppState>,
    user_agent: Option<TypedHeader<UserAgent>>,
    Json(body): Json<IssueOtpRequest>,
) -> Result<Json<IssueOtpResponse>, AuthServiceError> {
    let out = issue_usecase(&state)
        .execute(IssueOtpInput {
            email: body.email,
            client: client_descriptor(user_agent),
        })
        .await?;
    Ok(Json(out.into()))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub otp: String,
    #[serde(default)]
    pub otp_token: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyOtpResponse {
    pub valid: bool,
    pub message: String,
}

/// A refused code is a normal answer (`valid: false`), not an error status.
pub async fn verify_otp(
    State(state): State<AppState>,
    user_agent: Option<TypedHeader<UserAgent>>,
    Json(body): Json<VerifyOtpRequest>,
) -> Result<(StatusCode, Json<VerifyOtpResponse>), AuthServiceError> {
    let usecase = VerifyOtpUseCase {
        signer: state.otp.clone(),
        audit: state.audit_log(),
    };
    let result = usecase
        .execute(VerifyOtpInput {
            email: body.email,
            otp: body.otp,
            otp_token: body.otp_token,
            client: client_descriptor(user_agent),
        })
        .await;

    let (status, valid, message) = match result {
        Ok(()) => (StatusCode::OK, true, VERIFIED_MESSAGE.to_owned()),
        Err(AuthServiceError::Otp(rejection)) => (StatusCode::OK, false, rejection.to_string()),
        Err(e @ AuthServiceError::MissingFields(_)) => {
            (StatusCode::BAD_REQUEST, false, e.to_string())
        }
        Err(e) => return Err(e),
    };
    Ok((status, Json(VerifyOtpResponse { valid, message })))
}

#[derive(Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

pub async fn check_credentials(
    State(state): State<AppState>,
    user_agent: Option<TypedHeader<UserAgent>>,
    Json(body): Json<CredentialsRequest>,
) -> Result<Json<IssueOtpResponse>, AuthServiceError> {
    let usecase = CheckCredentialsUseCase {
        identity: state.identity.clone(),
        issue: issue_usecase(&state),
    };
    let out = usecase
        .execute(CheckCredentialsInput {
            email: body.email,
            password: body.password,
            client: client_descriptor(user_agent),
        })
        .await?;
    Ok(Json(out.into()))
}
