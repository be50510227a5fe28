use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use notifydesk_session::SessionHeaders;

use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::usecase::notification::{SendNotificationInput, SendNotificationUseCase};
use crate::usecase::session::AuthorizeSessionUseCase;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendNotificationRequest {
    #[serde(default)]
    pub to_email: String,
    pub cc_email: Option<String>,
    #[serde(default)]
    pub subject: String,
    pub message: Option<String>,
    pub from_name: Option<String>,
    pub from_email: Option<String>,
}

#[derive(Serialize)]
pub struct SendNotificationResponse {
    pub success: bool,
    pub message: &'static str,
}

pub async fn send_notification(
    State(state): State<AppState>,
    holder: SessionHeaders,
    Json(body): Json<SendNotificationRequest>,
) -> Result<Json<SendNotificationResponse>, AuthServiceError> {
    AuthorizeSessionUseCase {
        sessions: state.sessions(),
    }
    .execute(&holder)
    .await?;

    let usecase = SendNotificationUseCase {
        mailer: state.mailer.clone(),
        audit: state.audit_log(),
        sender: state.sender.clone(),
    };
    usecase
        .execute(SendNotificationInput {
            sender_email: holder.email,
            to: body.to_email,
            cc: body.cc_email,
            subject: body.subject,
            message: body.message,
            from_name: body.from_name,
            from_email: body.from_email,
        })
        .await?;

    Ok(Json(SendNotificationResponse {
        success: true,
        message: "Email sent successfully!",
    }))
}
