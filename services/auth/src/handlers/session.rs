use axum::response::sse::{Event, KeepAlive, Sse};
use axum::{Json, extract::State, http::StatusCode};
use axum_extra::TypedHeader;
use axum_extra::headers::UserAgent;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use notifydesk_session::{
    ActivityKind, InactivityWatchdog, SessionHeaders, SessionId, SessionRegistry,
};

use crate::error::AuthServiceError;
use crate::handlers::client_descriptor;
use crate::state::AppState;
use crate::usecase::session::{
    AuthorizeSessionUseCase, CreateSessionInput, CreateSessionUseCase, EndSessionUseCase,
    MonitorSessionUseCase, SessionEvent,
};

/// Buffered events per open stream.
const EVENT_BUFFER: usize = 8;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub otp: String,
    #[serde(default)]
    pub otp_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    pub session_id: SessionId,
    pub login_time: i64,
    pub message: &'static str,
}

pub async fn create_session(
    State(state): State<AppState>,
    user_agent: Option<TypedHeader<UserAgent>>,
    Json(body): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<CreateSessionResponse>), AuthServiceError> {
    let usecase = CreateSessionUseCase {
        identity: state.identity.clone(),
        sessions: state.sessions(),
        audit: state.audit_log(),
        signer: state.otp.clone(),
    };
    let session = usecase
        .execute(CreateSessionInput {
            email: body.email,
            password: body.password,
            otp: body.otp,
            otp_token: body.otp_token,
            client: client_descriptor(user_agent),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            session_id: session.session_id,
            login_time: session.login_time,
            message: "Login successful",
        }),
    ))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub email: String,
    pub session_id: SessionId,
    pub login_time: i64,
    pub user_agent: String,
    pub admin: bool,
}

pub async fn get_session(
    State(state): State<AppState>,
    holder: SessionHeaders,
) -> Result<Json<SessionResponse>, AuthServiceError> {
    let usecase = AuthorizeSessionUseCase {
        sessions: state.sessions(),
    };
    let current = usecase.execute(&holder).await?;
    Ok(Json(SessionResponse {
        admin: state.is_admin(&holder.email),
        email: holder.email,
        session_id: current.session_id,
        login_time: current.login_time,
        user_agent: current.client_descriptor,
    }))
}

pub async fn delete_session(
    State(state): State<AppState>,
    holder: SessionHeaders,
    user_agent: Option<TypedHeader<UserAgent>>,
) -> Result<StatusCode, AuthServiceError> {
    state.activity.cancel(&holder.session_id);
    let usecase = EndSessionUseCase {
        sessions: state.sessions(),
        audit: state.audit_log(),
    };
    usecase
        .execute(&holder, client_descriptor(user_agent))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

fn to_sse(event: SessionEvent) -> Result<Event, axum::Error> {
    match event {
        SessionEvent::Active(current) => Event::default().event("session").json_data(current),
        SessionEvent::Superseded(newer) => Event::default().event("superseded").json_data(newer),
        SessionEvent::Ended => Ok(Event::default().event("ended").data("{}")),
        SessionEvent::IdleTimeout => Ok(Event::default().event("idle_timeout").data("{}")),
    }
}

/// Server-sent events for the caller's session until it is superseded,
/// ended or idle.
pub async fn session_events(
    State(state): State<AppState>,
    holder: SessionHeaders,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, AuthServiceError> {
    let sessions = state.sessions();
    AuthorizeSessionUseCase {
        sessions: sessions.clone(),
    }
    .execute(&holder)
    .await?;

    let updates = sessions.watch(&holder.key()).await?;
    let watchdog = InactivityWatchdog::start(state.idle_timeout);
    let registration = state.activity.register(&holder.session_id, watchdog.handle());
    let (tx, rx) = mpsc::channel(EVENT_BUFFER);

    let monitor = MonitorSessionUseCase {
        sessions,
        audit: state.audit_log(),
    };
    let activity = state.activity.clone();
    tokio::spawn(async move {
        let email = holder.email.clone();
        let outcome = monitor.execute(holder, updates, watchdog, tx).await;
        activity.unregister(&registration);
        tracing::debug!(%email, ?outcome, "session stream closed");
    });

    Ok(Sse::new(ReceiverStream::new(rx).map(to_sse)).keep_alive(KeepAlive::default()))
}

#[derive(Deserialize)]
pub struct ActivityRequest {
    pub kind: ActivityKind,
}

pub async fn record_activity(
    State(state): State<AppState>,
    holder: SessionHeaders,
    Json(body): Json<ActivityRequest>,
) -> Result<StatusCode, AuthServiceError> {
    AuthorizeSessionUseCase {
        sessions: state.sessions(),
    }
    .execute(&holder)
    .await?;
    state.activity.touch(&holder.session_id, body.kind);
    Ok(StatusCode::NO_CONTENT)
}
