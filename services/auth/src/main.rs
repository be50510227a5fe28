use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use sea_orm::Database;
use tracing::info;

use notifydesk_auth::config::AuthConfig;
use notifydesk_auth::domain::types::MailIdentity;
use notifydesk_auth::infra::activity::ActivityHub;
use notifydesk_auth::infra::identity::FirebaseIdentity;
use notifydesk_auth::infra::mail::{EmailJsMailer, EmailJsSettings};
use notifydesk_auth::router::build_router;
use notifydesk_auth::state::AppState;
use notifydesk_core::config::Config;
use notifydesk_core::tracing::init_tracing;
use notifydesk_otp::OtpSigner;

#[tokio::main]
async fn main() {
    init_tracing("info");

    let config = AuthConfig::from_env().expect("invalid auth configuration");

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let redis_cfg = deadpool_redis::Config::from_url(&config.redis_url);
    let redis = redis_cfg
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        .expect("failed to create Redis pool");
    let redis_client =
        deadpool_redis::redis::Client::open(config.redis_url.as_str()).expect("invalid REDIS_URL");

    let http = reqwest::Client::new();

    let otp = OtpSigner::new(config.otp_secret_key)
        .with_ttl(chrono::Duration::seconds(config.otp_ttl_secs));

    let mailer = EmailJsMailer::new(
        http.clone(),
        EmailJsSettings {
            endpoint: config.emailjs_endpoint,
            service_id: config.emailjs_service_id,
            template_id: config.emailjs_template_id,
            public_key: config.emailjs_public_key,
        },
    );
    let identity = FirebaseIdentity::new(http, &config.firebase_endpoint, &config.firebase_api_key);

    let admin_emails: HashSet<String> = config
        .admin_emails
        .iter()
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    let state = AppState {
        db,
        redis,
        redis_client,
        otp: Arc::new(otp),
        mailer,
        identity,
        activity: ActivityHub::new(),
        sender: MailIdentity {
            name: config.mail_from_name,
            email: config.mail_from_email,
        },
        admin_emails: Arc::new(admin_emails),
        idle_timeout: Duration::from_secs(config.idle_timeout_secs),
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.auth_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("auth service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
