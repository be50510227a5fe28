use notifydesk_domain::audit::AuditAction;

use notifydesk_auth::error::AuthServiceError;
use notifydesk_auth::usecase::notification::{SendNotificationInput, SendNotificationUseCase};

use crate::helpers::{EMAIL, MockAuditLog, MockMailer, sender};

fn input(to: &str, subject: &str) -> SendNotificationInput {
    SendNotificationInput {
        sender_email: EMAIL.to_owned(),
        to: to.to_owned(),
        cc: None,
        subject: subject.to_owned(),
        message: Some("Deploy finished".to_owned()),
        from_name: None,
        from_email: None,
    }
}

#[tokio::test]
async fn should_relay_notification_with_default_sender() {
    let mailer = MockMailer::new();
    let sent = mailer.sent_handle();
    let audit = MockAuditLog::empty();
    let usecase = SendNotificationUseCase {
        mailer,
        audit: audit.clone(),
        sender: sender(),
    };

    let mut req = input("a@x.com, b@x.com", "Status");
    req.cc = Some("c@x.com".to_owned());
    usecase.execute(req).await.unwrap();

    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, vec!["a@x.com".to_owned(), "b@x.com".to_owned()]);
    assert_eq!(sent[0].cc, vec!["c@x.com".to_owned()]);
    assert_eq!(sent[0].from, sender());
    let entry = audit.last().unwrap();
    assert_eq!(entry.action, AuditAction::SendEmail);
    assert_eq!(entry.user_email, EMAIL);
    assert_eq!(entry.details["subject"], "Status");
}

#[tokio::test]
async fn should_use_caller_supplied_sender_fields() {
    let mailer = MockMailer::new();
    let sent = mailer.sent_handle();
    let usecase = SendNotificationUseCase {
        mailer,
        audit: MockAuditLog::empty(),
        sender: sender(),
    };

    let mut req = input("a@x.com", "Status");
    req.from_name = Some("Ops".to_owned());
    req.from_email = Some("ops@x.com".to_owned());
    usecase.execute(req).await.unwrap();

    let sent = sent.lock().unwrap();
    assert_eq!(sent[0].from.name, "Ops");
    assert_eq!(sent[0].from.email, "ops@x.com");
}

#[tokio::test]
async fn should_require_recipient_and_subject() {
    let usecase = SendNotificationUseCase {
        mailer: MockMailer::new(),
        audit: MockAuditLog::empty(),
        sender: sender(),
    };

    let result = usecase.execute(input("a@x.com", "  ")).await;
    assert!(
        matches!(result, Err(AuthServiceError::MissingFields(_))),
        "expected MissingFields, got {result:?}"
    );

    let result = usecase.execute(input(" , ", "Status")).await;
    assert!(
        matches!(result, Err(AuthServiceError::MissingFields(_))),
        "expected MissingFields, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_invalid_recipient() {
    let usecase = SendNotificationUseCase {
        mailer: MockMailer::new(),
        audit: MockAuditLog::empty(),
        sender: sender(),
    };

    let result = usecase.execute(input("a@x.com, nope", "Status")).await;

    assert!(
        matches!(result, Err(AuthServiceError::InvalidEmailFormat)),
        "expected InvalidEmailFormat, got {result:?}"
    );
}

#[tokio::test]
async fn should_audit_failed_delivery() {
    let audit = MockAuditLog::empty();
    let usecase = SendNotificationUseCase {
        mailer: MockMailer::failing(),
        audit: audit.clone(),
        sender: sender(),
    };

    let result = usecase.execute(input("a@x.com", "Status")).await;

    assert!(
        matches!(result, Err(AuthServiceError::EmailDelivery(_))),
        "expected EmailDelivery, got {result:?}"
    );
    assert_eq!(audit.actions(), vec![AuditAction::SendEmailFailed]);
}
