use notifydesk_domain::audit::AuditAction;
use notifydesk_otp::OtpRejection;

use notifydesk_auth::error::AuthServiceError;
use notifydesk_auth::usecase::otp::{
    CheckCredentialsInput, CheckCredentialsUseCase, IssueOtpInput, IssueOtpUseCase,
    VerifyOtpInput, VerifyOtpUseCase,
};

use crate::helpers::{
    EMAIL, MockAuditLog, MockIdentity, MockMailer, PASSWORD, last_code, sender, signer,
};

fn issue_usecase(mailer: MockMailer, audit: MockAuditLog) -> IssueOtpUseCase<MockMailer, MockAuditLog> {
    IssueOtpUseCase {
        signer: signer(),
        mailer,
        audit,
        sender: sender(),
    }
}

fn issue_input(email: &str) -> IssueOtpInput {
    IssueOtpInput {
        email: email.to_owned(),
        client: None,
    }
}

fn verify_input(otp: &str, token: &str) -> VerifyOtpInput {
    VerifyOtpInput {
        email: EMAIL.to_owned(),
        otp: otp.to_owned(),
        otp_token: token.to_owned(),
        client: None,
    }
}

#[tokio::test]
async fn should_mail_code_and_return_token() {
    let mailer = MockMailer::new();
    let sent = mailer.sent_handle();
    let audit = MockAuditLog::empty();

    let out = issue_usecase(mailer, audit.clone())
        .execute(issue_input(EMAIL))
        .await
        .unwrap();

    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, vec![EMAIL.to_owned()]);
    assert_eq!(sent[0].subject, "Notification Dashboard - Your OTP Code");
    assert_eq!(out.otp_token.split('.').count(), 2);
    assert_eq!(audit.actions(), vec![AuditAction::OtpSent]);
}

#[tokio::test]
async fn should_issue_for_lowercased_email() {
    let mailer = MockMailer::new();
    let sent = mailer.sent_handle();
    let audit = MockAuditLog::empty();

    let out = issue_usecase(mailer, audit.clone())
        .execute(issue_input(" User@X.com "))
        .await
        .unwrap();

    assert_eq!(sent.lock().unwrap()[0].to, vec![EMAIL.to_owned()]);
    assert_eq!(audit.last().unwrap().user_email, EMAIL);
    let verify = VerifyOtpUseCase {
        signer: signer(),
        audit: MockAuditLog::empty(),
    };
    let mixed_case = VerifyOtpInput {
        email: "USER@x.com".to_owned(),
        ..verify_input(&last_code(&sent), &out.otp_token)
    };
    assert!(verify.execute(mixed_case).await.is_ok());
}

#[tokio::test]
async fn should_require_email_before_issuing() {
    let mailer = MockMailer::new();
    let sent = mailer.sent_handle();

    let result = issue_usecase(mailer, MockAuditLog::empty())
        .execute(issue_input("   "))
        .await;

    assert!(
        matches!(result, Err(AuthServiceError::EmailRequired)),
        "expected EmailRequired, got {result:?}"
    );
    assert!(sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_reject_malformed_email_before_issuing() {
    let result = issue_usecase(MockMailer::new(), MockAuditLog::empty())
        .execute(issue_input("user@localhost"))
        .await;

    assert!(
        matches!(result, Err(AuthServiceError::InvalidEmailFormat)),
        "expected InvalidEmailFormat, got {result:?}"
    );
}

#[tokio::test]
async fn should_report_generic_failure_when_mail_relay_fails() {
    let audit = MockAuditLog::empty();
    let result = issue_usecase(MockMailer::failing(), audit.clone())
        .execute(issue_input(EMAIL))
        .await;

    assert!(
        matches!(result, Err(AuthServiceError::OtpDelivery(_))),
        "expected OtpDelivery, got {result:?}"
    );
    assert!(audit.actions().is_empty());
}

#[tokio::test]
async fn should_still_issue_when_audit_store_is_down() {
    let result = issue_usecase(MockMailer::new(), MockAuditLog::failing())
        .execute(issue_input(EMAIL))
        .await;

    assert!(result.is_ok(), "audit failure must not fail the request");
}

#[tokio::test]
async fn should_verify_mailed_code_repeatedly() {
    let mailer = MockMailer::new();
    let sent = mailer.sent_handle();
    let out = issue_usecase(mailer, MockAuditLog::empty())
        .execute(issue_input(EMAIL))
        .await
        .unwrap();
    let code = last_code(&sent);

    let audit = MockAuditLog::empty();
    let verify = VerifyOtpUseCase {
        signer: signer(),
        audit: audit.clone(),
    };

    verify.execute(verify_input(&code, &out.otp_token)).await.unwrap();
    // no single-use marking
    verify.execute(verify_input(&code, &out.otp_token)).await.unwrap();

    assert_eq!(
        audit.actions(),
        vec![AuditAction::OtpVerified, AuditAction::OtpVerified]
    );
}

#[tokio::test]
async fn should_reject_wrong_code_and_audit_failure() {
    let mailer = MockMailer::new();
    let sent = mailer.sent_handle();
    let out = issue_usecase(mailer, MockAuditLog::empty())
        .execute(issue_input(EMAIL))
        .await
        .unwrap();
    let code = last_code(&sent);
    let wrong = if code == "100000" { "100001" } else { "100000" };

    let audit = MockAuditLog::empty();
    let result = VerifyOtpUseCase {
        signer: signer(),
        audit: audit.clone(),
    }
    .execute(verify_input(wrong, &out.otp_token))
    .await;

    assert!(
        matches!(result, Err(AuthServiceError::Otp(OtpRejection::InvalidOtp))),
        "expected InvalidOtp, got {result:?}"
    );
    let entry = audit.last().unwrap();
    assert_eq!(entry.action, AuditAction::OtpFailed);
    assert_eq!(entry.details["message"], "Invalid OTP. Please try again.");
}

#[tokio::test]
async fn should_require_all_verification_fields() {
    let result = VerifyOtpUseCase {
        signer: signer(),
        audit: MockAuditLog::empty(),
    }
    .execute(verify_input("123456", ""))
    .await;

    assert!(
        matches!(result, Err(AuthServiceError::MissingFields(_))),
        "expected MissingFields, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_token_issued_for_another_email() {
    let out = issue_usecase(MockMailer::new(), MockAuditLog::empty())
        .execute(issue_input("other@x.com"))
        .await
        .unwrap();

    let result = VerifyOtpUseCase {
        signer: signer(),
        audit: MockAuditLog::empty(),
    }
    .execute(verify_input("123456", &out.otp_token))
    .await;

    assert!(
        matches!(result, Err(AuthServiceError::Otp(OtpRejection::EmailMismatch))),
        "expected EmailMismatch, got {result:?}"
    );
}

#[tokio::test]
async fn should_issue_otp_after_password_check() {
    let mailer = MockMailer::new();
    let sent = mailer.sent_handle();
    let audit = MockAuditLog::empty();
    let usecase = CheckCredentialsUseCase {
        identity: MockIdentity::new(),
        issue: issue_usecase(mailer, audit.clone()),
    };

    usecase
        .execute(CheckCredentialsInput {
            email: EMAIL.to_owned(),
            password: PASSWORD.to_owned(),
            client: None,
        })
        .await
        .unwrap();

    assert_eq!(sent.lock().unwrap().len(), 1);
    assert_eq!(audit.actions(), vec![AuditAction::OtpSent]);
}

#[tokio::test]
async fn should_not_mail_otp_when_password_is_wrong() {
    let mailer = MockMailer::new();
    let sent = mailer.sent_handle();
    let audit = MockAuditLog::empty();
    let usecase = CheckCredentialsUseCase {
        identity: MockIdentity::new(),
        issue: issue_usecase(mailer, audit.clone()),
    };

    let result = usecase
        .execute(CheckCredentialsInput {
            email: EMAIL.to_owned(),
            password: "guess".to_owned(),
            client: None,
        })
        .await;

    assert!(
        matches!(result, Err(AuthServiceError::InvalidCredentials)),
        "expected InvalidCredentials, got {result:?}"
    );
    assert!(sent.lock().unwrap().is_empty());
    let entry = audit.last().unwrap();
    assert_eq!(entry.action, AuditAction::LoginFailed);
    assert_eq!(entry.details["errorCode"], "INVALID_LOGIN_CREDENTIALS");
}

#[tokio::test]
async fn should_surface_throttling() {
    let usecase = CheckCredentialsUseCase {
        identity: MockIdentity::throttled(),
        issue: issue_usecase(MockMailer::new(), MockAuditLog::empty()),
    };

    let result = usecase
        .execute(CheckCredentialsInput {
            email: EMAIL.to_owned(),
            password: PASSWORD.to_owned(),
            client: None,
        })
        .await;

    assert!(
        matches!(result, Err(AuthServiceError::TooManyAttempts)),
        "expected TooManyAttempts, got {result:?}"
    );
}

#[tokio::test]
async fn should_require_both_credentials() {
    let usecase = CheckCredentialsUseCase {
        identity: MockIdentity::new(),
        issue: issue_usecase(MockMailer::new(), MockAuditLog::empty()),
    };

    let result = usecase
        .execute(CheckCredentialsInput {
            email: EMAIL.to_owned(),
            password: String::new(),
            client: None,
        })
        .await;

    assert!(
        matches!(result, Err(AuthServiceError::MissingFields(_))),
        "expected MissingFields, got {result:?}"
    );
}
