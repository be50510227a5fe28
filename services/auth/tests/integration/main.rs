mod helpers;

mod audit_test;
mod notification_test;
mod otp_test;
mod router_test;
