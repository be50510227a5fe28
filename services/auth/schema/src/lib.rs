//! sea-orm entities owned by the auth service.

pub mod audit_logs;
