//! Domain types shared across notifydesk crates.
//!
//! Pure types with no framework dependencies: email validation, the audit
//! trail vocabulary and usage statistics.

pub mod audit;
pub mod email;
pub mod stats;
