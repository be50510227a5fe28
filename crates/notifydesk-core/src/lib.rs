//! Ambient plumbing shared by notifydesk services.
//!
//! Configuration loading, tracing setup, health endpoints and the request-id /
//! trace middleware stack.

pub mod config;
pub mod health;
pub mod middleware;
pub mod tracing;
