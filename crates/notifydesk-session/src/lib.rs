//! Single-session-per-user protocol.
//!
//! Every user owns one record in a shared registry, keyed by their sanitized
//! email. A login overwrites it (last writer wins); every authenticated client
//! watches its own record and treats a foreign session id as eviction.
//!
//! - [`SessionRegistry`]: the register + publish/subscribe contract, with an
//!   in-process implementation in [`memory`].
//! - [`SessionGuard`]: classifies observed updates for the session a client holds.
//! - [`InactivityWatchdog`]: idle timer reset by user input events.
//! - [`SessionHeaders`]: axum extractor for the `x-session-*` request headers.

pub mod guard;
pub mod headers;
pub mod key;
pub mod memory;
pub mod record;
pub mod registry;
pub mod watchdog;

pub use guard::{GuardEvent, SessionGuard};
pub use headers::SessionHeaders;
pub use key::SessionKey;
pub use memory::InMemorySessionRegistry;
pub use record::{SessionId, SessionRecord};
pub use registry::{RegistryError, SessionRegistry, SessionUpdates};
pub use watchdog::{ActivityHandle, ActivityKind, InactivityWatchdog, WatchdogOutcome};
