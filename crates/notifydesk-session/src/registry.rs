#![allow(async_fn_in_trait)]

use futures::stream::BoxStream;

use crate::key::SessionKey;
use crate::record::{SessionId, SessionRecord};

/// Live view of one user's record: the value at subscription time first,
/// then every later write. `None` means "no record".
pub type SessionUpdates = BoxStream<'static, Option<SessionRecord>>;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("session registry unavailable")]
    Backend(#[from] anyhow::Error),
    #[error("corrupt session record")]
    Corrupt(#[from] serde_json::Error),
}

/// Single-writer register per user with change notification.
///
/// There is no locking: whoever writes last owns the session, and earlier
/// holders learn about it through [`SessionRegistry::watch`].
pub trait SessionRegistry: Send + Sync {
    /// Overwrite the user's record unconditionally and notify watchers.
    async fn put(&self, key: &SessionKey, record: &SessionRecord) -> Result<(), RegistryError>;

    async fn current(&self, key: &SessionKey) -> Result<Option<SessionRecord>, RegistryError>;

    /// Delete the record only if it still belongs to `session_id`.
    /// Returns `true` if a record was removed.
    async fn remove_if_owned(
        &self,
        key: &SessionKey,
        session_id: &SessionId,
    ) -> Result<bool, RegistryError>;

    async fn watch(&self, key: &SessionKey) -> Result<SessionUpdates, RegistryError>;
}
