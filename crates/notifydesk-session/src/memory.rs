//! In-process registry over `tokio::sync::watch`.
//!
//! Suitable for a single node and for tests. Rapid successive writes may
//! coalesce for a slow watcher; the watcher always ends on the latest value.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use futures::StreamExt;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::key::SessionKey;
use crate::record::{SessionId, SessionRecord};
use crate::registry::{RegistryError, SessionRegistry, SessionUpdates};

type Slot = watch::Sender<Option<SessionRecord>>;

#[derive(Clone, Default)]
pub struct InMemorySessionRegistry {
    slots: Arc<Mutex<HashMap<SessionKey, Slot>>>,
}

impl InMemorySessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` on the key's slot, dropping the slot afterwards if it holds
    /// no record and nobody watches it.
    fn with_slot<R>(&self, key: &SessionKey, f: impl FnOnce(&Slot) -> R) -> R {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let slot = slots
            .entry(key.clone())
            .or_insert_with(|| watch::channel(None).0);
        let result = f(slot);
        let unused = slot.borrow().is_none() && slot.receiver_count() == 0;
        if unused {
            slots.remove(key);
        }
        result
    }
}

impl SessionRegistry for InMemorySessionRegistry {
    async fn put(&self, key: &SessionKey, record: &SessionRecord) -> Result<(), RegistryError> {
        self.with_slot(key, |slot| {
            slot.send_replace(Some(record.clone()));
        });
        Ok(())
    }

    async fn current(&self, key: &SessionKey) -> Result<Option<SessionRecord>, RegistryError> {
        Ok(self.with_slot(key, |slot| slot.borrow().clone()))
    }

    async fn remove_if_owned(
        &self,
        key: &SessionKey,
        session_id: &SessionId,
    ) -> Result<bool, RegistryError> {
        Ok(self.with_slot(key, |slot| {
            slot.send_if_modified(|value| {
                let owned = value
                    .as_ref()
                    .is_some_and(|record| record.is_owned_by(session_id));
                if owned {
                    *value = None;
                }
                owned
            })
        }))
    }

    async fn watch(&self, key: &SessionKey) -> Result<SessionUpdates, RegistryError> {
        let rx = self.with_slot(key, |slot| slot.subscribe());
        Ok(WatchStream::new(rx).boxed())
    }
}
