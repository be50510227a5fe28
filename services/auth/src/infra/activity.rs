use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use notifydesk_session::{ActivityHandle, ActivityKind, SessionId};

/// Routes activity reports to the watchdogs of open event streams.
///
/// A session can have several streams open (one per tab); each registers
/// its own watchdog handle and removes it when the stream ends.
#[derive(Clone, Default)]
pub struct ActivityHub {
    inner: Arc<Mutex<Watchers>>,
}

#[derive(Default)]
struct Watchers {
    next_id: u64,
    by_session: HashMap<SessionId, Vec<(u64, ActivityHandle)>>,
}

/// Token returned by [`ActivityHub::register`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    session_id: SessionId,
    id: u64,
}

impl ActivityHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Watchers> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn register(&self, session_id: &SessionId, handle: ActivityHandle) -> Registration {
        let mut w = self.lock();
        let id = w.next_id;
        w.next_id += 1;
        w.by_session
            .entry(session_id.clone())
            .or_default()
            .push((id, handle));
        Registration {
            session_id: session_id.clone(),
            id,
        }
    }

    pub fn unregister(&self, registration: &Registration) {
        let mut w = self.lock();
        if let Some(handles) = w.by_session.get_mut(&registration.session_id) {
            handles.retain(|(id, _)| *id != registration.id);
            if handles.is_empty() {
                w.by_session.remove(&registration.session_id);
            }
        }
    }

    /// Reset every watchdog of the session. Returns how many were reached.
    pub fn touch(&self, session_id: &SessionId, kind: ActivityKind) -> usize {
        let w = self.lock();
        let Some(handles) = w.by_session.get(session_id) else {
            return 0;
        };
        for (_, handle) in handles {
            handle.touch(kind);
        }
        handles.len()
    }

    /// Stop every watchdog of the session.
    pub fn cancel(&self, session_id: &SessionId) {
        let w = self.lock();
        if let Some(handles) = w.by_session.get(session_id) {
            for (_, handle) in handles {
                handle.cancel();
            }
        }
    }
}
