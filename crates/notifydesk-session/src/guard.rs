use futures::StreamExt;

use crate::record::{SessionId, SessionRecord};
use crate::registry::SessionUpdates;

/// What one observed registry value means for the session a client holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardEvent {
    /// The record still carries our id.
    Current(SessionRecord),
    /// A later login overwrote the record; we must log out.
    Superseded(SessionRecord),
    /// The record was removed.
    Ended,
    /// The update channel closed.
    Closed,
}

impl GuardEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Current(_))
    }
}

/// Client-side half of the concurrent-login protocol.
///
/// Holds the id this client was issued at login and compares it with every
/// value the registry pushes.
#[derive(Debug, Clone)]
pub struct SessionGuard {
    held: SessionId,
}

impl SessionGuard {
    pub fn new(held: SessionId) -> Self {
        Self { held }
    }

    pub fn held(&self) -> &SessionId {
        &self.held
    }

    pub fn observe(&self, update: Option<SessionRecord>) -> GuardEvent {
        match update {
            Some(record) if record.is_owned_by(&self.held) => GuardEvent::Current(record),
            Some(record) => GuardEvent::Superseded(record),
            None => GuardEvent::Ended,
        }
    }

    /// Wait for the next pushed value and classify it.
    pub async fn next_event(&self, updates: &mut SessionUpdates) -> GuardEvent {
        match updates.next().await {
            Some(update) => self.observe(update),
            None => GuardEvent::Closed,
        }
    }

    /// Consume updates until one is terminal and return it.
    pub async fn wait_for_eviction(&self, updates: &mut SessionUpdates) -> GuardEvent {
        loop {
            let event = self.next_event(updates).await;
            if event.is_terminal() {
                return event;
            }
        }
    }
}
