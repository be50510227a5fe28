//! Inactivity timeout for authenticated sessions.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::time::{Instant, sleep_until};

/// Idle period after which a session is ended (15 minutes).
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(15 * 60);

/// User input events that count as activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Pointer,
    Key,
    Scroll,
    Touch,
    Click,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchdogOutcome {
    IdleTimeout,
    Cancelled,
}

#[derive(Debug, Clone, Copy)]
struct Activity {
    last: Instant,
    cancelled: bool,
}

/// Cloneable handle used to report activity or cancel the watchdog.
#[derive(Debug, Clone)]
pub struct ActivityHandle {
    tx: Arc<watch::Sender<Activity>>,
}

impl ActivityHandle {
    /// Reset the idle timer. No-op after [`ActivityHandle::cancel`].
    pub fn touch(&self, kind: ActivityKind) {
        self.tx.send_if_modified(|a| {
            if a.cancelled {
                return false;
            }
            a.last = Instant::now();
            true
        });
        tracing::trace!(?kind, "session activity");
    }

    /// Stop the watchdog; [`InactivityWatchdog::expired`] resolves to `Cancelled`.
    pub fn cancel(&self) {
        self.tx.send_modify(|a| a.cancelled = true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.tx.borrow().cancelled
    }
}

/// Fires once no activity has been reported for `idle`.
pub struct InactivityWatchdog {
    idle: Duration,
    rx: watch::Receiver<Activity>,
    handle: ActivityHandle,
}

impl InactivityWatchdog {
    /// Start counting from now.
    pub fn start(idle: Duration) -> Self {
        let (tx, rx) = watch::channel(Activity {
            last: Instant::now(),
            cancelled: false,
        });
        Self {
            idle,
            rx,
            handle: ActivityHandle { tx: Arc::new(tx) },
        }
    }

    pub fn handle(&self) -> ActivityHandle {
        self.handle.clone()
    }

    pub fn idle(&self) -> Duration {
        self.idle
    }

    /// Resolve when the session has been idle for the full period, or when cancelled.
    pub async fn expired(&mut self) -> WatchdogOutcome {
        loop {
            let activity = *self.rx.borrow_and_update();
            if activity.cancelled {
                return WatchdogOutcome::Cancelled;
            }

            tokio::select! {
                () = sleep_until(activity.last + self.idle) => {
                    // activity reported in the same tick as the deadline wins
                    if self.rx.has_changed().unwrap_or(false) {
                        continue;
                    }
                    return WatchdogOutcome::IdleTimeout;
                }
                changed = self.rx.changed() => {
                    if changed.is_err() {
                        return WatchdogOutcome::Cancelled;
                    }
                }
            }
        }
    }
}
