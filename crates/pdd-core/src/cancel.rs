//! Deadline and cancellation signal for a verification run
//!
//! A [`Cancellation`] is a read-only view shared by everything that runs
//! under one overall deadline. Only the owner of the [`CancelHandle`] can
//! cancel early. Cancellation is cooperative: it is observed between
//! rounds and during the inter-round sleep, never inside a probe.

use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// Read-only deadline/cancellation signal
#[derive(Debug, Clone)]
pub struct Cancellation {
    /// Absolute deadline, if any
    deadline: Option<Instant>,
    /// External cancel flag
    cancelled: watch::Receiver<bool>,
}

/// Owner side of a [`Cancellation`]
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Cancel every [`Cancellation`] created with this handle
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl Cancellation {
    /// A signal that never fires
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self {
            deadline: None,
            cancelled: rx,
        }
    }

    /// A signal that fires at `deadline` (or never) or when cancelled
    pub fn until(deadline: Option<Instant>) -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        (
            Self {
                deadline,
                cancelled: rx,
            },
            CancelHandle { tx },
        )
    }

    /// A signal that fires `timeout` from now or when cancelled
    pub fn with_timeout(timeout: Duration) -> (Self, CancelHandle) {
        Self::until(Some(Instant::now() + timeout))
    }

    /// The absolute deadline, if one is set
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline
    ///
    /// `None` when there is no deadline; zero once it has passed.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Whether the deadline has passed or the run was cancelled
    pub fn is_expired(&self) -> bool {
        let cancelled = *self.cancelled.borrow();
        if cancelled {
            return true;
        }
        self.deadline
            .is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Resolves once the deadline passes or the run is cancelled
    ///
    /// Never resolves for a signal without deadline whose handle was dropped.
    pub async fn cancelled(&self) {
        let mut rx = self.cancelled.clone();
        let external = async move {
            loop {
                let cancelled = *rx.borrow_and_update();
                if cancelled {
                    break;
                }
                if rx.changed().await.is_err() {
                    std::future::pending::<()>().await;
                }
            }
        };

        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = tokio::time::sleep_until(deadline) => {}
                    _ = external => {}
                }
            }
            None => external.await,
        }
    }
}
