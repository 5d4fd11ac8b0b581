// src/checks/context.rs
use std::future::pending;
use tokio::sync::watch;
use tokio::time::{sleep_until, Duration, Instant};

/// Why a context finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    #[error("context canceled")]
    Cancelled,

    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

/// Cancellation signal and optional deadline handed to every check run.
///
/// Probes race their I/O against [`CheckContext::done`] and abandon it once
/// the context finishes.
#[derive(Debug, Clone, Default)]
pub struct CheckContext {
    deadline: Option<Instant>,
    cancel_rx: Option<watch::Receiver<bool>>,
}

/// Cancels every context derived from the one it was created with.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

impl CheckContext {
    /// A context that never finishes.
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            cancel_rx: None,
        }
    }

    pub fn with_cancel() -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        let ctx = Self {
            deadline: None,
            cancel_rx: Some(rx),
        };
        (ctx, CancelHandle { tx })
    }

    /// Derive a context sharing this one's cancel signal, finishing no later
    /// than `timeout` from now.
    pub fn child_with_timeout(&self, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        Self {
            deadline: Some(self.deadline.map_or(deadline, |d| d.min(deadline))),
            cancel_rx: self.cancel_rx.clone(),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Non-blocking check of whether the context already finished.
    pub fn err(&self) -> Option<ContextError> {
        if let Some(rx) = &self.cancel_rx {
            if *rx.borrow() {
                return Some(ContextError::Cancelled);
            }
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(ContextError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Resolves once the context is cancelled or its deadline passes.
    /// Never resolves for a background context.
    pub async fn done(&self) -> ContextError {
        let deadline = async {
            match self.deadline {
                Some(deadline) => sleep_until(deadline).await,
                None => pending::<()>().await,
            }
        };

        let cancelled = async {
            match self.cancel_rx.clone() {
                Some(mut rx) => {
                    // Err means the handle was dropped without cancelling.
                    let closed = rx.wait_for(|cancelled| *cancelled).await.is_err();
                    if closed {
                        pending::<()>().await;
                    }
                }
                None => pending::<()>().await,
            }
        };

        tokio::select! {
            _ = cancelled => ContextError::Cancelled,
            _ = deadline => ContextError::DeadlineExceeded,
        }
    }
}
