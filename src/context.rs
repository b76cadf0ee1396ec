//! # Context
//!
//! Per-call context carried through fetch, publish and configure operations.
//! Holds the cancellation token of the reconcile that issued the call; the
//! token forms a tree, so cancelling a parent cancels every child.

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::connection::ConnectionError;

#[derive(Debug, Clone, Default)]
pub struct Context {
    cancellation: CancellationToken,
}

impl Context {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Context driven by an existing token (e.g. the reconciler's shutdown token)
    #[must_use]
    pub fn with_cancellation(cancellation: CancellationToken) -> Self {
        Self { cancellation }
    }

    /// Child context, cancelled together with this one but cancellable alone
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            cancellation: self.cancellation.child_token(),
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    /// Fail with [`ConnectionError::Cancelled`] if the context is cancelled
    ///
    /// # Errors
    /// Returns `Cancelled` once the token has fired.
    pub fn ensure_active(&self) -> Result<(), ConnectionError> {
        if self.is_cancelled() {
            return Err(ConnectionError::Cancelled);
        }
        Ok(())
    }

    /// Drive `fut` to completion unless the context is cancelled first.
    /// A cancelled future is dropped without being polled again.
    ///
    /// # Errors
    /// Returns `Cancelled` if the token fires before `fut` completes.
    pub async fn run<F>(&self, fut: F) -> Result<F::Output, ConnectionError>
    where
        F: Future,
    {
        tokio::select! {
            biased;
            () = self.cancellation.cancelled() => Err(ConnectionError::Cancelled),
            out = fut => Ok(out),
        }
    }
}
