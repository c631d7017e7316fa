//! Callback-to-future bridge.
//!
//! Each backend call is wrapped in a [`PendingOp`]: created when the call is
//! issued, settled exactly once when the backend fires its completion
//! callback, never reused. The `FnOnce` callback plus a oneshot channel make
//! double settlement unrepresentable.

use stash_core::{AreaCallback, Result, StoreError};
use tokio::sync::oneshot;

/// One in-flight backend call.
pub(crate) struct PendingOp<T> {
    rx: oneshot::Receiver<Result<T>>,
}

impl<T: Send + 'static> PendingOp<T> {
    /// Issue a backend call: hands `start` the completion callback and
    /// returns the handle to await.
    pub(crate) fn start(start: impl FnOnce(AreaCallback<T>)) -> Self {
        let (tx, rx) = oneshot::channel();
        start(Box::new(move |outcome| {
            // The awaiting side may already be gone; settlement is then moot.
            let _ = tx.send(outcome);
        }));
        Self { rx }
    }

    /// Wait for the backend to settle this operation.
    ///
    /// A backend that drops the callback without firing it settles as a
    /// backend error instead of suspending forever.
    pub(crate) async fn settled(self) -> Result<T> {
        self.rx.await.unwrap_or_else(|_| {
            Err(StoreError::Backend {
                message: "storage area dropped its completion callback".to_string(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn settles_with_success() {
        let op = PendingOp::start(|done| done(Ok(7u64)));
        assert_eq!(op.settled().await.unwrap(), 7);
    }

    #[tokio::test]
    async fn settles_with_backend_failure() {
        let op = PendingOp::<u64>::start(|done| {
            done(Err(StoreError::Backend {
                message: "boom".into(),
            }))
        });
        let err = op.settled().await.unwrap_err();
        assert_eq!(
            err,
            StoreError::Backend {
                message: "boom".into()
            }
        );
    }

    #[tokio::test]
    async fn dropped_callback_settles_as_error() {
        let op = PendingOp::<u64>::start(|done| drop(done));
        let err = op.settled().await.unwrap_err();
        assert!(matches!(err, StoreError::Backend { .. }));
    }

    #[tokio::test]
    async fn callback_fired_from_another_thread() {
        let op = PendingOp::start(|done| {
            std::thread::spawn(move || done(Ok("later".to_string())));
        });
        assert_eq!(op.settled().await.unwrap(), "later");
    }
}
