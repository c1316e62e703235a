//! Async facade over the poll/waker boundary surface.
//!
//! The raw bridge operations return immediately and signal completion
//! through wakers and [`PendingRead`] handles; this module wraps them in
//! futures so async hosts can simply `.await`.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use kvbridge_traits::{BridgeError, PendingRead, Result as BridgeResult};

use crate::adapter::IdbKvBridge;

/// Future that commits the active transaction.
///
/// Each poll calls [`finish_transaction`](IdbKvBridge::finish_transaction)
/// with the task's waker and resolves once it reports a successful outcome.
/// It inherits the boundary's dual-signal behavior: the reported bool is the
/// *previously* recorded outcome, so when the prior transaction succeeded
/// the future resolves on its first poll, before the new commit settles.
/// That matches the observed host contract and is deliberate; hosts that
/// need strict settling must track outcomes across commits.
pub struct Commit<'a> {
    bridge: &'a IdbKvBridge,
}

impl Future for Commit<'_> {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.bridge.finish_transaction(cx.waker()) {
            Poll::Ready(())
        } else {
            Poll::Pending
        }
    }
}

impl IdbKvBridge {
    /// Commit the active transaction, resolving per the [`Commit`] contract.
    pub fn commit(&self) -> Commit<'_> {
        Commit { bridge: self }
    }

    /// Run a batch of buffered mutations as one atomic transaction.
    ///
    /// Starts a transaction (erroring if one is already active), runs the
    /// caller's closure - which issues [`set`](Self::set) /
    /// [`remove`](Self::remove) calls against this bridge - and then awaits
    /// [`commit`](Self::commit).
    pub async fn run_transaction<F, Fut>(&self, f: F) -> BridgeResult<()>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ()>,
    {
        if !self.start_transaction() {
            return Err(BridgeError::OperationFailed(
                "a transaction is already active".to_string(),
            ));
        }
        f().await;
        self.commit().await;
        Ok(())
    }

    /// Look up a key and await the settled value.
    ///
    /// Convenience over [`get`](Self::get) + awaiting the [`PendingRead`].
    pub async fn get_value(&self, key: &str) -> BridgeResult<Option<String>> {
        let pending: PendingRead = self.get(key)?;
        Ok(pending.await)
    }
}
