//! Single-assignment completion slot for in-flight lookups.

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

/// Handle to an in-flight point lookup.
///
/// A `PendingRead` is created not-done by the read request and completed
/// exactly once by the asynchronous completion path, never mutated again.
/// "Not found" and "found" are distinguished by presence of the value, not
/// by a sentinel.
///
/// Callers either poll [`is_done`](Self::is_done) before reading
/// [`value`](Self::value), or await the handle directly: `PendingRead`
/// implements `Future`, registering the task's waker while the lookup is
/// outstanding.
///
/// Handles are cheaply cloneable; all clones observe the same slot. The type
/// is `Rc`-based and bound to the single-threaded host contract.
#[derive(Clone, Default)]
pub struct PendingRead {
    slot: Rc<RefCell<ReadSlot>>,
}

#[derive(Default)]
struct ReadSlot {
    done: bool,
    value: Option<String>,
    waker: Option<Waker>,
}

impl PendingRead {
    /// Create a not-yet-completed handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the lookup has settled.
    pub fn is_done(&self) -> bool {
        self.slot.borrow().done
    }

    /// The looked-up value, if the lookup settled and found a record.
    ///
    /// Meaningless before [`is_done`](Self::is_done) reports `true`.
    pub fn value(&self) -> Option<String> {
        self.slot.borrow().value.clone()
    }

    /// Settle the lookup with the value found, if any.
    ///
    /// Exactly-once mutation is a hard invariant of the completion path; a
    /// second call is a bug in the caller and is ignored outside debug
    /// builds. Wakes the registered waker, if any.
    pub fn complete(&self, value: Option<String>) {
        let waker = {
            let mut slot = self.slot.borrow_mut();
            debug_assert!(!slot.done, "PendingRead completed twice");
            if slot.done {
                return;
            }
            slot.value = value;
            slot.done = true;
            slot.waker.take()
        };
        // Wake outside the borrow: the woken task may poll re-entrantly.
        if let Some(waker) = waker {
            waker.wake();
        }
    }
}

impl Future for PendingRead {
    type Output = Option<String>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut slot = self.slot.borrow_mut();
        if slot.done {
            Poll::Ready(slot.value.clone())
        } else {
            slot.waker = Some(cx.waker().clone());
            Poll::Pending
        }
    }
}

impl std::fmt::Debug for PendingRead {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slot = self.slot.borrow();
        f.debug_struct("PendingRead")
            .field("done", &slot.done)
            .field("value", &slot.value)
            .finish()
    }
}
