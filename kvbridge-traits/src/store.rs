//! Transactional key-value boundary surface.
//!
//! Defines the operations a host may call and the persisted record shape.
//! The operation surface is deliberately synchronous-looking: every call
//! returns immediately and asynchronous results land in poll handles
//! ([`PendingRead`]) or via a caller-supplied [`Waker`]. Implementations
//! never block.

use std::task::Waker;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::pending::PendingRead;

/// The persisted entity: a key-value pair.
///
/// This is the concrete serialization boundary between the host and the
/// storage engine. Keys are unique within the store (the store is keyed by
/// `key`); the persisted schema additionally carries a secondary, non-unique
/// index over `value` for lookup by value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Primary key, unique within the store.
    pub key: String,
    /// Payload. May be empty; emptiness is distinct from absence.
    pub value: String,
}

impl Record {
    /// Construct a record from borrowed parts.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Transactional key-value storage bridge.
///
/// At most one mutating transaction is live at any time; a second
/// [`start_transaction`](Self::start_transaction) while one is active returns
/// `false`, which is the entire backpressure signal - callers retry later.
/// Mutations buffered into the active transaction become durable all at once
/// when the transaction later settles with [`TxOutcome::Success`].
///
/// Reads bypass the mutating transaction entirely: they run against a fresh
/// read-only view and may not observe uncommitted buffered writes.
///
/// The trait is consumed without `Send` bounds; correctness of the single
/// active-transaction slot relies on the host's single-threaded event-loop
/// scheduling, not on locking.
///
/// [`TxOutcome::Success`]: crate::outcome::TxOutcome::Success
pub trait TransactionalKv {
    /// Open a mutating transaction over the store.
    ///
    /// Returns `false` without side effects if a transaction is already
    /// active ("busy, retry later"). On `true`, subsequent [`set`](Self::set)
    /// and [`remove`](Self::remove) calls buffer against the new transaction.
    fn start_transaction(&self) -> bool;

    /// Buffer an upsert of `{key, value}` into the active transaction.
    ///
    /// Not durable until the transaction settles successfully. Errors with
    /// [`BridgeError::TransactionInactive`] when called outside a
    /// transaction — that is a caller contract violation, not a recoverable
    /// state.
    ///
    /// [`BridgeError::TransactionInactive`]: crate::error::BridgeError::TransactionInactive
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Buffer a deletion of the record with the given key.
    ///
    /// Same precondition and error behavior as [`set`](Self::set).
    fn remove(&self, key: &str) -> Result<()>;

    /// Commit the active transaction, if any, and report the prior outcome.
    ///
    /// When a transaction is active, arranges exactly one future wake of
    /// `waker` once the commit settles (the engine auto-commits when no
    /// further operations are queued), records the new outcome, and clears
    /// the active slot. Tolerates being called with no active transaction.
    ///
    /// The returned bool reports whether the *previously* recorded outcome
    /// was already `Success` at call time - the new transaction's result
    /// arrives only via the wake. This dual signaling (immediate bool +
    /// eventual wake) lets a host without suspension support poll instead.
    fn finish_transaction(&self, waker: &Waker) -> bool;

    /// Issue an asynchronous point lookup against a fresh read-only view.
    ///
    /// Returns the handle immediately, before completion; the completion
    /// path settles it exactly once. A missing record settles the handle
    /// with its value absent - "not found" is not an error.
    fn get(&self, key: &str) -> Result<PendingRead>;

    /// Asynchronously destroy the entire named database, not just the store.
    ///
    /// Fire-and-forget: does not wait for completion and touches no
    /// in-memory state. An operation racing with an in-flight clear has
    /// unspecified outcome.
    fn clear(&self) -> Result<()>;
}
