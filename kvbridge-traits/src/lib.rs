//! # Transactional Key-Value Bridge Contract
//!
//! Platform-agnostic contract for bridging a WebAssembly host application to
//! an asynchronous, transactional key-value storage engine (on the web, the
//! browser's IndexedDB).
//!
//! ## Overview
//!
//! The storage engine is callback driven and allows only one active readwrite
//! transaction at a time, while the host expects to call functions and poll
//! (or be woken) for completion. This crate defines the boundary between the
//! two concurrency models:
//!
//! - [`TransactionalKv`](store::TransactionalKv) - the host-callable operation
//!   surface (start/finish transaction, get, set, remove, clear)
//! - [`PendingRead`](pending::PendingRead) - a single-assignment completion
//!   slot for in-flight lookups, usable as a `Future`
//! - [`TxOutcome`](outcome::TxOutcome) - the last-known result of a completed
//!   transaction
//!
//! Implementations live in platform crates (`kvbridge-wasm` for browsers).
//!
//! ## Concurrency Contract
//!
//! All types here assume a single-threaded, cooperative, event-loop host:
//! completion callbacks are never delivered concurrently with host calls.
//! Shared state is therefore `Rc`-based and implementations are consumed
//! without `Send` bounds.
//!
//! ## Error Handling
//!
//! Operations use [`BridgeError`](error::BridgeError). Engine-level failures
//! of a transaction are *not* propagated as errors; they collapse into the
//! [`TxOutcome`](outcome::TxOutcome) recorded when the transaction settles,
//! and the host inspects that outcome.

pub mod error;
pub mod outcome;
pub mod pending;
pub mod store;

pub use error::{BridgeError, Result};
pub use outcome::TxOutcome;
pub use pending::PendingRead;
pub use store::{Record, TransactionalKv};
