//! WebAssembly Transactional Key-Value Bridge
//!
//! This crate implements the `kvbridge-traits` contract on top of the
//! browser's IndexedDB, through `web-sys` and `wasm-bindgen`. It reconciles
//! two mismatched concurrency models: the host calls synchronous-looking
//! functions and polls (or is woken) for completion, while IndexedDB is
//! callback driven and allows one active readwrite transaction at a time.
//!
//! # Platform Support
//!
//! This crate is designed exclusively for the `wasm32-unknown-unknown`
//! target. It will not compile for native targets.
//!
//! # Examples
//!
//! ```ignore
//! use kvbridge_wasm::{IdbKvBridge, KvBridgeConfig};
//!
//! async fn save(bridge: &IdbKvBridge) -> kvbridge_traits::Result<()> {
//!     bridge
//!         .run_transaction(|| async {
//!             let _ = bridge.set("player", "0,0");
//!             let _ = bridge.remove("stale");
//!         })
//!         .await?;
//!     let position = bridge.get_value("player").await?;
//!     // ... position is Some("0,0") once the commit settled
//!     Ok(())
//! }
//! ```

#![cfg(target_arch = "wasm32")]
#![warn(missing_docs)]

pub mod adapter;
pub mod database;
pub mod error;
pub mod future;

// Re-export commonly used types
pub use adapter::{IdbKvBridge, KvBridgeConfig};
pub use error::{WasmError, WasmResult};
pub use future::Commit;
pub use kvbridge_traits::{PendingRead, TransactionalKv, TxOutcome};
