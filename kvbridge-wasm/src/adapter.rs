//! The Transaction Adapter: IndexedDB-backed implementation of the
//! transactional key-value bridge.
//!
//! An [`IdbKvBridge`] owns the open database handle, the single
//! active-transaction slot, and the last-known transaction outcome. The slot
//! is an owned `RefCell<Option<..>>` rather than ambient global state; its
//! correctness relies on the wasm single-threaded event-loop contract - the
//! engine never delivers a completion callback concurrently with a host
//! call - and on [`start_transaction`](IdbKvBridge::start_transaction)'s
//! busy check being the sole mutual-exclusion mechanism.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::task::Waker;

use tracing::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{IdbDatabase, IdbObjectStore, IdbTransaction, IdbTransactionMode};

use kvbridge_traits::{
    BridgeError, PendingRead, Record, Result as BridgeResult, TransactionalKv, TxOutcome,
};

use crate::database::{self, STORE_NAME};
use crate::error::{serde_to_wasm_error, WasmError, WasmResult};

/// Configuration for [`IdbKvBridge`].
#[derive(Debug, Clone)]
pub struct KvBridgeConfig {
    /// Logical namespace used to derive the database name, so multiple host
    /// shells can coexist without clobbering each other's data.
    pub namespace: String,
}

impl KvBridgeConfig {
    /// Create a new config using the provided namespace.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    /// The derived IndexedDB database name.
    pub fn database_name(&self) -> String {
        format!("{}-kv", self.namespace)
    }
}

impl Default for KvBridgeConfig {
    fn default() -> Self {
        Self::new("kvbridge")
    }
}

/// The single in-flight mutating transaction.
///
/// Holds both the engine transaction (for settling observers) and its store
/// cursor (for buffering mutations).
struct ActiveTransaction {
    transaction: IdbTransaction,
    store: IdbObjectStore,
}

/// IndexedDB-backed transactional key-value bridge.
///
/// See [`TransactionalKv`] for the operation contract. The bridge never
/// blocks: every call returns immediately and asynchronous results land in
/// [`PendingRead`] handles or via a caller-supplied [`Waker`].
pub struct IdbKvBridge {
    db: IdbDatabase,
    config: KvBridgeConfig,
    active: RefCell<Option<ActiveTransaction>>,
    outcome: Rc<Cell<TxOutcome>>,
}

impl IdbKvBridge {
    /// Open (creating on first use) the namespaced database and build the
    /// bridge around it.
    ///
    /// # Errors
    ///
    /// Returns an error if IndexedDB is not available or the open/upgrade
    /// fails.
    pub async fn new(config: KvBridgeConfig) -> WasmResult<Self> {
        let db = database::open_database(&config.database_name()).await?;
        debug!(database = %config.database_name(), "opened key-value bridge");

        Ok(Self {
            db,
            config,
            active: RefCell::new(None),
            outcome: Rc::new(Cell::new(TxOutcome::Unknown)),
        })
    }

    /// The last-known outcome of a completed transaction.
    ///
    /// `Unknown` until the first transaction ever settles; overwritten each
    /// time one does. Starting a new transaction does not reset it.
    pub fn last_outcome(&self) -> TxOutcome {
        self.outcome.get()
    }

    /// Close the underlying database connection.
    ///
    /// Required before [`clear`](Self::clear) can make progress: the engine
    /// queues database deletion behind open connections.
    pub fn close(&self) {
        self.db.close();
    }

    /// See [`TransactionalKv::start_transaction`].
    pub fn start_transaction(&self) -> bool {
        if self.active.borrow().is_some() {
            // Already running a transaction; the caller retries later.
            return false;
        }

        let transaction = match self
            .db
            .transaction_with_str_and_mode(STORE_NAME, IdbTransactionMode::Readwrite)
        {
            Ok(transaction) => transaction,
            Err(err) => {
                warn!(error = ?WasmError::from(err), "failed to open readwrite transaction");
                return false;
            }
        };
        let store = match transaction.object_store(STORE_NAME) {
            Ok(store) => store,
            Err(err) => {
                warn!(error = ?WasmError::from(err), "failed to open record store");
                return false;
            }
        };

        // Settling observers record the outcome. A transaction ends in
        // exactly one of complete or abort; error events may precede the
        // abort.
        let outcome = Rc::clone(&self.outcome);
        let oncomplete = Closure::once(move || {
            outcome.set(TxOutcome::Success);
        });
        transaction.set_oncomplete(Some(oncomplete.as_ref().unchecked_ref()));
        oncomplete.forget();

        // Request error events bubble to the transaction once per failed
        // request, and the abort that follows errors any still-outstanding
        // requests too, so this observer can fire several times.
        let outcome = Rc::clone(&self.outcome);
        let onerror = Closure::wrap(Box::new(move || {
            warn!("transaction request errored");
            outcome.set(TxOutcome::Error);
        }) as Box<dyn FnMut()>);
        transaction.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        onerror.forget();

        let outcome = Rc::clone(&self.outcome);
        let onabort = Closure::once(move || {
            warn!("transaction aborted");
            outcome.set(TxOutcome::Abort);
        });
        transaction.set_onabort(Some(onabort.as_ref().unchecked_ref()));
        onabort.forget();

        *self.active.borrow_mut() = Some(ActiveTransaction { transaction, store });
        true
    }

    /// See [`TransactionalKv::set`].
    pub fn set(&self, key: &str, value: &str) -> BridgeResult<()> {
        let record = Record::new(key, value);
        let js_record =
            serde_wasm_bindgen::to_value(&record).map_err(serde_to_wasm_error)?;

        let active = self.active.borrow();
        let active = active.as_ref().ok_or(BridgeError::TransactionInactive)?;
        active.store.put(&js_record).map_err(WasmError::from)?;
        Ok(())
    }

    /// See [`TransactionalKv::remove`].
    pub fn remove(&self, key: &str) -> BridgeResult<()> {
        let active = self.active.borrow();
        let active = active.as_ref().ok_or(BridgeError::TransactionInactive)?;
        active
            .store
            .delete(&JsValue::from_str(key))
            .map_err(WasmError::from)?;
        Ok(())
    }

    /// See [`TransactionalKv::finish_transaction`].
    pub fn finish_transaction(&self, waker: &Waker) -> bool {
        if let Some(active) = self.active.borrow_mut().take() {
            // Replace the settling observer with one that also wakes the
            // suspended caller. Dropping the store/transaction handles lets
            // the engine auto-commit once the buffered queue drains.
            let outcome = Rc::clone(&self.outcome);
            let waker = waker.clone();
            let oncomplete = Closure::once(move || {
                outcome.set(TxOutcome::Success);
                waker.wake();
            });
            active
                .transaction
                .set_oncomplete(Some(oncomplete.as_ref().unchecked_ref()));
            oncomplete.forget();
            debug!("transaction committing");
        }

        // The bool reports the previous outcome; the new transaction's
        // result arrives only via the wake arranged above.
        self.outcome.get().is_success()
    }

    /// See [`TransactionalKv::get`].
    pub fn get(&self, key: &str) -> BridgeResult<PendingRead> {
        let transaction = self
            .db
            .transaction_with_str(STORE_NAME)
            .map_err(WasmError::from)?;
        let store = transaction.object_store(STORE_NAME).map_err(WasmError::from)?;
        let request = store
            .get(&JsValue::from_str(key))
            .map_err(WasmError::from)?;

        let pending = PendingRead::new();

        let slot = pending.clone();
        let request_clone = request.clone();
        let onsuccess = Closure::once(move || {
            let result = request_clone.result().unwrap_or(JsValue::UNDEFINED);
            let value = if result.is_undefined() || result.is_null() {
                None
            } else {
                match serde_wasm_bindgen::from_value::<Record>(result) {
                    Ok(record) => Some(record.value),
                    Err(err) => {
                        warn!(error = %err, "malformed record; treating as absent");
                        None
                    }
                }
            };
            slot.complete(value);
        });
        request.set_onsuccess(Some(onsuccess.as_ref().unchecked_ref()));
        onsuccess.forget();

        let slot = pending.clone();
        let onerror = Closure::once(move || {
            warn!("point lookup failed; settling handle with no value");
            slot.complete(None);
        });
        request.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        onerror.forget();

        Ok(pending)
    }

    /// See [`TransactionalKv::clear`].
    pub fn clear(&self) -> BridgeResult<()> {
        debug!(database = %self.config.database_name(), "destroying database");
        database::delete_database(&self.config.database_name())?;
        Ok(())
    }
}

impl TransactionalKv for IdbKvBridge {
    fn start_transaction(&self) -> bool {
        IdbKvBridge::start_transaction(self)
    }

    fn set(&self, key: &str, value: &str) -> BridgeResult<()> {
        IdbKvBridge::set(self, key, value)
    }

    fn remove(&self, key: &str) -> BridgeResult<()> {
        IdbKvBridge::remove(self, key)
    }

    fn finish_transaction(&self, waker: &Waker) -> bool {
        IdbKvBridge::finish_transaction(self, waker)
    }

    fn get(&self, key: &str) -> BridgeResult<PendingRead> {
        IdbKvBridge::get(self, key)
    }

    fn clear(&self) -> BridgeResult<()> {
        IdbKvBridge::clear(self)
    }
}
