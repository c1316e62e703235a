//! One-time IndexedDB setup: database open/upgrade and deletion.
//!
//! The persisted schema is fixed: one record store keyed by the record's
//! `key` field, plus a secondary, non-unique index over `value`. Schema
//! creation happens inside the `upgradeneeded` handler on first open (or
//! after a version bump); everything else in this module is plumbing that
//! turns IndexedDB's callback pairs into awaitable promises.

use futures::channel::oneshot;
use std::sync::{Arc, Mutex};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    IdbDatabase, IdbFactory, IdbIndexParameters, IdbObjectStoreParameters, IdbOpenDbRequest,
    IdbRequest, IdbVersionChangeEvent,
};

use crate::error::{WasmError, WasmResult};

/// Name of the single record store.
pub const STORE_NAME: &str = "records";

/// Name of the secondary, non-unique index over the record `value` field.
pub const VALUE_INDEX: &str = "value";

/// Database schema version.
const DB_VERSION: f64 = 1.0;

/// Resolve the browser's IndexedDB factory.
pub(crate) fn idb_factory() -> WasmResult<IdbFactory> {
    let window = web_sys::window()
        .ok_or_else(|| WasmError::JavaScript("No window object available".to_string()))?;

    window
        .indexed_db()
        .map_err(WasmError::from)?
        .ok_or_else(|| WasmError::IndexedDb("IndexedDB not available".to_string()))
}

/// Open (and on first open, create) the named database.
pub(crate) async fn open_database(db_name: &str) -> WasmResult<IdbDatabase> {
    let open_request: IdbOpenDbRequest = idb_factory()?
        .open_with_f64(db_name, DB_VERSION)
        .map_err(WasmError::from)?;

    // Setup upgrade handler
    let (upgrade_tx, mut upgrade_rx) = oneshot::channel();
    let upgrade_tx = Arc::new(Mutex::new(Some(upgrade_tx)));

    let onupgradeneeded = Closure::once(move |event: IdbVersionChangeEvent| {
        let target = event.target().expect("Event should have a target");
        let request = target
            .dyn_ref::<IdbOpenDbRequest>()
            .expect("Target should be IdbOpenDbRequest");
        let db = request.result().unwrap().dyn_into::<IdbDatabase>().unwrap();

        if !db.object_store_names().contains(STORE_NAME) {
            let options = IdbObjectStoreParameters::new();
            options.set_key_path(&JsValue::from_str("key"));
            if let Ok(store) = db.create_object_store_with_optional_parameters(STORE_NAME, &options)
            {
                let index_options = IdbIndexParameters::new();
                index_options.set_unique(false);
                let _ = store.create_index_with_str_and_optional_parameters(
                    VALUE_INDEX,
                    "value",
                    &index_options,
                );
            }
        }

        if let Some(tx) = upgrade_tx.lock().unwrap().take() {
            let _ = tx.send(());
        }
    });

    open_request.set_onupgradeneeded(Some(onupgradeneeded.as_ref().unchecked_ref()));
    onupgradeneeded.forget();

    // Wait for success
    let promise = request_to_promise(&open_request);
    let result = JsFuture::from(promise).await?;

    // The upgrade handler, if it fired at all, ran before success was
    // delivered on the same request; drain the rendezvous without blocking
    // so a plain reopen (no upgrade) cannot wedge the open.
    let _ = upgrade_rx.try_recv();

    result
        .dyn_into::<IdbDatabase>()
        .map_err(|_| WasmError::IndexedDb("Failed to cast result to IdbDatabase".to_string()))
}

/// Asynchronously destroy the named database.
///
/// Fire-and-forget: the returned deletion request is dropped without
/// observers. The engine queues the delete behind any open connections and
/// pending opens, so a subsequent re-open observes an empty database.
pub(crate) fn delete_database(db_name: &str) -> WasmResult<()> {
    idb_factory()?
        .delete_database(db_name)
        .map_err(WasmError::from)?;
    Ok(())
}

/// Convert an IDB request's success/error callback pair into a Promise.
pub(crate) fn request_to_promise(request: &IdbRequest) -> js_sys::Promise {
    js_sys::Promise::new(&mut |resolve, reject| {
        let request_clone = request.clone();
        let onsuccess = Closure::once(move || {
            let result = request_clone.result().unwrap_or(JsValue::UNDEFINED);
            let _ = resolve.call1(&JsValue::NULL, &result);
        });
        request.set_onsuccess(Some(onsuccess.as_ref().unchecked_ref()));
        onsuccess.forget();

        let request_clone = request.clone();
        let onerror = Closure::once(move || {
            let error = request_clone
                .error()
                .ok()
                .flatten()
                .map(JsValue::from)
                .unwrap_or_else(|| JsValue::from_str("IndexedDB request failed"));
            let _ = reject.call1(&JsValue::NULL, &error);
        });
        request.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        onerror.forget();
    })
}
