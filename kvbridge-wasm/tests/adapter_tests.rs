#![cfg(target_arch = "wasm32")]
//! Integration tests for the IndexedDB transaction bridge.
//!
//! These run in a browser (`wasm-pack test --headless`) against a real
//! IndexedDB instance, one uniquely named database per test.

use futures::task::noop_waker;
use kvbridge_traits::{BridgeError, TxOutcome};
use kvbridge_wasm::{IdbKvBridge, KvBridgeConfig};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn unique_namespace(prefix: &str) -> String {
    format!("{prefix}-{}", js_sys::Date::now())
}

async fn bridge(prefix: &str) -> IdbKvBridge {
    console_error_panic_hook::set_once();
    IdbKvBridge::new(KvBridgeConfig::new(unique_namespace(prefix)))
        .await
        .expect("bridge init")
}

/// Last-write-wins within one transaction: after a successful commit, each
/// key holds exactly the last value buffered for it.
#[wasm_bindgen_test]
async fn last_buffered_write_wins() {
    let bridge = bridge("lww").await;

    assert!(bridge.start_transaction());
    bridge.set("player", "v1").expect("set v1");
    bridge.set("player", "v2").expect("set v2");
    bridge.set("doomed", "x").expect("set doomed");
    bridge.remove("doomed").expect("remove doomed");
    bridge.commit().await;

    assert_eq!(bridge.last_outcome(), TxOutcome::Success);
    assert_eq!(
        bridge.get_value("player").await.expect("get player"),
        Some("v2".to_string())
    );
    assert_eq!(bridge.get_value("doomed").await.expect("get doomed"), None);
}

/// A second start while one transaction is active returns `false` and leaves
/// the original transaction's buffered operations unaffected.
#[wasm_bindgen_test]
async fn second_start_is_rejected() {
    let bridge = bridge("busy").await;

    assert!(bridge.start_transaction());
    bridge.set("key", "value").expect("set");
    assert!(!bridge.start_transaction());
    bridge.set("other", "kept").expect("set after rejected start");
    bridge.commit().await;

    assert_eq!(
        bridge.get_value("key").await.expect("get key"),
        Some("value".to_string())
    );
    assert_eq!(
        bridge.get_value("other").await.expect("get other"),
        Some("kept".to_string())
    );
}

/// `finish_transaction` with no active transaction reports the previously
/// recorded outcome and has no other side effect.
#[wasm_bindgen_test]
async fn finish_without_active_reports_prior_outcome() {
    let bridge = bridge("finish-idle").await;
    let waker = noop_waker();

    // Nothing has ever completed: outcome is Unknown.
    assert!(!bridge.finish_transaction(&waker));
    assert_eq!(bridge.last_outcome(), TxOutcome::Unknown);

    assert!(bridge.start_transaction());
    bridge.set("k", "v").expect("set");
    bridge.commit().await;

    // Now the prior outcome is Success, with or without an active slot.
    assert!(bridge.finish_transaction(&waker));
    assert_eq!(bridge.last_outcome(), TxOutcome::Success);
    assert_eq!(
        bridge.get_value("k").await.expect("get"),
        Some("v".to_string())
    );
}

/// The dual signal preserved at the boundary: finishing a *new* transaction
/// after a successful one reports `true` immediately, for the prior outcome,
/// while the new commit settles later via the waker.
#[wasm_bindgen_test]
async fn finish_reports_prior_outcome_for_new_transaction() {
    let bridge = bridge("dual-signal").await;

    assert!(bridge.start_transaction());
    bridge.set("first", "1").expect("set");
    bridge.commit().await;
    assert_eq!(bridge.last_outcome(), TxOutcome::Success);

    assert!(bridge.start_transaction());
    bridge.set("second", "2").expect("set");
    assert!(bridge.finish_transaction(&noop_waker()));
}

/// A lookup for a key never written settles with the value absent.
#[wasm_bindgen_test]
async fn get_missing_key_settles_absent() {
    let bridge = bridge("missing").await;

    let pending = bridge.get("never-written").expect("issue lookup");
    assert_eq!(pending.await, None);
}

/// Round-trip through the async facade: set inside a transaction, await the
/// commit, then read the value back.
#[wasm_bindgen_test]
async fn set_commit_get_round_trip() {
    let bridge = bridge("round-trip").await;

    bridge
        .run_transaction(|| async {
            bridge.set("save", "state").expect("set");
        })
        .await
        .expect("run transaction");

    assert_eq!(
        bridge.get_value("save").await.expect("get"),
        Some("state".to_string())
    );
}

/// `run_transaction` surfaces the busy signal as an error.
#[wasm_bindgen_test]
async fn run_transaction_errors_when_busy() {
    let bridge = bridge("facade-busy").await;

    assert!(bridge.start_transaction());
    let err = bridge
        .run_transaction(|| async {})
        .await
        .expect_err("busy facade call");
    assert!(matches!(err, BridgeError::OperationFailed(_)));
    bridge.commit().await;
}

/// Mutations outside a transaction violate the caller contract and error.
#[wasm_bindgen_test]
async fn mutation_without_transaction_errors() {
    let bridge = bridge("misuse").await;

    assert!(matches!(
        bridge.set("k", "v"),
        Err(BridgeError::TransactionInactive)
    ));
    assert!(matches!(
        bridge.remove("k"),
        Err(BridgeError::TransactionInactive)
    ));
}

/// An empty payload is a present value, distinct from a missing record.
#[wasm_bindgen_test]
async fn empty_value_is_found_not_absent() {
    let bridge = bridge("empty").await;

    assert!(bridge.start_transaction());
    bridge.set("empty", "").expect("set empty");
    bridge.commit().await;

    assert_eq!(
        bridge.get_value("empty").await.expect("get"),
        Some(String::new())
    );
}

/// `clear` destroys the whole database; a fresh connection to the same name
/// observes an empty store. The engine queues the deletion behind the open
/// connection, so the bridge is closed first and the re-open after `clear`
/// is what guarantees settling.
#[wasm_bindgen_test]
async fn clear_empties_the_store() {
    console_error_panic_hook::set_once();
    let namespace = unique_namespace("clear");
    let bridge = IdbKvBridge::new(KvBridgeConfig::new(namespace.clone()))
        .await
        .expect("bridge init");

    assert!(bridge.start_transaction());
    bridge.set("k", "v").expect("set");
    bridge.commit().await;
    assert_eq!(
        bridge.get_value("k").await.expect("get"),
        Some("v".to_string())
    );

    bridge.close();
    bridge.clear().expect("clear");

    let reopened = IdbKvBridge::new(KvBridgeConfig::new(namespace))
        .await
        .expect("reopen after clear");
    assert_eq!(reopened.get_value("k").await.expect("get after clear"), None);
}
