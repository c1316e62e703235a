//! Error types for the WebAssembly bridge implementation

use thiserror::Error;
use wasm_bindgen::JsCast;

/// Result type for WebAssembly bridge operations
pub type WasmResult<T> = Result<T, WasmError>;

/// Errors that can occur in the WebAssembly bridge implementation
#[derive(Error, Debug)]
pub enum WasmError {
    /// IndexedDB operation failed
    #[error("IndexedDB error: {0}")]
    IndexedDb(String),

    /// JavaScript error from web-sys
    #[error("JavaScript error: {0}")]
    JavaScript(String),

    /// Serialization error at the record boundary
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<WasmError> for kvbridge_traits::BridgeError {
    fn from(err: WasmError) -> Self {
        kvbridge_traits::BridgeError::OperationFailed(err.to_string())
    }
}

impl From<wasm_bindgen::JsValue> for WasmError {
    fn from(js_value: wasm_bindgen::JsValue) -> Self {
        let msg = if js_value.is_string() {
            js_value
                .as_string()
                .unwrap_or_else(|| "Unknown error".to_string())
        } else if let Some(error) = js_value.dyn_ref::<js_sys::Error>() {
            error.message().into()
        } else {
            format!("{:?}", js_value)
        };
        WasmError::JavaScript(msg)
    }
}

pub(crate) fn serde_to_wasm_error(err: serde_wasm_bindgen::Error) -> WasmError {
    let io_err = std::io::Error::new(std::io::ErrorKind::Other, err.to_string());
    WasmError::Serialization(serde_json::Error::io(io_err))
}
