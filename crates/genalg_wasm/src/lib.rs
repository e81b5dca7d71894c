//! WebAssembly bindings for `genalg_core`.
//!
//! Expressions are compiled once into operation values and evaluated or
//! differentiated at any of the runtime number kinds (`real`, `complex`,
//! `dual`). Results cross the boundary as serde-encoded `DynNumber`s.

mod derivative;
mod expression;

pub use derivative::{derivative, DerivativeRequest};
pub use expression::WasmExpression;

use wasm_bindgen::JsValue;

pub(crate) fn to_js_error(err: anyhow::Error) -> JsValue {
    JsValue::from_str(&format!("{:#}", err))
}
