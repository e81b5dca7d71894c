//! One-shot derivative requests described as data.

use crate::expression::compile;
use crate::to_js_error;
use anyhow::Context;
use genalg_core::dispatch::{derivative_dyn, DynNumber};
use serde::{Deserialize, Serialize};
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivativeRequest {
    pub expression: String,
    pub variable: String,
    pub point: DynNumber,
    pub order: i64,
}

/// Evaluates a serialized `DerivativeRequest`, returning the derivatives
/// `0..=order` as serialized `DynNumber`s.
#[wasm_bindgen]
pub fn derivative(request: JsValue) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();
    let request: DerivativeRequest = from_value(request)
        .map_err(|e| JsValue::from_str(&format!("Invalid derivative request: {}", e)))?;
    let values = run(&request).map_err(to_js_error)?;
    to_value(&values).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

pub(crate) fn run(request: &DerivativeRequest) -> anyhow::Result<Vec<DynNumber>> {
    let compiled = compile(&request.expression, std::slice::from_ref(&request.variable))?;
    let operation = compiled.operation();
    derivative_dyn(operation, &request.point, request.order).with_context(|| {
        format!(
            "Failed to differentiate `{}` with respect to `{}`",
            request.expression, request.variable
        )
    })
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::wasm_bindgen_test;

    #[wasm_bindgen_test]
    fn request_crosses_the_js_boundary() {
        let request = DerivativeRequest {
            expression: "x * x".to_string(),
            variable: "x".to_string(),
            point: DynNumber::Real(4.0),
            order: 1,
        };
        let result = derivative(to_value(&request).expect("request")).expect("derivative");
        let values: Vec<DynNumber> = from_value(result).expect("values");
        assert_eq!(values, vec![DynNumber::Real(16.0), DynNumber::Real(8.0)]);
    }

    #[wasm_bindgen_test]
    fn malformed_requests_are_rejected() {
        let result = derivative(JsValue::from_str("not a request"));
        let message = result
            .err()
            .and_then(|err| err.as_string())
            .unwrap_or_default();
        assert!(message.contains("Invalid derivative request"));
    }
}
