//! Compiled expression handle.

use crate::to_js_error;
use anyhow::Context;
use genalg_core::dispatch::{derivative_dyn, invoke_as, DynNumber, NumberKind};
use genalg_core::expression::Expression;
use genalg_core::operation::Operation;
use serde_wasm_bindgen::to_value;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct WasmExpression {
    expression: Expression,
}

#[wasm_bindgen]
impl WasmExpression {
    #[wasm_bindgen(constructor)]
    pub fn new(source: &str, var_names: Vec<String>) -> Result<WasmExpression, JsValue> {
        console_error_panic_hook::set_once();
        compile(source, &var_names).map_err(to_js_error)
    }

    /// Description of the compiled operation tree.
    pub fn describe(&self) -> String {
        self.operation().describe()
    }

    pub fn arity(&self) -> usize {
        self.operation().arity()
    }

    /// Evaluates at real arguments embedded into `kind`.
    pub fn evaluate(&self, kind: &str, args: Vec<f64>) -> Result<JsValue, JsValue> {
        let value = self.evaluate_reals(kind, &args).map_err(to_js_error)?;
        to_value(&value).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    /// `[f(x), f'(x), ..., f^(order)(x)]` for a single-variable expression.
    pub fn derivatives(&self, kind: &str, point: f64, order: i32) -> Result<JsValue, JsValue> {
        let values = self
            .derivatives_at(kind, point, order)
            .map_err(to_js_error)?;
        to_value(&values).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }
}

impl WasmExpression {
    pub(crate) fn operation(&self) -> &Operation {
        self.expression.operation()
    }

    fn evaluate_reals(&self, kind: &str, args: &[f64]) -> anyhow::Result<DynNumber> {
        let kind = parse_kind(kind)?;
        let args: Vec<DynNumber> = args.iter().map(|&x| DynNumber::from_real(kind, x)).collect();
        invoke_as(kind, self.operation(), &args)
            .with_context(|| format!("Failed to evaluate `{}`", self.expression.source()))
    }

    fn derivatives_at(&self, kind: &str, point: f64, order: i32) -> anyhow::Result<Vec<DynNumber>> {
        let kind = parse_kind(kind)?;
        let operation = self.operation();
        if operation.arity() > 1 {
            anyhow::bail!(
                "Derivatives need a single-variable expression, `{}` has {} variables.",
                self.expression.source(),
                operation.arity()
            );
        }
        let point = DynNumber::from_real(kind, point);
        derivative_dyn(operation, &point, i64::from(order))
            .with_context(|| format!("Failed to differentiate `{}`", self.expression.source()))
    }
}

pub(crate) fn compile(source: &str, var_names: &[String]) -> anyhow::Result<WasmExpression> {
    let expression = Expression::compile(source, var_names)
        .with_context(|| format!("Failed to parse `{}`", source))?;
    Ok(WasmExpression { expression })
}

pub(crate) fn parse_kind(kind: &str) -> anyhow::Result<NumberKind> {
    kind.parse::<NumberKind>()
        .with_context(|| format!("Unknown number kind `{}`", kind))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn compiles_and_describes() {
        let expression = compile("x * y", &vars(&["x", "y"])).expect("compile");
        assert_eq!(expression.describe(), "apply(mul, [_, _])");
        assert_eq!(expression.arity(), 2);
    }

    #[test]
    fn evaluates_at_each_kind() {
        let expression = compile("x^2 + 1", &vars(&["x"])).expect("compile");
        let real = expression.evaluate_reals("real", &[3.0]).expect("real");
        assert_eq!(real, DynNumber::Real(10.0));
        let complex = expression.evaluate_reals("complex", &[3.0]).expect("complex");
        match complex {
            DynNumber::Complex(z) => assert!((z.re - 10.0).abs() < 1e-12 && z.im.abs() < 1e-12),
            other => panic!("unexpected {other}"),
        }
    }

    #[test]
    fn unknown_kind_is_reported() {
        let expression = compile("x", &vars(&["x"])).expect("compile");
        let err = expression
            .evaluate_reals("quaternion", &[1.0])
            .expect_err("unknown kind");
        assert!(format!("{:#}", err).contains("Unknown number kind"));
    }

    #[test]
    fn derivatives_require_one_variable() {
        let expression = compile("x * y", &vars(&["x", "y"])).expect("compile");
        let err = expression
            .derivatives_at("real", 1.0, 1)
            .expect_err("two variables");
        assert!(err.to_string().contains("single-variable"));
    }

    #[test]
    fn real_derivatives_of_a_cubic() {
        let expression = compile("x * x * x", &vars(&["x"])).expect("compile");
        let values = expression.derivatives_at("real", 2.0, 3).expect("derivatives");
        let expected: Vec<DynNumber> = [8.0, 12.0, 12.0, 6.0]
            .into_iter()
            .map(DynNumber::Real)
            .collect();
        assert_eq!(values, expected);
    }

    #[test]
    fn real_derivatives_of_a_square_below_zero() {
        let expression = compile("x^2", &vars(&["x"])).expect("compile");
        let values = expression.derivatives_at("real", -3.0, 2).expect("derivatives");
        let expected: Vec<DynNumber> = [9.0, -6.0, 2.0]
            .into_iter()
            .map(DynNumber::Real)
            .collect();
        assert_eq!(values, expected);
    }
}
