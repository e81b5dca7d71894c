use genalg_core::{AlgebraError, BinaryKind, Number, Result, StandardConstant, UnaryKind};
use std::cmp::Ordering;

/// A real number with only a handful of native kinds, so most of the
/// facade runs through derived formulas. The tag only distinguishes types,
/// which keeps per-type caches independent between tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Restricted<const TAG: u8>(pub f64);

impl<const TAG: u8> Number for Restricted<TAG> {
    fn create(constant: StandardConstant) -> Self {
        Restricted(f64::create(constant))
    }

    fn supports_unary(kind: UnaryKind) -> bool {
        matches!(
            kind,
            UnaryKind::Negate
                | UnaryKind::Inverse
                | UnaryKind::Exp
                | UnaryKind::Log
                | UnaryKind::Sin
                | UnaryKind::Cos
                | UnaryKind::Atan
        )
    }

    fn supports_binary(kind: BinaryKind) -> bool {
        matches!(kind, BinaryKind::Add | BinaryKind::Multiply)
    }

    fn invoke_unary(kind: UnaryKind, x: &Self) -> Result<Self> {
        if !Self::supports_unary(kind) {
            return Err(AlgebraError::unsupported(kind, Self::type_name()));
        }
        f64::invoke_unary(kind, &x.0).map(Restricted)
    }

    fn invoke_binary(kind: BinaryKind, x: &Self, y: &Self) -> Result<Self> {
        if !Self::supports_binary(kind) {
            return Err(AlgebraError::unsupported(kind, Self::type_name()));
        }
        f64::invoke_binary(kind, &x.0, &y.0).map(Restricted)
    }

    fn is_invertible(&self) -> bool {
        self.0.is_invertible()
    }

    fn is_finite(&self) -> bool {
        self.0.is_finite()
    }

    fn compare(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }

    fn type_name() -> &'static str {
        "Restricted"
    }
}

pub fn assert_close(actual: f64, expected: f64, tol: f64) {
    assert!(
        (actual - expected).abs() < tol,
        "expected {expected}, got {actual}"
    );
}
