//! Dual numbers over any [`Number`].
//!
//! `Dual { first, second }` represents `first + second·ε` with `ε² = 0`.
//! Because the inner type is itself a `Number`, duals nest: the inner
//! arithmetic goes back through [`crate::algebra`], so `Dual<Dual<f64>>`
//! carries a second-order tower without any extra code.
//!
//! Natively implemented: negate, inverse, conjugate, double, half, square,
//! sqrt, exp, log, sin, cos, tan, asin, acos, atan, asinh, acosh, atanh,
//! power and the four arithmetic operations. Sinh, cosh, tanh and atan2 come
//! from the facade's derived formulas; modulus is not defined.

use crate::algebra::{self as alg};
use crate::error::{AlgebraError, Result};
use crate::kinds::{BinaryKind, ComponentKind, StandardConstant, UnaryKind};
use crate::number::{ComponentCapability, ComponentNumber, Number};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dual<T> {
    /// Primal value.
    pub first: T,
    /// Tangent.
    pub second: T,
}

impl<T: Number> Dual<T> {
    pub fn new(first: T, second: T) -> Self {
        Self { first, second }
    }

    /// A value with zero tangent.
    pub fn constant(first: T) -> Self {
        Self {
            first,
            second: alg::zero(),
        }
    }

    /// Seeds the unit direction: `first = point`, `second = 1`.
    pub fn variable(point: T) -> Self {
        Self {
            first: point,
            second: alg::one(),
        }
    }

    pub fn first(&self) -> &T {
        &self.first
    }

    pub fn second(&self) -> &T {
        &self.second
    }

    pub fn into_parts(self) -> (T, T) {
        (self.first, self.second)
    }

    /// `f(a + bε) = f(a) + f'(a)·b·ε`.
    fn chain(&self, value: T, slope: T) -> Result<Self> {
        Ok(Self::new(value, alg::mul(&slope, &self.second)?))
    }
}

impl<T: Number> Number for Dual<T> {
    fn create(constant: StandardConstant) -> Self {
        Self::constant(T::create(constant))
    }

    fn supports_unary(kind: UnaryKind) -> bool {
        !matches!(
            kind,
            UnaryKind::Modulus | UnaryKind::Sinh | UnaryKind::Cosh | UnaryKind::Tanh
        )
    }

    fn supports_binary(kind: BinaryKind) -> bool {
        matches!(
            kind,
            BinaryKind::Add
                | BinaryKind::Subtract
                | BinaryKind::Multiply
                | BinaryKind::Divide
                | BinaryKind::Power
        )
    }

    fn invoke_unary(kind: UnaryKind, x: &Self) -> Result<Self> {
        let a = &x.first;
        let b = &x.second;
        match kind {
            UnaryKind::Negate => Ok(Self::new(alg::negate(a)?, alg::negate(b)?)),
            UnaryKind::Inverse => {
                let inv = alg::inverse(a)?;
                let slope = alg::negate(&alg::square(&inv)?)?;
                x.chain(inv, slope)
            }
            UnaryKind::Conjugate => Ok(Self::new(alg::conjugate(a)?, alg::conjugate(b)?)),
            UnaryKind::Double => Ok(Self::new(alg::double(a)?, alg::double(b)?)),
            UnaryKind::Half => Ok(Self::new(alg::half(a)?, alg::half(b)?)),
            UnaryKind::Square => {
                let slope = alg::double(a)?;
                x.chain(alg::square(a)?, slope)
            }
            UnaryKind::SquareRoot => {
                let root = alg::sqrt(a)?;
                let slope = alg::inverse(&alg::double(&root)?)?;
                x.chain(root, slope)
            }
            UnaryKind::Exp => {
                let e = alg::exp(a)?;
                x.chain(e.clone(), e)
            }
            UnaryKind::Log => x.chain(alg::log(a)?, alg::inverse(a)?),
            UnaryKind::Sin => x.chain(alg::sin(a)?, alg::cos(a)?),
            UnaryKind::Cos => x.chain(alg::cos(a)?, alg::negate(&alg::sin(a)?)?),
            UnaryKind::Tan => {
                let t = alg::tan(a)?;
                let slope = alg::add(&alg::one(), &alg::square(&t)?)?;
                x.chain(t, slope)
            }
            UnaryKind::Asin => {
                let slope = alg::inverse(&one_minus_square_root(a)?)?;
                x.chain(alg::asin(a)?, slope)
            }
            UnaryKind::Acos => {
                let slope = alg::negate(&alg::inverse(&one_minus_square_root(a)?)?)?;
                x.chain(alg::acos(a)?, slope)
            }
            UnaryKind::Atan => {
                let slope = alg::inverse(&alg::add(&alg::one(), &alg::square(a)?)?)?;
                x.chain(alg::atan(a)?, slope)
            }
            UnaryKind::Asinh => {
                let root = alg::sqrt(&alg::add(&alg::square(a)?, &alg::one())?)?;
                x.chain(alg::asinh(a)?, alg::inverse(&root)?)
            }
            UnaryKind::Acosh => {
                let root = alg::sqrt(&alg::sub(&alg::square(a)?, &alg::one())?)?;
                x.chain(alg::acosh(a)?, alg::inverse(&root)?)
            }
            UnaryKind::Atanh => {
                let slope = alg::inverse(&alg::sub(&alg::one(), &alg::square(a)?)?)?;
                x.chain(alg::atanh(a)?, slope)
            }
            UnaryKind::Modulus | UnaryKind::Sinh | UnaryKind::Cosh | UnaryKind::Tanh => {
                Err(AlgebraError::unsupported(kind, Self::type_name()))
            }
        }
    }

    fn invoke_binary(kind: BinaryKind, x: &Self, y: &Self) -> Result<Self> {
        let (a, b) = (&x.first, &x.second);
        let (c, d) = (&y.first, &y.second);
        match kind {
            BinaryKind::Add => Ok(Self::new(alg::add(a, c)?, alg::add(b, d)?)),
            BinaryKind::Subtract => Ok(Self::new(alg::sub(a, c)?, alg::sub(b, d)?)),
            BinaryKind::Multiply => {
                let tangent = alg::add(&alg::mul(a, d)?, &alg::mul(b, c)?)?;
                Ok(Self::new(alg::mul(a, c)?, tangent))
            }
            BinaryKind::Divide => {
                // (b·c - a·d) / c²
                let numerator = alg::sub(&alg::mul(b, c)?, &alg::mul(a, d)?)?;
                let tangent = alg::div(&numerator, &alg::square(c)?)?;
                Ok(Self::new(alg::div(a, c)?, tangent))
            }
            BinaryKind::Power => {
                // c·a^(c-1)·b, plus a^c·log(a)·d when the exponent varies.
                // A constant exponent never takes the log, so negative bases work.
                let value = alg::pow(a, c)?;
                let lowered = alg::pow(a, &alg::sub(c, &alg::one())?)?;
                let mut tangent = alg::mul(&alg::mul(c, &lowered)?, b)?;
                if !alg::equals(d, &alg::zero()) {
                    let log_term = alg::mul(&alg::mul(&value, &alg::log(a)?)?, d)?;
                    tangent = alg::add(&tangent, &log_term)?;
                }
                Ok(Self::new(value, tangent))
            }
            BinaryKind::Atan2 => Err(AlgebraError::unsupported(kind, Self::type_name())),
        }
    }

    fn is_invertible(&self) -> bool {
        self.first.is_invertible()
    }

    fn is_finite(&self) -> bool {
        self.first.is_finite() && self.second.is_finite()
    }

    fn compare(&self, other: &Self) -> Ordering {
        self.first
            .compare(&other.first)
            .then_with(|| self.second.compare(&other.second))
    }

    fn dimension() -> Option<usize> {
        T::dimension().map(|d| 2 * d)
    }

    fn components() -> Option<ComponentCapability<Self>> {
        let inner = T::components()?;
        Some(ComponentCapability::lifted(inner, Dual::constant, Dual::first))
    }
}

fn one_minus_square_root<T: Number>(a: &T) -> Result<T> {
    alg::sqrt(&alg::sub(&alg::one(), &alg::square(a)?)?)
}

/// Static component view for duals over a component type: components are
/// those of the primal value and scalars lift as constants.
impl<T: ComponentNumber> ComponentNumber for Dual<T> {
    type Primitive = T::Primitive;

    fn from_components(
        real: T::Primitive,
        other_units: T::Primitive,
        some_combined: T::Primitive,
        all_combined: T::Primitive,
    ) -> Self {
        Self::constant(T::from_components(
            real,
            other_units,
            some_combined,
            all_combined,
        ))
    }

    fn component(&self, kind: ComponentKind) -> T::Primitive {
        self.first.component(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-12,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn product_rule() {
        // f(x) = x·(x + 1), f'(3) = 7
        let x = Dual::variable(3.0);
        let y = alg::mul(&x, &alg::add(&x, &alg::one()).expect("add")).expect("mul");
        assert_eq!(y, Dual::new(12.0, 7.0));
    }

    #[test]
    fn quotient_rule() {
        // f(x) = 1 / x, f'(2) = -1/4
        let x = Dual::variable(2.0);
        let y = alg::div(&alg::one(), &x).expect("div");
        assert_close(y.first, 0.5);
        assert_close(y.second, -0.25);
    }

    #[test]
    fn power_rule_with_constant_exponent() {
        let x = Dual::variable(2.0);
        let three = Dual::constant(3.0);
        let y = alg::pow(&x, &three).expect("pow");
        assert_close(y.first, 8.0);
        assert_close(y.second, 12.0);
    }

    #[test]
    fn power_at_negative_base_stays_finite() {
        // f(x) = x^2 at x = -3: no log of the base is taken
        let y = alg::pow(&Dual::variable(-3.0), &Dual::constant(2.0)).expect("pow");
        assert_close(y.first, 9.0);
        assert_close(y.second, -6.0);

        let cube = alg::pow(&Dual::variable(-1.0), &Dual::constant(3.0)).expect("pow");
        assert_close(cube.first, -1.0);
        assert_close(cube.second, 3.0);
    }

    #[test]
    fn power_with_varying_exponent_adds_log_term() {
        // f(x) = 2^x, f'(x) = 2^x·ln 2
        let y = alg::pow(&Dual::constant(2.0), &Dual::variable(1.5_f64)).expect("pow");
        assert_close(y.first, 2.0_f64.powf(1.5));
        assert_close(y.second, 2.0_f64.powf(1.5) * 2.0_f64.ln());
    }

    #[test]
    fn hyperbolics_use_exponential_identities() {
        let x = Dual::variable(0.5_f64);
        let s = alg::sinh(&x).expect("sinh");
        let c = alg::cosh(&x).expect("cosh");
        let t = alg::tanh(&x).expect("tanh");
        assert_close(s.first, 0.5_f64.sinh());
        assert_close(s.second, 0.5_f64.cosh());
        assert_close(c.second, 0.5_f64.sinh());
        assert_close(t.second, 1.0 - 0.5_f64.tanh().powi(2));
    }

    #[test]
    fn modulus_is_unsupported() {
        let err = alg::modulus(&Dual::variable(1.0)).expect_err("no modulus");
        assert!(err.is_unsupported());
    }

    #[test]
    fn nested_duals_carry_second_derivative() {
        // x = 1.5 + ε1 + ε2, sin(x) has ε1ε2 coefficient -sin(1.5)
        let inner = Dual::variable(1.5_f64);
        let x = Dual::new(inner, alg::one());
        let y = alg::sin(&x).expect("sin");
        assert_close(y.first.first, 1.5_f64.sin());
        assert_close(y.second.first, 1.5_f64.cos());
        assert_close(y.second.second, -(1.5_f64.sin()));
    }

    #[test]
    fn component_view_reads_primal() {
        let x = Dual::new(2.5_f64, 7.0);
        assert_eq!(x.component(ComponentKind::Real), 2.5);
        let lifted = Dual::<f64>::from_primitive(4.0);
        assert_eq!(lifted, Dual::new(4.0, 0.0));
    }
}
