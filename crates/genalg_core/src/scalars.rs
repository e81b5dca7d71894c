//! `Number` implementations for the primitive float and complex types.

use crate::error::{AlgebraError, Result};
use crate::kinds::{BinaryKind, ComponentKind, StandardConstant, UnaryKind};
use crate::number::{ComponentCapability, ComponentNumber, Number};
use num_complex::Complex64;
use num_traits::Zero;
use std::cmp::Ordering;

impl Number for f64 {
    fn create(constant: StandardConstant) -> Self {
        match constant {
            StandardConstant::Zero | StandardConstant::NonRealUnitsOne => 0.0,
            _ => 1.0,
        }
    }

    fn supports_unary(_: UnaryKind) -> bool {
        true
    }

    fn supports_binary(kind: BinaryKind) -> bool {
        // atan2 goes through the facade's branch selection
        kind != BinaryKind::Atan2
    }

    fn invoke_unary(kind: UnaryKind, x: &Self) -> Result<Self> {
        let x = *x;
        Ok(match kind {
            UnaryKind::Negate => -x,
            UnaryKind::Inverse => x.recip(),
            UnaryKind::Conjugate => x,
            UnaryKind::Modulus => x.abs(),
            UnaryKind::Double => 2.0 * x,
            UnaryKind::Half => 0.5 * x,
            UnaryKind::Square => x * x,
            UnaryKind::SquareRoot => x.sqrt(),
            UnaryKind::Exp => x.exp(),
            UnaryKind::Log => x.ln(),
            UnaryKind::Sin => x.sin(),
            UnaryKind::Asin => x.asin(),
            UnaryKind::Cos => x.cos(),
            UnaryKind::Acos => x.acos(),
            UnaryKind::Tan => x.tan(),
            UnaryKind::Atan => x.atan(),
            UnaryKind::Sinh => x.sinh(),
            UnaryKind::Asinh => x.asinh(),
            UnaryKind::Cosh => x.cosh(),
            UnaryKind::Acosh => x.acosh(),
            UnaryKind::Tanh => x.tanh(),
            UnaryKind::Atanh => x.atanh(),
        })
    }

    fn invoke_binary(kind: BinaryKind, x: &Self, y: &Self) -> Result<Self> {
        match kind {
            BinaryKind::Add => Ok(x + y),
            BinaryKind::Subtract => Ok(x - y),
            BinaryKind::Multiply => Ok(x * y),
            BinaryKind::Divide => Ok(x / y),
            BinaryKind::Power => Ok(x.powf(*y)),
            BinaryKind::Atan2 => Err(AlgebraError::unsupported(kind, Self::type_name())),
        }
    }

    fn is_invertible(&self) -> bool {
        *self != 0.0 && !self.is_nan()
    }

    fn is_finite(&self) -> bool {
        f64::is_finite(*self)
    }

    fn compare(&self, other: &Self) -> Ordering {
        self.total_cmp(other)
    }

    fn dimension() -> Option<usize> {
        Some(1)
    }

    fn type_name() -> &'static str {
        "f64"
    }

    fn components() -> Option<ComponentCapability<Self>> {
        Some(ComponentCapability::of())
    }
}

impl ComponentNumber for f64 {
    type Primitive = f64;

    fn from_components(real: f64, _: f64, _: f64, _: f64) -> Self {
        real
    }

    fn component(&self, kind: ComponentKind) -> f64 {
        match kind {
            ComponentKind::Real => *self,
            _ => 0.0,
        }
    }
}

impl Number for Complex64 {
    fn create(constant: StandardConstant) -> Self {
        match constant {
            StandardConstant::Zero => Complex64::zero(),
            StandardConstant::RealOne | StandardConstant::SpecialOne => Complex64::new(1.0, 0.0),
            StandardConstant::NonRealUnitsOne => Complex64::new(0.0, 1.0),
            StandardConstant::UnitsOne
            | StandardConstant::CombinedOne
            | StandardConstant::AllOne => Complex64::new(1.0, 1.0),
        }
    }

    fn supports_unary(_: UnaryKind) -> bool {
        true
    }

    fn supports_binary(kind: BinaryKind) -> bool {
        kind != BinaryKind::Atan2
    }

    fn invoke_unary(kind: UnaryKind, x: &Self) -> Result<Self> {
        let z = *x;
        Ok(match kind {
            UnaryKind::Negate => -z,
            UnaryKind::Inverse => z.inv(),
            UnaryKind::Conjugate => z.conj(),
            UnaryKind::Modulus => Complex64::new(z.norm(), 0.0),
            UnaryKind::Double => z * 2.0,
            UnaryKind::Half => z * 0.5,
            UnaryKind::Square => z * z,
            UnaryKind::SquareRoot => z.sqrt(),
            UnaryKind::Exp => z.exp(),
            UnaryKind::Log => z.ln(),
            UnaryKind::Sin => z.sin(),
            UnaryKind::Asin => z.asin(),
            UnaryKind::Cos => z.cos(),
            UnaryKind::Acos => z.acos(),
            UnaryKind::Tan => z.tan(),
            UnaryKind::Atan => z.atan(),
            UnaryKind::Sinh => z.sinh(),
            UnaryKind::Asinh => z.asinh(),
            UnaryKind::Cosh => z.cosh(),
            UnaryKind::Acosh => z.acosh(),
            UnaryKind::Tanh => z.tanh(),
            UnaryKind::Atanh => z.atanh(),
        })
    }

    fn invoke_binary(kind: BinaryKind, x: &Self, y: &Self) -> Result<Self> {
        match kind {
            BinaryKind::Add => Ok(x + y),
            BinaryKind::Subtract => Ok(x - y),
            BinaryKind::Multiply => Ok(x * y),
            BinaryKind::Divide => Ok(x / y),
            BinaryKind::Power => Ok(x.powc(*y)),
            BinaryKind::Atan2 => Err(AlgebraError::unsupported(kind, Self::type_name())),
        }
    }

    fn is_invertible(&self) -> bool {
        !self.is_zero() && !self.is_nan()
    }

    fn is_finite(&self) -> bool {
        Complex64::is_finite(*self)
    }

    fn compare(&self, other: &Self) -> Ordering {
        self.re
            .total_cmp(&other.re)
            .then_with(|| self.im.total_cmp(&other.im))
    }

    fn dimension() -> Option<usize> {
        Some(2)
    }

    fn components() -> Option<ComponentCapability<Self>> {
        Some(ComponentCapability::of())
    }
}

impl ComponentNumber for Complex64 {
    type Primitive = f64;

    fn from_components(real: f64, other_units: f64, _: f64, _: f64) -> Self {
        Complex64::new(real, other_units)
    }

    fn component(&self, kind: ComponentKind) -> f64 {
        match kind {
            ComponentKind::Real => self.re,
            ComponentKind::OtherUnits => self.im,
            ComponentKind::SomeCombined | ComponentKind::AllCombined => 0.0,
        }
    }

    fn invoke_scalar(kind: BinaryKind, x: &Self, value: f64) -> Result<Self> {
        let z = *x;
        match kind {
            BinaryKind::Add => Ok(z + value),
            BinaryKind::Subtract => Ok(z - value),
            BinaryKind::Multiply => Ok(z * value),
            BinaryKind::Divide => Ok(z / value),
            BinaryKind::Power => Ok(z.powf(value)),
            BinaryKind::Atan2 => crate::algebra::atan2(x, &Complex64::new(value, 0.0)),
        }
    }
}
