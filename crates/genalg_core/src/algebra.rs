//! The public function library over any [`Number`].
//!
//! Every function looks up the memoized capability table of `T` and calls
//! the native implementation when the type declares one. Otherwise it falls
//! back to a derived formula built from more primitive operations, or fails
//! with `UnsupportedOperation` when no formula applies.
//!
//! Derived formulas that could loop back on themselves (negate via subtract,
//! subtract via negate, ...) only call the *native* form of the operation
//! they depend on.

use crate::error::{AlgebraError, Result};
use crate::kinds::{BinaryKind, ComponentKind, NullaryKind, StandardConstant, UnaryKind};
use crate::number::{ComponentNumber, Number};
use crate::registry;
use std::cmp::Ordering;
use tracing::trace;

// --- generic entry points ---

pub fn unary<T: Number>(kind: UnaryKind, x: &T) -> Result<T> {
    if registry::capabilities::<T>().supports_unary(kind) {
        T::invoke_unary(kind, x)
    } else {
        trace!(operation = %kind, type_name = T::type_name(), "derived unary");
        derived_unary(kind, x)
    }
}

pub fn binary<T: Number>(kind: BinaryKind, x: &T, y: &T) -> Result<T> {
    if registry::capabilities::<T>().supports_binary(kind) {
        T::invoke_binary(kind, x, y)
    } else {
        trace!(operation = %kind, type_name = T::type_name(), "derived binary");
        derived_binary(kind, x, y)
    }
}

pub fn nullary<T: Number>(kind: NullaryKind) -> Result<T> {
    match kind {
        NullaryKind::Constant(c) => Ok(constant(c)),
        NullaryKind::Pi => pi(),
        NullaryKind::E => e(),
    }
}

fn native_unary<T: Number>(kind: UnaryKind, x: &T) -> Result<T> {
    if registry::capabilities::<T>().supports_unary(kind) {
        T::invoke_unary(kind, x)
    } else {
        Err(AlgebraError::unsupported(kind, T::type_name()))
    }
}

fn native_binary<T: Number>(kind: BinaryKind, x: &T, y: &T) -> Result<T> {
    if registry::capabilities::<T>().supports_binary(kind) {
        T::invoke_binary(kind, x, y)
    } else {
        Err(AlgebraError::unsupported(kind, T::type_name()))
    }
}

fn derived_unary<T: Number>(kind: UnaryKind, x: &T) -> Result<T> {
    match kind {
        UnaryKind::Negate => native_binary(BinaryKind::Subtract, &zero(), x),
        UnaryKind::Inverse => native_binary(BinaryKind::Divide, &one(), x),
        UnaryKind::Double => add(x, x),
        UnaryKind::Half => div(x, &two()?),
        UnaryKind::Square => mul(x, x),
        UnaryKind::SquareRoot => exp(&div(&log(x)?, &two()?)?),
        UnaryKind::Tan => div(&sin(x)?, &cos(x)?),
        UnaryKind::Sinh => {
            let (up, down) = (exp(x)?, exp(&negate(x)?)?);
            div(&sub(&up, &down)?, &two()?)
        }
        UnaryKind::Cosh => {
            let (up, down) = (exp(x)?, exp(&negate(x)?)?);
            div(&add(&up, &down)?, &two()?)
        }
        UnaryKind::Tanh => {
            let e2 = exp(&double(x)?)?;
            let one = one::<T>();
            div(&sub(&e2, &one)?, &add(&e2, &one)?)
        }
        UnaryKind::Asinh => {
            let root = sqrt(&add(&square(x)?, &one())?)?;
            log(&add(x, &root)?)
        }
        UnaryKind::Acosh => {
            let root = sqrt(&sub(&square(x)?, &one())?)?;
            log(&add(x, &root)?)
        }
        UnaryKind::Atanh => {
            let one = one::<T>();
            let ratio = div(&add(&one, x)?, &sub(&one, x)?)?;
            half(&log(&ratio)?)
        }
        UnaryKind::Conjugate
        | UnaryKind::Modulus
        | UnaryKind::Exp
        | UnaryKind::Log
        | UnaryKind::Sin
        | UnaryKind::Asin
        | UnaryKind::Cos
        | UnaryKind::Acos
        | UnaryKind::Atan => Err(AlgebraError::unsupported(kind, T::type_name())),
    }
}

fn derived_binary<T: Number>(kind: BinaryKind, x: &T, y: &T) -> Result<T> {
    match kind {
        BinaryKind::Subtract => add(x, &native_unary(UnaryKind::Negate, y)?),
        BinaryKind::Divide => mul(x, &native_unary(UnaryKind::Inverse, y)?),
        BinaryKind::Power => exp(&mul(&log(x)?, y)?),
        BinaryKind::Atan2 => derived_atan2(x, y),
        BinaryKind::Add | BinaryKind::Multiply => {
            Err(AlgebraError::unsupported(kind, T::type_name()))
        }
    }
}

/// Quadrant-aware arctangent of `y / x`.
///
/// Off the real axis the half-angle identity `2·atan((|r| - x) / y)` covers
/// every quadrant. On it, `atan(y/x)` is shifted by π exactly when
/// `x + sqrt(x²)` vanishes, i.e. when `x` lies on the negative branch.
fn derived_atan2<T: Number>(y: &T, x: &T) -> Result<T> {
    if y.is_invertible() {
        let radius = sqrt(&add(&square(x)?, &square(y)?)?)?;
        double(&atan(&div(&sub(&radius, x)?, y)?)?)
    } else {
        let angle = atan(&div(y, x)?)?;
        let branch = add(x, &sqrt(&square(x)?)?)?;
        if branch.is_invertible() {
            Ok(angle)
        } else {
            add(&angle, &pi()?)
        }
    }
}

// --- constants ---

pub fn constant<T: Number>(c: StandardConstant) -> T {
    T::create(c)
}

pub fn zero<T: Number>() -> T {
    T::create(StandardConstant::Zero)
}

pub fn one<T: Number>() -> T {
    T::create(StandardConstant::RealOne)
}

fn two<T: Number>() -> Result<T> {
    let one = one::<T>();
    add(&one, &one)
}

/// `4·atan(1)`, computed once per type.
pub fn pi<T: Number>() -> Result<T> {
    registry::capabilities::<T>().pi(|| {
        let quarter = atan(&one::<T>())?;
        double(&double(&quarter)?)
    })
}

/// `exp(1)`, computed once per type.
pub fn e<T: Number>() -> Result<T> {
    registry::capabilities::<T>().e(|| exp(&one::<T>()))
}

// --- unary operations ---

pub fn negate<T: Number>(x: &T) -> Result<T> {
    unary(UnaryKind::Negate, x)
}

pub fn inverse<T: Number>(x: &T) -> Result<T> {
    unary(UnaryKind::Inverse, x)
}

pub fn conjugate<T: Number>(x: &T) -> Result<T> {
    unary(UnaryKind::Conjugate, x)
}

pub fn modulus<T: Number>(x: &T) -> Result<T> {
    unary(UnaryKind::Modulus, x)
}

pub fn double<T: Number>(x: &T) -> Result<T> {
    unary(UnaryKind::Double, x)
}

pub fn half<T: Number>(x: &T) -> Result<T> {
    unary(UnaryKind::Half, x)
}

pub fn square<T: Number>(x: &T) -> Result<T> {
    unary(UnaryKind::Square, x)
}

pub fn sqrt<T: Number>(x: &T) -> Result<T> {
    unary(UnaryKind::SquareRoot, x)
}

pub fn exp<T: Number>(x: &T) -> Result<T> {
    unary(UnaryKind::Exp, x)
}

pub fn log<T: Number>(x: &T) -> Result<T> {
    unary(UnaryKind::Log, x)
}

pub fn sin<T: Number>(x: &T) -> Result<T> {
    unary(UnaryKind::Sin, x)
}

pub fn asin<T: Number>(x: &T) -> Result<T> {
    unary(UnaryKind::Asin, x)
}

pub fn cos<T: Number>(x: &T) -> Result<T> {
    unary(UnaryKind::Cos, x)
}

pub fn acos<T: Number>(x: &T) -> Result<T> {
    unary(UnaryKind::Acos, x)
}

pub fn tan<T: Number>(x: &T) -> Result<T> {
    unary(UnaryKind::Tan, x)
}

pub fn atan<T: Number>(x: &T) -> Result<T> {
    unary(UnaryKind::Atan, x)
}

pub fn sinh<T: Number>(x: &T) -> Result<T> {
    unary(UnaryKind::Sinh, x)
}

pub fn asinh<T: Number>(x: &T) -> Result<T> {
    unary(UnaryKind::Asinh, x)
}

pub fn cosh<T: Number>(x: &T) -> Result<T> {
    unary(UnaryKind::Cosh, x)
}

pub fn acosh<T: Number>(x: &T) -> Result<T> {
    unary(UnaryKind::Acosh, x)
}

pub fn tanh<T: Number>(x: &T) -> Result<T> {
    unary(UnaryKind::Tanh, x)
}

pub fn atanh<T: Number>(x: &T) -> Result<T> {
    unary(UnaryKind::Atanh, x)
}

// --- binary operations ---

pub fn add<T: Number>(x: &T, y: &T) -> Result<T> {
    binary(BinaryKind::Add, x, y)
}

pub fn sub<T: Number>(x: &T, y: &T) -> Result<T> {
    binary(BinaryKind::Subtract, x, y)
}

pub fn mul<T: Number>(x: &T, y: &T) -> Result<T> {
    binary(BinaryKind::Multiply, x, y)
}

pub fn div<T: Number>(x: &T, y: &T) -> Result<T> {
    binary(BinaryKind::Divide, x, y)
}

pub fn pow<T: Number>(x: &T, y: &T) -> Result<T> {
    binary(BinaryKind::Power, x, y)
}

pub fn atan2<T: Number>(y: &T, x: &T) -> Result<T> {
    binary(BinaryKind::Atan2, y, x)
}

// --- comparisons ---

pub fn equals<T: Number>(x: &T, y: &T) -> bool {
    x == y
}

pub fn compare<T: Number>(x: &T, y: &T) -> Ordering {
    x.compare(y)
}

pub fn is_invertible<T: Number>(x: &T) -> bool {
    x.is_invertible()
}

pub fn is_finite<T: Number>(x: &T) -> bool {
    x.is_finite()
}

// --- component-scalar variants ---

pub fn from_components<T: ComponentNumber>(
    real: T::Primitive,
    other_units: T::Primitive,
    some_combined: T::Primitive,
    all_combined: T::Primitive,
) -> T {
    T::from_components(real, other_units, some_combined, all_combined)
}

pub fn component<T: ComponentNumber>(x: &T, kind: ComponentKind) -> T::Primitive {
    x.component(kind)
}

pub fn add_val<T: ComponentNumber>(x: &T, value: T::Primitive) -> Result<T> {
    T::invoke_scalar(BinaryKind::Add, x, value)
}

pub fn sub_val<T: ComponentNumber>(x: &T, value: T::Primitive) -> Result<T> {
    T::invoke_scalar(BinaryKind::Subtract, x, value)
}

pub fn mul_val<T: ComponentNumber>(x: &T, value: T::Primitive) -> Result<T> {
    T::invoke_scalar(BinaryKind::Multiply, x, value)
}

pub fn div_val<T: ComponentNumber>(x: &T, value: T::Primitive) -> Result<T> {
    T::invoke_scalar(BinaryKind::Divide, x, value)
}

pub fn pow_val<T: ComponentNumber>(x: &T, value: T::Primitive) -> Result<T> {
    T::invoke_scalar(BinaryKind::Power, x, value)
}

pub fn val_add<T: ComponentNumber>(value: T::Primitive, x: &T) -> Result<T> {
    T::invoke_scalar_reversed(BinaryKind::Add, value, x)
}

pub fn val_sub<T: ComponentNumber>(value: T::Primitive, x: &T) -> Result<T> {
    T::invoke_scalar_reversed(BinaryKind::Subtract, value, x)
}

pub fn val_mul<T: ComponentNumber>(value: T::Primitive, x: &T) -> Result<T> {
    T::invoke_scalar_reversed(BinaryKind::Multiply, value, x)
}

pub fn val_div<T: ComponentNumber>(value: T::Primitive, x: &T) -> Result<T> {
    T::invoke_scalar_reversed(BinaryKind::Divide, value, x)
}

pub fn val_pow<T: ComponentNumber>(value: T::Primitive, x: &T) -> Result<T> {
    T::invoke_scalar_reversed(BinaryKind::Power, value, x)
}
