//! Derivatives of operation values by nested dual numbers.
//!
//! The point is lifted into a [`Tower`] of depth `order`, the operation is
//! bound against that type and evaluated once, and the result is unwound
//! into the values `f(x), f'(x), ..., f⁽ⁿ⁾(x)`.

use crate::dispatch;
use crate::error::{AlgebraError, Result};
use crate::number::Number;
use crate::operation::Operation;
use crate::tower::Tower;
use tracing::trace;

fn checked_order(order: i64) -> Result<usize> {
    usize::try_from(order).map_err(|_| AlgebraError::InvalidOrder { order })
}

/// Returns `[f(x), f'(x), ..., f^(order)(x)]` for a unary `f`.
///
/// Order 0 evaluates `f` directly at `T`. Any failure at any nesting level
/// is returned unchanged, with no partial result.
pub fn derivative<T: Number>(f: &Operation, point: &T, order: i64) -> Result<Vec<T>> {
    let order = checked_order(order)?;
    if order == 0 {
        return Ok(vec![dispatch::invoke(f, std::slice::from_ref(point))?]);
    }

    trace!(operation = %f, type_name = T::type_name(), order, "lifting point");
    let lifted = Tower::lift(point.clone(), order);
    let value = dispatch::bind::<Tower<T>>(f)?.call(&lifted)?;
    trace!(depth = value.depth(), "unwinding derivatives");
    Ok(value.unwind(order))
}

/// Same as [`derivative`] for a function written directly against
/// [`Tower`], e.g. with the [`crate::algebra`] functions.
pub fn derivative_fn<T, F>(f: F, point: &T, order: i64) -> Result<Vec<T>>
where
    T: Number,
    F: Fn(&Tower<T>) -> Result<Tower<T>>,
{
    let order = checked_order(order)?;
    trace!(type_name = T::type_name(), order, "lifting point for closure");
    let value = f(&Tower::lift(point.clone(), order))?;
    Ok(value.unwind(order))
}
