//! The `genalg_core` crate is a generic algebra engine: algorithms written
//! once against the [`Number`] contract run on real, complex and dual numbers
//! alike, and can be differentiated to any order.
//!
//! Key components:
//! - **Number contract**: `Number` (catalog of native kinds plus comparisons)
//!   and the optional `ComponentNumber` extension for scalar mixing.
//! - **Algebra facade**: `algebra::*`, calling native implementations when a
//!   type declares them and derived formulas otherwise.
//! - **Operation values**: `Operation` trees with `swap`, `as_unary`, `widen`
//!   and `apply` combinators, bound to concrete types by `dispatch`.
//! - **Derivatives**: `Dual` numbers nested at run time in a `Tower`, driven by
//!   `derivative::derivative`.
//! - **Expressions**: a small parser compiling text to operation values.
pub mod algebra;
pub mod derivative;
pub mod dispatch;
pub mod dual;
pub mod error;
pub mod expression;
pub mod kinds;
pub mod number;
pub mod operation;
pub mod registry;
pub mod scalars;
pub mod tower;

pub use derivative::{derivative, derivative_fn};
pub use dispatch::{bind, invoke, Binding, DynNumber, NumberKind};
pub use dual::Dual;
pub use error::{AlgebraError, Result};
pub use kinds::{BinaryKind, ComponentKind, NullaryKind, StandardConstant, UnaryKind};
pub use number::{ComponentCapability, ComponentNumber, Number};
pub use operation::Operation;
pub use tower::Tower;
