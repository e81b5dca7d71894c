use crate::algebra;
use crate::error::Result;
use crate::kinds::{BinaryKind, ComponentKind, StandardConstant, UnaryKind};
use num_traits::{Float, ToPrimitive, Zero};
use std::cmp::Ordering;
use std::fmt::Debug;
use std::sync::Arc;

/// The contract every number type satisfies to take part in generic
/// algorithms.
///
/// Values are immutable: every operation returns a new value. A type declares
/// which kinds it implements natively through `supports_unary` and
/// `supports_binary`; the facade in [`crate::algebra`] reads those once per
/// type and falls back to derived formulas for the rest.
pub trait Number: Clone + Debug + PartialEq + Send + Sync + 'static {
    /// Materializes a named constant. Deterministic.
    fn create(constant: StandardConstant) -> Self;

    fn supports_unary(kind: UnaryKind) -> bool;

    fn supports_binary(kind: BinaryKind) -> bool;

    /// Native implementation of `kind`. Kinds not declared in
    /// `supports_unary` return `UnsupportedOperation`.
    fn invoke_unary(kind: UnaryKind, x: &Self) -> Result<Self>;

    fn invoke_binary(kind: BinaryKind, x: &Self, y: &Self) -> Result<Self>;

    fn is_invertible(&self) -> bool;

    fn is_finite(&self) -> bool;

    /// Total order used for sorting and comparisons. Types without a natural
    /// order pick a lexicographic one over their components.
    fn compare(&self, other: &Self) -> Ordering;

    /// Vector-space dimension, or `None` when unbounded or not applicable.
    fn dimension() -> Option<usize> {
        None
    }

    fn type_name() -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Runtime access to the component extension.
    fn components() -> Option<ComponentCapability<Self>> {
        None
    }
}

/// Optional extension: a number built from primitive scalar components that
/// also supports arithmetic mixed with those scalars.
pub trait ComponentNumber: Number {
    type Primitive: Float + Debug + Send + Sync + 'static;

    fn from_components(
        real: Self::Primitive,
        other_units: Self::Primitive,
        some_combined: Self::Primitive,
        all_combined: Self::Primitive,
    ) -> Self;

    fn component(&self, kind: ComponentKind) -> Self::Primitive;

    fn from_primitive(value: Self::Primitive) -> Self {
        let zero = Self::Primitive::zero();
        Self::from_components(value, zero, zero, zero)
    }

    /// `x (kind) value`. Defaults to lifting the scalar and using the base
    /// binary dispatch.
    fn invoke_scalar(kind: BinaryKind, x: &Self, value: Self::Primitive) -> Result<Self> {
        algebra::binary(kind, x, &Self::from_primitive(value))
    }

    /// `value (kind) x`.
    fn invoke_scalar_reversed(kind: BinaryKind, value: Self::Primitive, x: &Self) -> Result<Self> {
        algebra::binary(kind, &Self::from_primitive(value), x)
    }
}

/// Erased view of a component-capable type, with the primitive carried as
/// `f64`.
///
/// This is what generic code holding only `T: Number` can ask for (via
/// [`Number::components`]) when an operation needs scalar literals or
/// component access. Wrapper types such as duals build theirs by lifting the
/// capability of the type they wrap.
pub struct ComponentCapability<T> {
    pub primitive_name: &'static str,
    from_components: Arc<dyn Fn(f64, f64, f64, f64) -> T + Send + Sync>,
    component: Arc<dyn Fn(&T, ComponentKind) -> f64 + Send + Sync>,
    scalar: Arc<dyn Fn(BinaryKind, &T, f64) -> Result<T> + Send + Sync>,
    scalar_reversed: Arc<dyn Fn(BinaryKind, f64, &T) -> Result<T> + Send + Sync>,
}

impl<T> Clone for ComponentCapability<T> {
    fn clone(&self) -> Self {
        Self {
            primitive_name: self.primitive_name,
            from_components: Arc::clone(&self.from_components),
            component: Arc::clone(&self.component),
            scalar: Arc::clone(&self.scalar),
            scalar_reversed: Arc::clone(&self.scalar_reversed),
        }
    }
}

impl<T> Debug for ComponentCapability<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentCapability")
            .field("primitive_name", &self.primitive_name)
            .finish_non_exhaustive()
    }
}

impl<T: ComponentNumber> ComponentCapability<T> {
    pub fn of() -> Self {
        Self {
            primitive_name: std::any::type_name::<T::Primitive>(),
            from_components: Arc::new(|r, o, s, a| {
                T::from_components(
                    primitive::<T>(r),
                    primitive::<T>(o),
                    primitive::<T>(s),
                    primitive::<T>(a),
                )
            }),
            component: Arc::new(|x: &T, kind| x.component(kind).to_f64().unwrap_or(f64::NAN)),
            scalar: Arc::new(|kind, x: &T, value| T::invoke_scalar(kind, x, primitive::<T>(value))),
            scalar_reversed: Arc::new(|kind, value, x: &T| {
                T::invoke_scalar_reversed(kind, primitive::<T>(value), x)
            }),
        }
    }
}

impl<T: Number> ComponentCapability<T> {
    /// Capability of a wrapper `T` around `U`: components are read from the
    /// wrapped value returned by `project`, and scalars enter through `wrap`.
    /// Mixed scalar arithmetic lifts the scalar and uses the base dispatch.
    pub fn lifted<U: Number>(
        inner: ComponentCapability<U>,
        wrap: fn(U) -> T,
        project: fn(&T) -> &U,
    ) -> Self {
        let build = inner.clone();
        let read = inner.clone();
        let from_components: Arc<dyn Fn(f64, f64, f64, f64) -> T + Send + Sync> =
            Arc::new(move |r, o, s, a| wrap(build.from_components(r, o, s, a)));
        let lift = Arc::clone(&from_components);
        let lift_reversed = Arc::clone(&from_components);
        Self {
            primitive_name: inner.primitive_name,
            from_components,
            component: Arc::new(move |x: &T, kind| read.component(project(x), kind)),
            scalar: Arc::new(move |kind, x: &T, value| {
                algebra::binary(kind, x, &lift(value, 0.0, 0.0, 0.0))
            }),
            scalar_reversed: Arc::new(move |kind, value, x: &T| {
                algebra::binary(kind, &lift_reversed(value, 0.0, 0.0, 0.0), x)
            }),
        }
    }
}

impl<T> ComponentCapability<T> {
    pub fn from_components(&self, real: f64, other_units: f64, some: f64, all: f64) -> T {
        (self.from_components)(real, other_units, some, all)
    }

    pub fn lift(&self, value: f64) -> T {
        (self.from_components)(value, 0.0, 0.0, 0.0)
    }

    pub fn component(&self, x: &T, kind: ComponentKind) -> f64 {
        (self.component)(x, kind)
    }

    pub fn scalar(&self, kind: BinaryKind, x: &T, value: f64) -> Result<T> {
        (self.scalar)(kind, x, value)
    }

    pub fn scalar_reversed(&self, kind: BinaryKind, value: f64, x: &T) -> Result<T> {
        (self.scalar_reversed)(kind, value, x)
    }
}

fn primitive<T: ComponentNumber>(value: f64) -> T::Primitive {
    num_traits::cast(value).unwrap_or_else(T::Primitive::nan)
}
