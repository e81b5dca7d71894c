//! Runtime-depth nesting of dual numbers.
//!
//! `Tower<T>` is either a plain `T` or a `Dual<Tower<T>>`, so one Rust type
//! covers `T`, `Dual<T>`, `Dual<Dual<T>>`, ... with the depth chosen when the
//! value is built. Arithmetic reuses the `Dual` rules: a leaf meeting a node
//! is promoted to a constant dual of the node's depth.

use crate::algebra as alg;
use crate::dual::Dual;
use crate::error::Result;
use crate::kinds::{BinaryKind, ComponentKind, StandardConstant, UnaryKind};
use crate::number::{ComponentCapability, ComponentNumber, Number};
use std::borrow::Cow;
use std::cmp::Ordering;

#[derive(Debug, Clone)]
pub enum Tower<T> {
    Leaf(T),
    Node(Box<Dual<Tower<T>>>),
}

impl<T: Number> Tower<T> {
    /// Wraps `point` in `depth` dual levels, each seeded with a unit tangent.
    pub fn lift(point: T, depth: usize) -> Self {
        let mut tower = Tower::Leaf(point);
        for _ in 0..depth {
            tower = Tower::Node(Box::new(Dual::variable(tower)));
        }
        tower
    }

    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self;
        while let Tower::Node(dual) = current {
            depth += 1;
            current = &dual.first;
        }
        depth
    }

    /// The innermost primal value.
    pub fn primal(&self) -> &T {
        let mut current = self;
        loop {
            match current {
                Tower::Leaf(value) => return value,
                Tower::Node(dual) => current = &dual.first,
            }
        }
    }

    /// Primal part of the outermost level. A leaf is its own primal.
    pub fn first(&self) -> Tower<T> {
        match self {
            Tower::Leaf(_) => self.clone(),
            Tower::Node(dual) => dual.first.clone(),
        }
    }

    /// Tangent part of the outermost level. A leaf has a zero tangent.
    pub fn second(&self) -> Tower<T> {
        match self {
            Tower::Leaf(_) => Tower::Leaf(alg::zero()),
            Tower::Node(dual) => dual.second.clone(),
        }
    }

    /// Recovers derivatives `0..=order` from a value computed at a point
    /// lifted `order` times.
    ///
    /// With every level seeded by the same unit tangent, the k-th derivative
    /// sits behind k tangent projections followed by `order - k` primal
    /// projections; the order of the projections does not matter.
    pub fn unwind(&self, order: usize) -> Vec<T> {
        let mut derivatives = Vec::with_capacity(order + 1);
        for k in 0..=order {
            let mut level = self.clone();
            for _ in 0..k {
                level = level.second();
            }
            for _ in k..order {
                level = level.first();
            }
            derivatives.push(level.primal().clone());
        }
        derivatives
    }

    fn as_dual(&self) -> Cow<'_, Dual<Tower<T>>> {
        match self {
            Tower::Node(dual) => Cow::Borrowed(dual.as_ref()),
            Tower::Leaf(_) => Cow::Owned(Dual::constant(self.clone())),
        }
    }
}

impl<T: Number> From<T> for Tower<T> {
    fn from(value: T) -> Self {
        Tower::Leaf(value)
    }
}

impl<T: Number> PartialEq for Tower<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Tower::Leaf(a), Tower::Leaf(b)) => a == b,
            _ => self.as_dual() == other.as_dual(),
        }
    }
}

impl<T: Number> Number for Tower<T> {
    fn create(constant: StandardConstant) -> Self {
        Tower::Leaf(T::create(constant))
    }

    // Every kind is forwarded; whether it is computable is decided by the
    // facade at the leaf or dual level.
    fn supports_unary(_: UnaryKind) -> bool {
        true
    }

    fn supports_binary(_: BinaryKind) -> bool {
        true
    }

    fn invoke_unary(kind: UnaryKind, x: &Self) -> Result<Self> {
        match x {
            Tower::Leaf(value) => Ok(Tower::Leaf(alg::unary(kind, value)?)),
            Tower::Node(dual) => Ok(Tower::Node(Box::new(alg::unary(kind, dual.as_ref())?))),
        }
    }

    fn invoke_binary(kind: BinaryKind, x: &Self, y: &Self) -> Result<Self> {
        match (x, y) {
            (Tower::Leaf(a), Tower::Leaf(b)) => Ok(Tower::Leaf(alg::binary(kind, a, b)?)),
            _ => {
                let result = alg::binary(kind, x.as_dual().as_ref(), y.as_dual().as_ref())?;
                Ok(Tower::Node(Box::new(result)))
            }
        }
    }

    fn is_invertible(&self) -> bool {
        self.primal().is_invertible()
    }

    fn is_finite(&self) -> bool {
        match self {
            Tower::Leaf(value) => value.is_finite(),
            Tower::Node(dual) => dual.is_finite(),
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Tower::Leaf(a), Tower::Leaf(b)) => a.compare(b),
            _ => self.as_dual().compare(other.as_dual().as_ref()),
        }
    }

    fn components() -> Option<ComponentCapability<Self>> {
        let inner = T::components()?;
        Some(ComponentCapability::lifted(inner, Tower::Leaf, Tower::primal))
    }
}

impl<T: ComponentNumber> ComponentNumber for Tower<T> {
    type Primitive = T::Primitive;

    fn from_components(
        real: T::Primitive,
        other_units: T::Primitive,
        some_combined: T::Primitive,
        all_combined: T::Primitive,
    ) -> Self {
        Tower::Leaf(T::from_components(
            real,
            other_units,
            some_combined,
            all_combined,
        ))
    }

    fn component(&self, kind: ComponentKind) -> T::Primitive {
        self.primal().component(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lift_builds_exactly_the_requested_depth() {
        for depth in 0..5 {
            assert_eq!(Tower::lift(2.0, depth).depth(), depth);
        }
    }

    #[test]
    fn unwind_of_a_lifted_point_is_the_identity_tower() {
        let tower = Tower::lift(3.0, 3);
        assert_eq!(tower.unwind(3), vec![3.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn leaf_equals_constant_node() {
        let leaf = Tower::Leaf(4.0);
        let node = Tower::Node(Box::new(Dual::constant(Tower::Leaf(4.0))));
        assert_eq!(leaf, node);
        assert_ne!(Tower::lift(4.0, 1), leaf);
    }

    #[test]
    fn cube_carries_three_derivatives() {
        let x = Tower::lift(2.0, 3);
        let cube = alg::mul(&x, &alg::square(&x).expect("square")).expect("mul");
        assert_eq!(cube.unwind(3), vec![8.0, 12.0, 12.0, 6.0]);
    }

    #[test]
    fn scalar_mixing_lifts_through_primal() {
        let x = Tower::lift(2.0_f64, 2);
        let y = alg::mul_val(&x, 3.0).expect("mul_val");
        assert_eq!(y.unwind(2), vec![6.0, 3.0, 0.0]);
        assert_eq!(y.component(ComponentKind::Real), 6.0);
    }
}
