//! Operations as first-class values.
//!
//! An [`Operation`] is a small immutable tree: leaves name catalog entries
//! (constants, unary and binary kinds, component access, scalar mixing,
//! argument projection) and inner nodes are the combinators `swap`,
//! `as_unary`, `widen` and `apply`. Nothing here is tied to a number type;
//! [`crate::dispatch`] binds a tree to a concrete `T` on first use.
//!
//! Every operation has a stable textual description (its `Display`), which
//! is also the key the dispatch cache uses.

use crate::error::{AlgebraError, Result};
use crate::kinds::{BinaryKind, ComponentKind, NullaryKind, StandardConstant, UnaryKind};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Nullary(NullaryKind),
    /// A primitive literal lifted into the target type.
    Scalar(f64),
    Unary(UnaryKind),
    Binary(BinaryKind),
    Component(ComponentKind),
    /// `x (kind) value`, or `value (kind) x` when `reversed`.
    ScalarOp {
        kind: BinaryKind,
        value: f64,
        reversed: bool,
    },
    /// Returns argument `i` unchanged.
    Arg(usize),
    Swap(Operation),
    AsUnary(Operation),
    Widen {
        op: Operation,
        arity: usize,
    },
    Apply {
        outer: Operation,
        inners: Vec<Option<Operation>>,
    },
}

/// Immutable, cheaply clonable operation value.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    node: Arc<Node>,
    arity: usize,
    needs_components: bool,
}

impl Operation {
    fn from_node(node: Node) -> Self {
        let (arity, needs_components) = match &node {
            Node::Nullary(_) => (0, false),
            Node::Scalar(_) => (0, true),
            Node::Unary(_) => (1, false),
            Node::Binary(_) => (2, false),
            Node::Component(_) | Node::ScalarOp { .. } => (1, true),
            Node::Arg(i) => (i + 1, false),
            Node::Swap(op) => (op.arity.max(2), op.needs_components),
            Node::AsUnary(op) => (1, op.needs_components),
            Node::Widen { op, arity } => (op.arity.max(*arity), op.needs_components),
            Node::Apply { outer, inners } => {
                let mut arity = 0;
                let mut needs = outer.needs_components;
                for j in 0..outer.arity {
                    match inners.get(j).and_then(Option::as_ref) {
                        Some(inner) => {
                            arity = arity.max(inner.arity);
                            needs |= inner.needs_components;
                        }
                        None => arity = arity.max(j + 1),
                    }
                }
                (arity, needs)
            }
        };
        Self {
            node: Arc::new(node),
            arity,
            needs_components,
        }
    }

    pub fn constant(constant: StandardConstant) -> Self {
        Self::from_node(Node::Nullary(NullaryKind::Constant(constant)))
    }

    pub fn nullary(kind: NullaryKind) -> Self {
        Self::from_node(Node::Nullary(kind))
    }

    pub fn pi() -> Self {
        Self::nullary(NullaryKind::Pi)
    }

    pub fn e() -> Self {
        Self::nullary(NullaryKind::E)
    }

    /// A primitive literal. Binding it requires the component extension.
    pub fn scalar(value: f64) -> Self {
        Self::from_node(Node::Scalar(value))
    }

    pub fn unary(kind: UnaryKind) -> Self {
        Self::from_node(Node::Unary(kind))
    }

    pub fn binary(kind: BinaryKind) -> Self {
        Self::from_node(Node::Binary(kind))
    }

    /// Reads one component of the argument and lifts it back as a real value.
    pub fn component(kind: ComponentKind) -> Self {
        Self::from_node(Node::Component(kind))
    }

    /// `x (kind) value`.
    pub fn with_scalar(kind: BinaryKind, value: f64) -> Self {
        Self::from_node(Node::ScalarOp {
            kind,
            value,
            reversed: false,
        })
    }

    /// `value (kind) x`.
    pub fn scalar_with(value: f64, kind: BinaryKind) -> Self {
        Self::from_node(Node::ScalarOp {
            kind,
            value,
            reversed: true,
        })
    }

    pub fn identity() -> Self {
        Self::argument(0)
    }

    /// Projection onto argument `index`.
    pub fn argument(index: usize) -> Self {
        Self::from_node(Node::Arg(index))
    }

    /// Exchanges the first two arguments.
    pub fn swap(&self) -> Self {
        Self::from_node(Node::Swap(self.clone()))
    }

    /// Feeds the single argument into every parameter. A nullary operation
    /// ignores it.
    pub fn as_unary(&self) -> Self {
        Self::from_node(Node::AsUnary(self.clone()))
    }

    /// Accepts at least `arity` arguments, ignoring those past its own arity.
    pub fn widen(&self, arity: usize) -> Self {
        Self::from_node(Node::Widen {
            op: self.clone(),
            arity,
        })
    }

    pub fn as_binary(&self) -> Self {
        self.widen(2)
    }

    pub fn as_ternary(&self) -> Self {
        self.widen(3)
    }

    /// Composition: argument `j` of `self` is `inners[j]` applied to the
    /// shared arguments, or the shared argument `j` itself when the slot is
    /// `None` or missing. Slots past `self`'s arity must be `None`; binding
    /// rejects an operation placed there.
    pub fn apply(&self, inners: Vec<Option<Operation>>) -> Self {
        Self::from_node(Node::Apply {
            outer: self.clone(),
            inners,
        })
    }

    /// `self(inner(x))` for a unary `self`.
    pub fn compose(&self, inner: &Operation) -> Self {
        self.apply(vec![Some(inner.clone())])
    }

    /// `next(self(x))`.
    pub fn then(&self, next: &Operation) -> Self {
        next.compose(self)
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Fails with `ArityMismatch` when some `apply` in the tree holds an
    /// operation in a slot its outer operation never reads.
    pub(crate) fn check_slots(&self) -> Result<()> {
        match self.node.as_ref() {
            Node::Swap(op) | Node::AsUnary(op) | Node::Widen { op, .. } => op.check_slots(),
            Node::Apply { outer, inners } => {
                if let Some(last) = inners.iter().rposition(Option::is_some) {
                    if last >= outer.arity {
                        return Err(AlgebraError::ArityMismatch {
                            operation: self.describe(),
                            expected: outer.arity,
                            got: last + 1,
                        });
                    }
                }
                outer.check_slots()?;
                inners.iter().flatten().try_for_each(Operation::check_slots)
            }
            _ => Ok(()),
        }
    }

    /// True when binding needs scalar literals or component access.
    pub fn needs_components(&self) -> bool {
        self.needs_components
    }

    pub fn describe(&self) -> String {
        self.to_string()
    }

    pub(crate) fn node(&self) -> &Node {
        &self.node
    }
}

macro_rules! kind_builders {
    ($ctor:ident, $kind:ident { $($name:ident => $variant:ident),* $(,)? }) => {
        impl Operation {
            $(
                pub fn $name() -> Self {
                    Self::$ctor($kind::$variant)
                }
            )*
        }
    };
}

kind_builders!(unary, UnaryKind {
    negate => Negate,
    inverse => Inverse,
    conjugate => Conjugate,
    modulus => Modulus,
    double => Double,
    half => Half,
    square => Square,
    sqrt => SquareRoot,
    exp => Exp,
    log => Log,
    sin => Sin,
    asin => Asin,
    cos => Cos,
    acos => Acos,
    tan => Tan,
    atan => Atan,
    sinh => Sinh,
    asinh => Asinh,
    cosh => Cosh,
    acosh => Acosh,
    tanh => Tanh,
    atanh => Atanh,
});

kind_builders!(binary, BinaryKind {
    add => Add,
    sub => Subtract,
    mul => Multiply,
    div => Divide,
    pow => Power,
    atan2 => Atan2,
});

impl From<UnaryKind> for Operation {
    fn from(kind: UnaryKind) -> Self {
        Operation::unary(kind)
    }
}

impl From<BinaryKind> for Operation {
    fn from(kind: BinaryKind) -> Self {
        Operation::binary(kind)
    }
}

impl From<NullaryKind> for Operation {
    fn from(kind: NullaryKind) -> Self {
        Operation::nullary(kind)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node() {
            Node::Nullary(kind) => write!(f, "{kind}"),
            Node::Scalar(value) => write!(f, "{value:?}"),
            Node::Unary(kind) => write!(f, "{kind}"),
            Node::Binary(kind) => write!(f, "{kind}"),
            Node::Component(kind) => write!(f, "component({kind})"),
            Node::ScalarOp {
                kind,
                value,
                reversed: false,
            } => write!(f, "{kind}_val({value:?})"),
            Node::ScalarOp {
                kind,
                value,
                reversed: true,
            } => write!(f, "val_{kind}({value:?})"),
            Node::Arg(index) => write!(f, "#{index}"),
            Node::Swap(op) => write!(f, "swap({op})"),
            Node::AsUnary(op) => write!(f, "as_unary({op})"),
            Node::Widen { op, arity } => write!(f, "widen({op}, {arity})"),
            Node::Apply { outer, inners } => {
                write!(f, "apply({outer}, [")?;
                for (i, inner) in inners.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    match inner {
                        Some(op) => write!(f, "{op}")?,
                        None => f.write_str("_")?,
                    }
                }
                f.write_str("])")
            }
        }
    }
}
