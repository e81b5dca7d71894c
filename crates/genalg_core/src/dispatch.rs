//! Binding operation values to concrete number types.
//!
//! [`bind`] compiles an [`Operation`] tree into a plan of closures for one
//! type `T` and memoizes it per `(TypeId, path, description)`. Resolution
//! tries the base contract first; trees that carry scalar literals or
//! component access are bound through the component capability the type
//! reports via [`Number::components`], and fail with `UnresolvedDispatch`
//! when it has none.
//!
//! The second half of the module is the closed runtime registry: a tagged
//! [`DynNumber`] for callers that only learn the number kind at run time
//! (configuration, the WASM bridge).

use crate::algebra as alg;
use crate::derivative;
use crate::dual::Dual;
use crate::error::{AlgebraError, Result};
use crate::kinds::NullaryKind;
use crate::number::{ComponentCapability, Number};
use crate::operation::{Node, Operation};
use num_complex::Complex64;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

type Plan<T> = Arc<dyn Fn(&[T]) -> Result<T> + Send + Sync>;

/// Which half of the protocol produced a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingPath {
    Base,
    Components,
}

/// An operation compiled for `T`.
pub struct Binding<T> {
    operation: Operation,
    path: BindingPath,
    plan: Plan<T>,
}

impl<T> fmt::Debug for Binding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("operation", &self.operation.describe())
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl<T: Number> Binding<T> {
    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    pub fn path(&self) -> BindingPath {
        self.path
    }

    pub fn arity(&self) -> usize {
        self.operation.arity()
    }

    /// Extra arguments past the arity are ignored.
    pub fn invoke(&self, args: &[T]) -> Result<T> {
        let expected = self.operation.arity();
        if args.len() < expected {
            return Err(AlgebraError::ArityMismatch {
                operation: self.operation.describe(),
                expected,
                got: args.len(),
            });
        }
        (self.plan)(args)
    }

    pub fn call(&self, x: &T) -> Result<T> {
        self.invoke(std::slice::from_ref(x))
    }

    pub fn call2(&self, x: &T, y: &T) -> Result<T> {
        self.invoke(&[x.clone(), y.clone()])
    }

    /// Evaluates a nullary binding into a plain `T`.
    pub fn materialize(&self) -> Result<T> {
        self.invoke(&[])
    }
}

/// Cached bindings kept per number type. Descriptions embed scalar literals,
/// so a stream of fresh literals would otherwise grow the cache without end.
/// Past this many entries the type's bindings are dropped together; handles
/// already returned stay valid.
pub const MAX_BINDINGS_PER_TYPE: usize = 1024;

#[derive(Default)]
struct BindingCache {
    bindings: HashMap<(TypeId, BindingPath, String), Arc<dyn Any + Send + Sync>>,
    live: HashMap<TypeId, usize>,
    resolutions: HashMap<TypeId, usize>,
}

static CACHE: Lazy<RwLock<BindingCache>> = Lazy::new(|| RwLock::new(BindingCache::default()));

/// Number of bindings resolved (cache misses) for `T` so far.
pub fn binding_resolutions<T: Number>() -> usize {
    let cache = CACHE.read().unwrap_or_else(PoisonError::into_inner);
    cache
        .resolutions
        .get(&TypeId::of::<T>())
        .copied()
        .unwrap_or(0)
}

/// Number of bindings currently cached for `T`.
pub fn cached_bindings<T: Number>() -> usize {
    let cache = CACHE.read().unwrap_or_else(PoisonError::into_inner);
    cache.live.get(&TypeId::of::<T>()).copied().unwrap_or(0)
}

/// Binds `op` to `T`, through the component capability only when the tree
/// needs it.
pub fn bind<T: Number>(op: &Operation) -> Result<Arc<Binding<T>>> {
    if op.needs_components() {
        bind_components(op)
    } else {
        bind_base(op)
    }
}

/// Binds using the base contract only.
pub fn bind_base<T: Number>(op: &Operation) -> Result<Arc<Binding<T>>> {
    cached(op, BindingPath::Base, || {
        op.check_slots()?;
        compile::<T>(op, None).map_err(|NeedsComponents| {
            AlgebraError::unresolved(
                op,
                T::type_name(),
                "the operation needs scalar literals or component access",
            )
        })
    })
}

/// Binds through the component capability of `T`.
pub fn bind_components<T: Number>(op: &Operation) -> Result<Arc<Binding<T>>> {
    cached(op, BindingPath::Components, || {
        op.check_slots()?;
        let capability = T::components().ok_or_else(|| {
            AlgebraError::unresolved(op, T::type_name(), "no component capability")
        })?;
        debug!(
            operation = %op,
            type_name = T::type_name(),
            primitive = capability.primitive_name,
            "binding through component capability"
        );
        compile::<T>(op, Some(&capability)).map_err(|NeedsComponents| {
            AlgebraError::unresolved(op, T::type_name(), "component capability incomplete")
        })
    })
}

pub fn invoke<T: Number>(op: &Operation, args: &[T]) -> Result<T> {
    bind::<T>(op)?.invoke(args)
}

pub fn materialize<T: Number>(op: &Operation) -> Result<T> {
    bind::<T>(op)?.materialize()
}

fn cached<T: Number>(
    op: &Operation,
    path: BindingPath,
    resolve: impl FnOnce() -> Result<Plan<T>>,
) -> Result<Arc<Binding<T>>> {
    let key = (TypeId::of::<T>(), path, op.describe());
    let existing = CACHE
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .bindings
        .get(&key)
        .cloned();
    if let Some(entry) = existing {
        return downcast(op, entry);
    }

    // Compiled outside the lock: building a plan may evaluate constants,
    // which user types are free to route back through dispatch.
    let plan = resolve()?;
    let binding: Arc<dyn Any + Send + Sync> = Arc::new(Binding {
        operation: op.clone(),
        path,
        plan,
    });

    let mut cache = CACHE.write().unwrap_or_else(PoisonError::into_inner);
    if let Some(entry) = cache.bindings.get(&key).cloned() {
        return downcast(op, entry);
    }
    *cache.resolutions.entry(key.0).or_insert(0) += 1;
    let live = cache.live.get(&key.0).copied().unwrap_or(0);
    if live >= MAX_BINDINGS_PER_TYPE {
        let type_id = key.0;
        cache.bindings.retain(|(owner, _, _), _| *owner != type_id);
        cache.live.insert(type_id, 0);
        debug!(type_name = T::type_name(), evicted = live, "binding cache full");
    }
    *cache.live.entry(key.0).or_insert(0) += 1;
    debug!(
        operation = %op,
        type_name = T::type_name(),
        ?path,
        "created binding"
    );
    cache.bindings.insert(key, Arc::clone(&binding));
    drop(cache);
    downcast(op, binding)
}

fn downcast<T: Number>(
    op: &Operation,
    entry: Arc<dyn Any + Send + Sync>,
) -> Result<Arc<Binding<T>>> {
    entry.downcast::<Binding<T>>().map_err(|_| {
        AlgebraError::unresolved(op, T::type_name(), "cached binding has a foreign type")
    })
}

struct NeedsComponents;

fn compile<T: Number>(
    op: &Operation,
    capability: Option<&ComponentCapability<T>>,
) -> std::result::Result<Plan<T>, NeedsComponents> {
    let plan: Plan<T> = match op.node() {
        Node::Nullary(NullaryKind::Constant(c)) => {
            let value = T::create(*c);
            Arc::new(move |_: &[T]| Ok(value.clone()))
        }
        Node::Nullary(kind) => {
            let kind = *kind;
            Arc::new(move |_: &[T]| alg::nullary(kind))
        }
        Node::Scalar(value) => {
            let value = capability.ok_or(NeedsComponents)?.lift(*value);
            Arc::new(move |_: &[T]| Ok(value.clone()))
        }
        Node::Unary(kind) => {
            let kind = *kind;
            Arc::new(move |args: &[T]| alg::unary(kind, &args[0]))
        }
        Node::Binary(kind) => {
            let kind = *kind;
            Arc::new(move |args: &[T]| alg::binary(kind, &args[0], &args[1]))
        }
        Node::Component(kind) => {
            let capability = capability.ok_or(NeedsComponents)?.clone();
            let kind = *kind;
            Arc::new(move |args: &[T]| {
                Ok(capability.lift(capability.component(&args[0], kind)))
            })
        }
        Node::ScalarOp {
            kind,
            value,
            reversed,
        } => {
            let capability = capability.ok_or(NeedsComponents)?.clone();
            let (kind, value) = (*kind, *value);
            if *reversed {
                Arc::new(move |args: &[T]| capability.scalar_reversed(kind, value, &args[0]))
            } else {
                Arc::new(move |args: &[T]| capability.scalar(kind, &args[0], value))
            }
        }
        Node::Arg(index) => {
            let index = *index;
            Arc::new(move |args: &[T]| Ok(args[index].clone()))
        }
        Node::Swap(inner) => {
            let inner = compile(inner, capability)?;
            Arc::new(move |args: &[T]| {
                let mut swapped = args.to_vec();
                swapped.swap(0, 1);
                inner(&swapped)
            })
        }
        Node::AsUnary(inner) => {
            let width = inner.arity();
            let inner = compile(inner, capability)?;
            Arc::new(move |args: &[T]| inner(&vec![args[0].clone(); width]))
        }
        // Arguments past the inner arity are never read.
        Node::Widen { op, .. } => compile(op, capability)?,
        Node::Apply { outer, inners } => {
            let slots = (0..outer.arity())
                .map(|j| {
                    inners
                        .get(j)
                        .and_then(Option::as_ref)
                        .map(|inner| compile(inner, capability))
                        .transpose()
                })
                .collect::<std::result::Result<Vec<_>, _>>()?;
            let outer = compile(outer, capability)?;
            Arc::new(move |args: &[T]| {
                let mut values = Vec::with_capacity(slots.len());
                for (j, slot) in slots.iter().enumerate() {
                    values.push(match slot {
                        Some(inner) => inner(args)?,
                        None => args[j].clone(),
                    });
                }
                outer(&values)
            })
        }
    };
    Ok(plan)
}

// --- closed runtime registry ---

/// The number kinds reachable without static type information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberKind {
    Real,
    Complex,
    Dual,
}

impl NumberKind {
    pub fn name(self) -> &'static str {
        match self {
            NumberKind::Real => "real",
            NumberKind::Complex => "complex",
            NumberKind::Dual => "dual",
        }
    }

    fn type_name(self) -> &'static str {
        match self {
            NumberKind::Real => f64::type_name(),
            NumberKind::Complex => Complex64::type_name(),
            NumberKind::Dual => Dual::<f64>::type_name(),
        }
    }
}

impl fmt::Display for NumberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NumberKind {
    type Err = crate::kinds::UnknownKind;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "real" | "f64" => Ok(NumberKind::Real),
            "complex" => Ok(NumberKind::Complex),
            "dual" => Ok(NumberKind::Dual),
            other => Err(crate::kinds::UnknownKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DynNumber {
    Real(f64),
    Complex(Complex64),
    Dual(Dual<f64>),
}

impl DynNumber {
    pub fn kind(&self) -> NumberKind {
        match self {
            DynNumber::Real(_) => NumberKind::Real,
            DynNumber::Complex(_) => NumberKind::Complex,
            DynNumber::Dual(_) => NumberKind::Dual,
        }
    }

    /// Embeds a real value into `kind`.
    pub fn from_real(kind: NumberKind, value: f64) -> Self {
        match kind {
            NumberKind::Real => DynNumber::Real(value),
            NumberKind::Complex => DynNumber::Complex(Complex64::new(value, 0.0)),
            NumberKind::Dual => DynNumber::Dual(Dual::constant(value)),
        }
    }

    fn as_real(&self) -> Option<&f64> {
        match self {
            DynNumber::Real(x) => Some(x),
            _ => None,
        }
    }

    fn as_complex(&self) -> Option<&Complex64> {
        match self {
            DynNumber::Complex(z) => Some(z),
            _ => None,
        }
    }

    fn as_dual(&self) -> Option<&Dual<f64>> {
        match self {
            DynNumber::Dual(d) => Some(d),
            _ => None,
        }
    }
}

impl fmt::Display for DynNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DynNumber::Real(x) => write!(f, "{x}"),
            DynNumber::Complex(z) => write!(f, "{z}"),
            DynNumber::Dual(d) => write!(f, "{} + {}ε", d.first, d.second),
        }
    }
}

/// Invokes `op` on arguments whose kind is read from the first one.
pub fn invoke_dyn(op: &Operation, args: &[DynNumber]) -> Result<DynNumber> {
    let kind = args.first().map(DynNumber::kind).ok_or_else(|| {
        AlgebraError::unresolved(op, "DynNumber", "no argument to select a number kind")
    })?;
    invoke_as(kind, op, args)
}

/// Invokes `op` at a fixed kind; every argument must carry that kind.
pub fn invoke_as(kind: NumberKind, op: &Operation, args: &[DynNumber]) -> Result<DynNumber> {
    match kind {
        NumberKind::Real => {
            invoke(op, &unpack(op, kind, args, DynNumber::as_real)?).map(DynNumber::Real)
        }
        NumberKind::Complex => {
            invoke(op, &unpack(op, kind, args, DynNumber::as_complex)?).map(DynNumber::Complex)
        }
        NumberKind::Dual => {
            invoke(op, &unpack(op, kind, args, DynNumber::as_dual)?).map(DynNumber::Dual)
        }
    }
}

pub fn materialize_dyn(kind: NumberKind, op: &Operation) -> Result<DynNumber> {
    invoke_as(kind, op, &[])
}

pub fn derivative_dyn(op: &Operation, point: &DynNumber, order: i64) -> Result<Vec<DynNumber>> {
    Ok(match point {
        DynNumber::Real(x) => derivative::derivative(op, x, order)?
            .into_iter()
            .map(DynNumber::Real)
            .collect(),
        DynNumber::Complex(z) => derivative::derivative(op, z, order)?
            .into_iter()
            .map(DynNumber::Complex)
            .collect(),
        DynNumber::Dual(d) => derivative::derivative(op, d, order)?
            .into_iter()
            .map(DynNumber::Dual)
            .collect(),
    })
}

fn unpack<T: Clone>(
    op: &Operation,
    kind: NumberKind,
    args: &[DynNumber],
    project: fn(&DynNumber) -> Option<&T>,
) -> Result<Vec<T>> {
    args.iter()
        .enumerate()
        .map(|(i, arg)| {
            project(arg).cloned().ok_or_else(|| {
                AlgebraError::unresolved(
                    op,
                    kind.type_name(),
                    format!("argument {i} is {}, expected {kind}", arg.kind()),
                )
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::{BinaryKind, ComponentKind, StandardConstant};

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-12,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn swap_twice_is_the_original() {
        let sub = Operation::sub();
        let twice = sub.swap().swap();
        for (x, y) in [(5.0, 2.0), (-1.5, 4.0)] {
            assert_eq!(
                invoke(&twice, &[x, y]).expect("swap"),
                invoke(&sub, &[x, y]).expect("sub")
            );
        }
        assert_eq!(invoke(&sub.swap(), &[5.0, 2.0]).expect("swapped"), -3.0);
    }

    #[test]
    fn as_unary_with_passthrough_slots_duplicates_the_argument() {
        let op = Operation::mul().as_unary().apply(vec![None, None]);
        assert_eq!(op.arity(), 1);
        assert_eq!(invoke(&op, &[3.0]).expect("square"), 9.0);
    }

    #[test]
    fn apply_mixes_inner_operations_and_passthrough() {
        // sin(x) * y
        let op = Operation::mul().apply(vec![Some(Operation::sin()), None]);
        let value = invoke(&op, &[0.5, 4.0]).expect("apply");
        assert_close(value, 4.0 * 0.5_f64.sin());
    }

    #[test]
    fn operations_in_unread_apply_slots_fail_to_bind() {
        let op = Operation::sin().apply(vec![None, Some(Operation::exp())]);
        let err = invoke(&op, &[0.5_f64, 1.0]).expect_err("stray slot");
        assert!(matches!(
            err,
            AlgebraError::ArityMismatch { expected: 1, got: 2, .. }
        ));
        // Component path too
        let scaled = Operation::with_scalar(BinaryKind::Multiply, 2.0)
            .apply(vec![None, Some(Operation::sin())]);
        assert!(bind::<f64>(&scaled).is_err());
    }

    #[test]
    fn widened_nullary_ignores_arguments() {
        let op = Operation::pi().as_binary();
        let value = invoke(&op, &[10.0, 20.0]).expect("pi");
        assert_close(value, std::f64::consts::PI);
    }

    #[test]
    fn too_few_arguments_is_an_arity_mismatch() {
        let err = invoke(&Operation::add(), &[1.0]).expect_err("one argument");
        assert_eq!(
            err,
            AlgebraError::ArityMismatch {
                operation: "add".into(),
                expected: 2,
                got: 1
            }
        );
    }

    #[test]
    fn scalar_literals_take_the_component_path() {
        let op = Operation::with_scalar(BinaryKind::Multiply, 2.5);
        let binding = bind::<f64>(&op).expect("bind");
        assert_eq!(binding.path(), BindingPath::Components);
        assert_eq!(binding.call(&2.0).expect("call"), 5.0);
        assert!(bind_base::<f64>(&op).is_err());
    }

    #[test]
    fn component_extraction_lifts_back_to_the_type() {
        let op = Operation::component(ComponentKind::OtherUnits);
        let z = Complex64::new(1.0, -3.0);
        assert_eq!(invoke(&op, &[z]).expect("im"), Complex64::new(-3.0, 0.0));
    }

    #[test]
    fn constants_materialize() {
        let one = materialize::<Complex64>(&Operation::constant(StandardConstant::RealOne))
            .expect("one");
        assert_eq!(one, Complex64::new(1.0, 0.0));
        let e = bind::<f64>(&Operation::e()).expect("bind").materialize().expect("e");
        assert_close(e, std::f64::consts::E);
    }

    #[test]
    fn dyn_invocation_follows_the_first_tag() {
        let op = Operation::add();
        let sum = invoke_dyn(&op, &[DynNumber::Real(1.0), DynNumber::Real(2.0)]).expect("add");
        assert_eq!(sum, DynNumber::Real(3.0));

        let err = invoke_dyn(
            &op,
            &[DynNumber::Real(1.0), DynNumber::Complex(Complex64::new(0.0, 1.0))],
        )
        .expect_err("mixed kinds");
        assert!(matches!(err, AlgebraError::UnresolvedDispatch { .. }));
    }

    #[test]
    fn dyn_derivative_on_complex_points() {
        let point = DynNumber::Complex(Complex64::new(0.3, 0.0));
        let values = derivative_dyn(&Operation::exp(), &point, 2).expect("exp");
        assert_eq!(values.len(), 3);
        for value in values {
            match value {
                DynNumber::Complex(z) => assert_close(z.re, 0.3_f64.exp()),
                other => panic!("unexpected kind {other}"),
            }
        }
    }

    #[test]
    fn dyn_numbers_deserialize_from_tagged_json() {
        let parsed: DynNumber = serde_json::from_str(r#"{"real": 2.5}"#).expect("json");
        assert_eq!(parsed, DynNumber::Real(2.5));
        assert_eq!("complex".parse::<NumberKind>(), Ok(NumberKind::Complex));
    }
}
