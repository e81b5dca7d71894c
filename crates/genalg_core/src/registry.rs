//! Process-wide memo of per-type capabilities.
//!
//! Each concrete number type is published at most once: its native unary and
//! binary kinds are read into bit masks and the entry is published behind an
//! `Arc`, so readers never see a partially built table. The transcendental
//! constants live in `OnceCell`s inside the entry and are filled outside the
//! map lock, because computing them goes back through the facade.

use crate::error::Result;
use crate::kinds::{BinaryKind, UnaryKind};
use crate::number::Number;
use once_cell::sync::{Lazy, OnceCell};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

pub struct Capabilities {
    pub type_name: &'static str,
    unary: u32,
    binary: u32,
    has_components: bool,
    pi: OnceCell<Box<dyn Any + Send + Sync>>,
    e: OnceCell<Box<dyn Any + Send + Sync>>,
}

impl Capabilities {
    fn resolve<T: Number>() -> Self {
        let unary = UnaryKind::ALL
            .iter()
            .filter(|kind| T::supports_unary(**kind))
            .fold(0, |mask, kind| mask | kind.bit());
        let binary = BinaryKind::ALL
            .iter()
            .filter(|kind| T::supports_binary(**kind))
            .fold(0, |mask, kind| mask | kind.bit());
        Self {
            type_name: T::type_name(),
            unary,
            binary,
            has_components: T::components().is_some(),
            pi: OnceCell::new(),
            e: OnceCell::new(),
        }
    }

    pub fn supports_unary(&self, kind: UnaryKind) -> bool {
        self.unary & kind.bit() != 0
    }

    pub fn supports_binary(&self, kind: BinaryKind) -> bool {
        self.binary & kind.bit() != 0
    }

    pub fn has_components(&self) -> bool {
        self.has_components
    }

    pub(crate) fn pi<T: Number>(&self, compute: impl FnOnce() -> Result<T>) -> Result<T> {
        cached_constant(&self.pi, "pi", self.type_name, compute)
    }

    pub(crate) fn e<T: Number>(&self, compute: impl FnOnce() -> Result<T>) -> Result<T> {
        cached_constant(&self.e, "e", self.type_name, compute)
    }
}

fn cached_constant<T: Number>(
    cell: &OnceCell<Box<dyn Any + Send + Sync>>,
    name: &str,
    type_name: &'static str,
    compute: impl FnOnce() -> Result<T>,
) -> Result<T> {
    let boxed = cell.get_or_try_init(|| {
        let value = compute()?;
        debug!(constant = name, type_name, ?value, "cached transcendental constant");
        Ok::<_, crate::error::AlgebraError>(Box::new(value) as Box<dyn Any + Send + Sync>)
    })?;
    match boxed.downcast_ref::<T>() {
        Some(value) => Ok(value.clone()),
        // Entries are keyed by TypeId, so the stored value always has type T.
        None => unreachable!("capability entry for {type_name} holds a foreign constant"),
    }
}

static REGISTRY: Lazy<RwLock<HashMap<TypeId, Arc<Capabilities>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Returns the capability table of `T`, resolving it on first use.
pub fn capabilities<T: Number>() -> Arc<Capabilities> {
    let key = TypeId::of::<T>();
    {
        let map = REGISTRY.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = map.get(&key) {
            return Arc::clone(entry);
        }
    }

    // Resolution runs type code, which may itself ask for capabilities, so
    // it happens before the write lock is taken.
    let resolved = Capabilities::resolve::<T>();
    let mut map = REGISTRY.write().unwrap_or_else(PoisonError::into_inner);
    let entry = map.entry(key).or_insert_with(|| {
        debug!(
            type_name = resolved.type_name,
            unary_mask = resolved.unary,
            binary_mask = resolved.binary,
            components = resolved.has_components,
            "resolved number capabilities"
        );
        Arc::new(resolved)
    });
    Arc::clone(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;

    #[test]
    fn capabilities_are_resolved_once_per_type() {
        let first = capabilities::<Complex64>();
        let second = capabilities::<Complex64>();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(first.type_name.contains("Complex"));
    }

    #[test]
    fn f64_declares_native_atan2_absent() {
        let caps = capabilities::<f64>();
        assert!(caps.supports_unary(UnaryKind::Sin));
        assert!(caps.supports_binary(BinaryKind::Power));
        assert!(!caps.supports_binary(BinaryKind::Atan2));
        assert!(caps.has_components());
    }

    #[test]
    fn concurrent_first_use_builds_a_single_entry() {
        #[derive(Debug, Clone, PartialEq)]
        struct Opaque;
        impl Number for Opaque {
            fn create(_: crate::kinds::StandardConstant) -> Self {
                Opaque
            }
            fn supports_unary(_: UnaryKind) -> bool {
                false
            }
            fn supports_binary(_: BinaryKind) -> bool {
                false
            }
            fn invoke_unary(kind: UnaryKind, _: &Self) -> Result<Self> {
                Err(crate::error::AlgebraError::unsupported(kind, Self::type_name()))
            }
            fn invoke_binary(kind: BinaryKind, _: &Self, _: &Self) -> Result<Self> {
                Err(crate::error::AlgebraError::unsupported(kind, Self::type_name()))
            }
            fn is_invertible(&self) -> bool {
                false
            }
            fn is_finite(&self) -> bool {
                true
            }
            fn compare(&self, _: &Self) -> std::cmp::Ordering {
                std::cmp::Ordering::Equal
            }
        }

        let tables: Vec<Arc<Capabilities>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(capabilities::<Opaque>))
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().expect("thread"))
                .collect()
        });
        for table in &tables[1..] {
            assert!(Arc::ptr_eq(&tables[0], table));
        }
    }

    /// Delegates its declarations to the wrapped type's capability table.
    #[derive(Debug, Clone, PartialEq)]
    struct Wrapped<T>(T);

    impl<T: Number> Number for Wrapped<T> {
        fn create(constant: crate::kinds::StandardConstant) -> Self {
            Wrapped(T::create(constant))
        }
        fn supports_unary(kind: UnaryKind) -> bool {
            capabilities::<T>().supports_unary(kind)
        }
        fn supports_binary(kind: BinaryKind) -> bool {
            capabilities::<T>().supports_binary(kind)
        }
        fn invoke_unary(kind: UnaryKind, x: &Self) -> Result<Self> {
            Ok(Wrapped(crate::algebra::unary(kind, &x.0)?))
        }
        fn invoke_binary(kind: BinaryKind, x: &Self, y: &Self) -> Result<Self> {
            Ok(Wrapped(crate::algebra::binary(kind, &x.0, &y.0)?))
        }
        fn is_invertible(&self) -> bool {
            self.0.is_invertible()
        }
        fn is_finite(&self) -> bool {
            self.0.is_finite()
        }
        fn compare(&self, other: &Self) -> std::cmp::Ordering {
            self.0.compare(&other.0)
        }
    }

    #[test]
    fn resolution_may_consult_other_types() {
        // Both levels resolve for the first time inside one call.
        let x = Wrapped(Wrapped(0.5_f64));
        let y = crate::algebra::sin(&x).expect("sin");
        assert_eq!(y, Wrapped(Wrapped(0.5_f64.sin())));

        let caps = capabilities::<Wrapped<Wrapped<f64>>>();
        assert!(caps.supports_unary(UnaryKind::Sin));
        assert!(!caps.supports_binary(BinaryKind::Atan2));
    }
}
