mod common;

use common::{assert_close, Restricted};
use genalg_core::dispatch::{
    binding_resolutions, bind_base, cached_bindings, BindingPath, MAX_BINDINGS_PER_TYPE,
};
use genalg_core::{bind, derivative, invoke, AlgebraError, BinaryKind, Operation, Tower};
use std::sync::Arc;

#[test]
fn repeated_binding_hits_the_cache() {
    type T = Restricted<1>;
    let op = Operation::sin().then(&Operation::exp());
    assert_eq!(binding_resolutions::<T>(), 0);

    let first = bind::<T>(&op).expect("bind");
    assert_eq!(binding_resolutions::<T>(), 1);
    assert_eq!(first.path(), BindingPath::Base);

    let second = bind::<T>(&op).expect("bind again");
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(binding_resolutions::<T>(), 1);

    // an equal tree built separately shares the entry
    let rebuilt = Operation::exp().compose(&Operation::sin());
    let third = bind::<T>(&rebuilt).expect("rebuilt");
    assert!(Arc::ptr_eq(&first, &third));

    let value = first.call(&Restricted(0.5)).expect("call");
    assert_close(value.0, 0.5_f64.sin().exp(), 1e-12);

    std::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                let cos = Operation::cos().as_binary();
                bind::<T>(&cos).expect("concurrent bind");
            });
        }
    });
    assert_eq!(binding_resolutions::<T>(), 2);
}

#[test]
fn order_zero_never_lifts() {
    type T = Restricted<2>;
    let x = Restricted::<2>(0.3);
    let values = derivative(&Operation::sin(), &x, 0).expect("order 0");
    assert_eq!(values.len(), 1);
    assert_close(values[0].0, 0.3_f64.sin(), 1e-15);
    assert_eq!(binding_resolutions::<Tower<T>>(), 0);
    assert_eq!(binding_resolutions::<T>(), 1);

    derivative(&Operation::sin(), &x, 1).expect("order 1");
    assert_eq!(binding_resolutions::<Tower<T>>(), 1);
}

#[test]
fn scalar_operations_without_components_are_unresolved() {
    type T = Restricted<3>;
    let op = Operation::with_scalar(BinaryKind::Multiply, 2.0);
    let err = invoke(&op, &[Restricted::<3>(1.0)]).expect_err("no components");
    assert!(matches!(err, AlgebraError::UnresolvedDispatch { .. }));
    assert!(err.is_structural());
    assert!(bind_base::<T>(&op).is_err());
    assert_eq!(binding_resolutions::<T>(), 0);
}

#[test]
fn unsupported_kinds_surface_at_invocation() {
    type T = Restricted<4>;
    // modulus has neither a native rule nor a derived formula here
    let err = invoke(&Operation::modulus(), &[Restricted::<4>(-2.0)]).expect_err("modulus");
    assert!(err.is_unsupported());
    let err = derivative(&Operation::modulus(), &Restricted::<4>(-2.0), 2).expect_err("lifted");
    assert!(err.is_unsupported());
    assert_eq!(binding_resolutions::<T>(), 1);
}

#[test]
fn fresh_literals_do_not_grow_the_cache_without_bound() {
    // f64 is bound nowhere else in this file
    let scaled = |value: f64| Operation::with_scalar(BinaryKind::Multiply, value);
    let first = bind::<f64>(&scaled(0.0)).expect("first literal");

    for i in 1..=MAX_BINDINGS_PER_TYPE {
        bind::<f64>(&scaled(i as f64)).expect("literal");
        assert!(cached_bindings::<f64>() <= MAX_BINDINGS_PER_TYPE);
    }
    assert_eq!(binding_resolutions::<f64>(), MAX_BINDINGS_PER_TYPE + 1);
    assert_eq!(cached_bindings::<f64>(), 1);

    // Handles survive eviction; rebinding the evicted tree resolves again
    assert_eq!(first.call(&3.0).expect("evicted handle"), 0.0);
    let again = bind::<f64>(&scaled(0.0)).expect("rebind");
    assert!(!Arc::ptr_eq(&first, &again));
    assert_eq!(binding_resolutions::<f64>(), MAX_BINDINGS_PER_TYPE + 2);
}

#[test]
fn other_types_keep_their_bindings_when_one_type_evicts() {
    type T = Restricted<5>;
    let op = Operation::tan().then(&Operation::negate());
    let kept = bind::<T>(&op).expect("bind");
    for i in 0..=MAX_BINDINGS_PER_TYPE {
        bind::<Tower<f64>>(&Operation::with_scalar(BinaryKind::Add, i as f64)).expect("literal");
    }
    assert!(Arc::ptr_eq(&kept, &bind::<T>(&op).expect("cached")));
    assert_eq!(binding_resolutions::<T>(), 1);
}
