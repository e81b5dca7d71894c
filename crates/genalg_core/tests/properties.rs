mod common;

use common::{assert_close, Restricted};
use genalg_core::{algebra as alg, derivative, invoke, Operation};

type R = Restricted<0>;

#[test]
fn multiply_then_divide_returns_the_original() {
    for (x, y) in [(3.0, 7.0), (-2.5, 0.125), (1e3, -4.0)] {
        let (x, y): (R, R) = (Restricted(x), Restricted(y));
        let product = alg::mul(&x, &y).expect("mul");
        let back = alg::div(&product, &y).expect("div");
        assert_close(back.0, x.0, 1e-12 * x.0.abs().max(1.0));
    }
}

#[test]
fn derived_square_root_squares_back() {
    for x in [0.25, 2.0, 10.0, 1234.5] {
        let root = alg::sqrt(&Restricted::<0>(x)).expect("sqrt");
        let square = alg::square(&root).expect("square");
        assert_close(square.0, x, 1e-12 * x);
    }
}

#[test]
fn derived_pi_satisfies_trig_identities() {
    let pi = alg::pi::<R>().expect("pi");
    assert_close(pi.0, std::f64::consts::PI, 1e-15);
    let half_pi = alg::half(&pi).expect("half");
    assert_close(alg::sin(&half_pi).expect("sin").0, 1.0, 1e-15);
    assert_close(alg::cos(&pi).expect("cos").0, -1.0, 1e-15);
}

#[test]
fn derivatives_of_sine() {
    let x = 1.2;
    let values = derivative(&Operation::sin(), &Restricted::<0>(x), 2).expect("sin");
    assert_eq!(values.len(), 3);
    assert_close(values[0].0, x.sin(), 1e-12);
    assert_close(values[1].0, x.cos(), 1e-12);
    assert_close(values[2].0, -x.sin(), 1e-12);

    let first = derivative(&Operation::sin(), &x, 1).expect("f64");
    assert_close(first[1], x.cos(), 1e-12);
}

#[test]
fn derivatives_through_derived_formulas() {
    // tanh is derived at every level for this type; tanh' = 1 - tanh²
    let x = 0.4;
    let values = derivative(&Operation::tanh(), &Restricted::<0>(x), 1).expect("tanh");
    assert_close(values[0].0, x.tanh(), 1e-12);
    assert_close(values[1].0, 1.0 - x.tanh().powi(2), 1e-12);
}

#[test]
fn double_swap_and_duplicating_apply() {
    let sub = Operation::sub();
    let (a, b) = (Restricted::<0>(9.0), Restricted::<0>(4.0));
    let direct = invoke(&sub, &[a, b]).expect("sub");
    let twice = invoke(&sub.swap().swap(), &[a, b]).expect("swap");
    assert_eq!(direct, twice);

    let duplicated = Operation::mul().as_unary().apply(vec![None, None]);
    let x = Restricted::<0>(-3.0);
    assert_eq!(
        invoke(&duplicated, &[x]).expect("apply"),
        invoke(&Operation::mul(), &[x, x]).expect("mul")
    );
}

#[test]
fn derived_atan2_picks_the_right_quadrant() {
    let points = [
        (1.0, 1.0),
        (1.0, -1.0),
        (-1.0, -1.0),
        (-1.0, 1.0),
        (0.0, 1.0),
        (0.0, -1.0),
        (3.0, 0.0),
        (-3.0, 0.0),
    ];
    for (y, x) in points {
        let angle = alg::atan2(&Restricted::<0>(y), &Restricted::<0>(x)).expect("atan2");
        assert_close(angle.0, f64::atan2(y, x), 1e-12);
    }
}

#[test]
fn dimensions_follow_the_data_model() {
    use genalg_core::{Dual, Number, Tower};
    use num_complex::Complex64;

    assert_eq!(f64::dimension(), Some(1));
    assert_eq!(Complex64::dimension(), Some(2));
    assert_eq!(Dual::<f64>::dimension(), Some(2));
    assert_eq!(Dual::<Complex64>::dimension(), Some(4));
    assert_eq!(Dual::<Dual<f64>>::dimension(), Some(4));
    assert_eq!(Tower::<f64>::dimension(), None);
    assert_eq!(R::dimension(), None);
    assert_eq!(Dual::<R>::dimension(), None);
}
