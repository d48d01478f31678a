#![cfg(test)] // workaround for https://github.com/rust-lang/rust-clippy/issues/11024

//! Randomised checks that propagation never removes a solution, and that a store at its
//! fixpoint is left unchanged by propagating any of its constraints again.
mod helpers;

use gourd_core::propagation::ReadDomains;
use gourd_core::propagators::float::ExpPeqR;
use gourd_core::propagators::float::PdivQeqR;
use gourd_core::propagators::float::PmulQeqR;
use gourd_core::propagators::float::PplusQeqR;
use gourd_core::propagators::float::SinPeqR;
use gourd_core::propagators::integer::XmulYeqZ;
use gourd_core::propagators::integer::XplusYeqZ;
use gourd_core::variables::FloatVar;
use gourd_core::variables::VarId;
use gourd_core::Store;
use helpers::float_var;
use helpers::int_var;
use helpers::snapshot;
use rand::rngs::SmallRng;
use rand::Rng;
use rand::SeedableRng;

const ROUNDS: usize = 200;

/// A dyadic value, so that sums and products of samples are exact.
fn sample(rng: &mut SmallRng) -> f64 {
    f64::from(rng.gen_range(-40_i32..=40)) / 8.0
}

/// A float variable whose domain contains `value`, with random slack on both sides.
fn around(store: &mut Store, rng: &mut SmallRng, value: f64) -> FloatVar {
    let below = rng.gen_range(1e-6..3.0);
    let above = rng.gen_range(1e-6..3.0);
    float_var(store, value - below, value + above)
}

fn assert_kept(store: &Store, var: FloatVar, value: f64, slack: f64) {
    let bounds = store.float_bounds(var);
    assert!(
        bounds.lower() <= value + slack && bounds.upper() >= value - slack,
        "{value} was removed from {}",
        store.float_domain(var)
    );
}

#[test]
fn float_arithmetic_keeps_sampled_solutions() {
    let mut rng = SmallRng::seed_from_u64(42);
    for _ in 0..ROUNDS {
        let (p, q) = (sample(&mut rng), sample(&mut rng));

        let mut store = Store::default();
        let (pv, qv) = (around(&mut store, &mut rng, p), around(&mut store, &mut rng, q));
        let sum = around(&mut store, &mut rng, p + q);
        let product = around(&mut store, &mut rng, p * q);
        let _ = store.impose(PplusQeqR::new(pv, qv, sum));
        let _ = store.impose(PmulQeqR::new(pv, qv, product));
        if q != 0.0 {
            let quotient = around(&mut store, &mut rng, p / q);
            let _ = store.impose(PdivQeqR::new(pv, qv, quotient));
        }

        store
            .consistency()
            .expect("the sampled point is a solution");
        assert_kept(&store, pv, p, 0.0);
        assert_kept(&store, qv, q, 0.0);
    }
}

#[test]
fn transcendental_functions_keep_sampled_solutions() {
    let mut rng = SmallRng::seed_from_u64(7);
    for _ in 0..ROUNDS {
        let p = rng.gen_range(-20.0..20.0);

        let mut store = Store::default();
        let pv = around(&mut store, &mut rng, p);
        let sine = around(&mut store, &mut rng, p.sin());
        let _ = store.impose(SinPeqR::new(pv, sine));
        if p < 5.0 {
            let exponential = around(&mut store, &mut rng, p.exp());
            let _ = store.impose(ExpPeqR::new(pv, exponential));
        }

        store
            .consistency()
            .expect("the sampled point is a solution");
        assert_kept(&store, pv, p, 0.0);
        assert_kept(&store, sine, p.sin(), 1e-15);
    }
}

#[test]
fn integer_arithmetic_keeps_sampled_solutions() {
    let mut rng = SmallRng::seed_from_u64(3);
    for _ in 0..ROUNDS {
        let (x, y) = (rng.gen_range(-20..=20), rng.gen_range(-20..=20));

        let mut store = Store::default();
        let xv = int_var(&mut store, x - rng.gen_range(0..10), x + rng.gen_range(0..10));
        let yv = int_var(&mut store, y - rng.gen_range(0..10), y + rng.gen_range(0..10));
        let zv = int_var(&mut store, x * y - rng.gen_range(0..50), x * y + rng.gen_range(0..50));
        let sv = int_var(&mut store, x + y - rng.gen_range(0..5), x + y + rng.gen_range(0..5));
        let _ = store.impose(XmulYeqZ::new(xv, yv, zv));
        let _ = store.impose(XplusYeqZ::new(xv, yv, sv));

        store
            .consistency()
            .expect("the sampled point is a solution");
        assert!(store.contains(xv, x));
        assert!(store.contains(yv, y));
        assert!(store.contains(zv, x * y));
        assert!(store.contains(sv, x + y));
    }
}

#[test]
fn fixpoint_is_stable_under_repeated_propagation() {
    let mut rng = SmallRng::seed_from_u64(11);
    for _ in 0..50 {
        let mut store = Store::default();
        let p = float_var(&mut store, -4.0, rng.gen_range(-1.0..4.0));
        let q = float_var(&mut store, rng.gen_range(-4.0..1.0), 4.0);
        let r = float_var(&mut store, rng.gen_range(-3.0..0.0), rng.gen_range(0.0..3.0));
        let s = float_var(&mut store, -1.0, rng.gen_range(-0.5..1.0));
        let vars: Vec<VarId> = vec![p.id(), q.id(), r.id(), s.id()];

        let _ = store.impose(PmulQeqR::new(p, q, r));
        let _ = store.impose(PplusQeqR::new(p, r, q));
        let _ = store.impose(SinPeqR::new(q, s));
        if store.consistency().is_err() {
            continue;
        }
        let fixpoint = snapshot(&store, &vars);

        for constraint in 0..3 {
            let mut again = store.clone();
            let _ = match constraint {
                0 => again.impose(PmulQeqR::new(p, q, r)).id(),
                1 => again.impose(PplusQeqR::new(p, r, q)).id(),
                _ => again.impose(SinPeqR::new(q, s)).id(),
            };
            again
                .consistency()
                .expect("a fixpoint is consistent with its constraints");
            assert_eq!(fixpoint, snapshot(&again, &vars));
        }
    }
}
