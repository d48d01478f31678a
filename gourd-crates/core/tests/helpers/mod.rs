//! Shortcuts shared by the integration tests.
#![allow(dead_code, reason = "not every test binary uses every helper")]

use gourd_core::domains::Domain;
use gourd_core::propagation::ReadDomains;
use gourd_core::variables::FloatVar;
use gourd_core::variables::IntVar;
use gourd_core::variables::VarId;
use gourd_core::Store;

pub(crate) fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub(crate) fn int_var(store: &mut Store, lower: i32, upper: i32) -> IntVar {
    store.new_int_variable(lower, upper).expect("valid bounds")
}

pub(crate) fn float_var(store: &mut Store, lower: f64, upper: f64) -> FloatVar {
    store.new_float_variable(lower, upper).expect("valid bounds")
}

/// Copies of the current domains of `vars`.
pub(crate) fn snapshot(store: &Store, vars: &[VarId]) -> Vec<Domain> {
    vars.iter().map(|&var| store.domain(var).clone()).collect()
}
