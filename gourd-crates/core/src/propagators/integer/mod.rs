//! Contains relations over integer variables.
//!
//! All arithmetic is performed on `i64`, so intermediate results of operations on `i32` bounds
//! cannot overflow.
mod binary;
mod division;
mod element;
mod linear;
mod maximum;
mod multiplication;
mod plus;

pub use binary::*;
pub use division::*;
pub use element::*;
pub use linear::*;
pub use maximum::*;
pub use multiplication::*;
pub use plus::*;

use crate::engine::variables::IntVar;
use crate::propagation::ReadDomains;

/// The bounds of `var` widened to `i64`.
fn bounds(domains: &impl ReadDomains, var: IntVar) -> (i64, i64) {
    (
        i64::from(domains.lower_bound(var)),
        i64::from(domains.upper_bound(var)),
    )
}
