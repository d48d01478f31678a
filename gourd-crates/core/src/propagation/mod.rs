//! Contains the main building blocks for constraints.
//!
//! # Background
//!
//! A constraint takes as input a set of variables (<code>x<sub>i</sub> ∈ X</code>) and for each
//! variable a corresponding domain (<code>D<sub>i</sub> ∈ D</code>); its consistency can then be
//! seen as a function which maps `D ↦ D'` such that <code>D'<sub>i</sub> ⊆ D<sub>i</sub></code>
//! for all variables. Integer domains are finite sets of integers, float domains are unions of
//! closed intervals whose bounds are rounded outward, so no real solution is ever removed.
//!
//! An example is the not equal (`!=`) constraint: given `x ∈ {0}` and `y ∈ {0, 1}`, its
//! consistency produces <code>D'<sub>y</sub> = {1}</code>.
//!
//! A constraint is at its fixpoint if applying its consistency again changes nothing. Unlike
//! many propagation engines, the store requires a single call of [`Constraint::consistency`] to
//! reach the fixpoint of the constraint: it does not wake a constraint for its own changes.
//!
//! # Practical
//!
//! Each concrete constraint implements [`Constraint`]. Constraints which can also enforce their
//! negation implement [`PrimitiveConstraint`], which allows them to be embedded in the logical
//! combinators.
//!
//! A constraint narrows domains through the [`PropagationContext`] it is given, and inspects
//! domains through the [`ReadDomains`] functions available on both the context and [`Domains`].
//! The store registers the constraint on its [`Constraint::scope`] for the
//! [`Constraint::consistency_pruning_event`] of every variable.
//!
//! Constraints are added to the model through [`Store::impose`], which hands back a
//! [`ConstraintHandle`].
//!
//! See the [`propagators`] folder for concrete implementations.
mod constraint;
mod constraint_id;
mod context;
mod primitive;

pub use constraint::*;
pub use constraint_id::*;
pub use context::*;
pub use primitive::*;

#[cfg(doc)]
use crate::engine::Store;
#[cfg(doc)]
use crate::propagators;
