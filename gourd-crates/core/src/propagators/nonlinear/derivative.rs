use log::trace;

use super::ExpressionGraph;
use super::UnsupportedStructure;
use crate::basic_types::ModelConstructionError;
use crate::containers::HashMap;
use crate::containers::HashSet;
use crate::engine::domains::FloatDomain;
use crate::engine::variables::FloatVar;
use crate::engine::variables::VarId;
use crate::engine::Store;
use crate::math::Interval;
use crate::propagation::Constraint;
use crate::propagation::ConstraintId;
use crate::propagation::ReadDomains;
use crate::propagators::float::CosPeqR;
use crate::propagators::float::PdivQeqR;
use crate::propagators::float::PminusQeqR;
use crate::propagators::float::PmulCeqR;
use crate::propagators::float::PmulQeqR;
use crate::propagators::float::PplusCeqR;
use crate::propagators::float::PplusQeqR;
use crate::propagators::float::SinPeqR;
use crate::propagators::nonlinear::DifferentiableRelation;

/// Synthesizes derivatives of float variables which are defined through
/// [`DifferentiableRelation`]s.
///
/// A derivative is itself a float variable, defined by helper relations which the engine adds to
/// the store as derivative-only: they are never woken and never propagate, they only describe how
/// to evaluate the derivative. Every relation visited on the way, helpers included, is collected
/// into an expression graph from which the Newton method evaluates the system.
///
/// The definition of a variable is its explicit definition registered through
/// [`Store::define`] if there is one, and otherwise the unique relation whose output it is.
/// Relations which are being expanded are skipped, which breaks cycles.
#[derive(Debug)]
pub struct DerivativeEngine<'a> {
    store: &'a mut Store,
    /// Variables which are independent; their derivatives are 0 or 1.
    primitives: HashSet<VarId>,
    /// The relations currently being differentiated.
    resolving: Vec<ConstraintId>,
    derivatives: HashMap<(VarId, VarId), FloatVar>,
    constants: HashMap<u64, FloatVar>,
    constant_values: HashMap<VarId, f64>,
    graph: ExpressionGraph,
}

impl<'a> DerivativeEngine<'a> {
    pub(crate) fn new(store: &'a mut Store, primitives: &[FloatVar]) -> Self {
        DerivativeEngine {
            store,
            primitives: primitives.iter().map(|var| var.id()).collect(),
            resolving: vec![],
            derivatives: HashMap::default(),
            constants: HashMap::default(),
            constant_values: HashMap::default(),
            graph: ExpressionGraph::default(),
        }
    }

    /// The relations visited while synthesizing derivatives.
    pub(crate) fn into_graph(self) -> ExpressionGraph {
        self.graph
    }

    /// Returns a variable equal to `df / dwrt`.
    pub fn derivative(
        &mut self,
        f: FloatVar,
        wrt: FloatVar,
    ) -> Result<FloatVar, UnsupportedStructure> {
        if f == wrt {
            return Ok(self.constant(1.0));
        }
        if self.primitives.contains(&f.id()) || self.constant_values.contains_key(&f.id()) {
            return Ok(self.constant(0.0));
        }
        if let Some(&derivative) = self.derivatives.get(&(f.id(), wrt.id())) {
            return Ok(derivative);
        }

        let Some((id, relation)) = self.definition(f)? else {
            // a parameter without a definition does not depend on anything
            return Ok(self.constant(0.0));
        };

        self.resolving.push(id);
        let result = match relation.as_differentiable() {
            Some(differentiable) => differentiable.differentiate(wrt, self),
            None => Err(UnsupportedStructure::NotDifferentiable {
                relation: relation.to_string(),
            }),
        };
        let _ = self.resolving.pop();
        let derivative = result?;

        trace!("d{f}/d{wrt} = {derivative} through {relation}");
        self.graph.insert(relation);
        let _ = self.derivatives.insert((f.id(), wrt.id()), derivative);
        Ok(derivative)
    }

    /// The relation defining `f`, or `None` if `f` is ground and has no definition.
    fn definition(
        &self,
        f: FloatVar,
    ) -> Result<Option<(ConstraintId, Box<dyn Constraint>)>, UnsupportedStructure> {
        let explicit = self
            .store
            .explicit_definition(f.id())
            .filter(|id| !self.resolving.contains(id));
        let candidates = match explicit {
            Some(id) => vec![id],
            None => self
                .store
                .relations_with_output(f.id())
                .into_iter()
                .filter(|id| !self.resolving.contains(id))
                .collect(),
        };

        match candidates.as_slice() {
            [id] => Ok(self.store.relation(*id).map(|relation| (*id, relation))),
            [] if self.store.is_ground(f.id()) => Ok(None),
            [] => Err(UnsupportedStructure::NoDefinition {
                variable: self.store.describe(f),
            }),
            _ => Err(UnsupportedStructure::AmbiguousDefinition {
                variable: self.store.describe(f),
                candidates: candidates.len(),
            }),
        }
    }

    fn is_constant(&self, var: FloatVar, value: f64) -> bool {
        self.constant_values.get(&var.id()) == Some(&value)
    }

    fn constant(&mut self, value: f64) -> FloatVar {
        if let Some(&var) = self.constants.get(&value.to_bits()) {
            return var;
        }
        let var = self
            .store
            .new_float_variable_with_domain(FloatDomain::from_interval(Interval::point(value)), None);
        let _ = self.constants.insert(value.to_bits(), var);
        let _ = self.constant_values.insert(var.id(), value);
        var
    }

    fn auxiliary(&mut self) -> FloatVar {
        self.store
            .new_float_variable_with_domain(FloatDomain::from_interval(Interval::entire()), None)
    }

    fn add_helper<C>(&mut self, relation: C) -> FloatVar
    where
        C: Constraint + DifferentiableRelation + Clone,
    {
        let output = relation.output();
        self.graph.insert(Box::new(relation.clone()));
        let _ = self.store.impose_derivative_only(relation);
        output
    }

    /// A variable equal to `a + b`.
    pub fn add(&mut self, a: FloatVar, b: FloatVar) -> FloatVar {
        if self.is_constant(a, 0.0) {
            return b;
        }
        if self.is_constant(b, 0.0) {
            return a;
        }
        let output = self.auxiliary();
        self.add_helper(PplusQeqR::new(a, b, output))
    }

    /// A variable equal to `a - b`.
    pub fn sub(&mut self, a: FloatVar, b: FloatVar) -> FloatVar {
        if self.is_constant(b, 0.0) {
            return a;
        }
        let output = self.auxiliary();
        self.add_helper(PminusQeqR::new(a, b, output))
    }

    /// A variable equal to `a * b`.
    pub fn mul(&mut self, a: FloatVar, b: FloatVar) -> FloatVar {
        if self.is_constant(a, 0.0) || self.is_constant(b, 0.0) {
            return self.constant(0.0);
        }
        if self.is_constant(a, 1.0) {
            return b;
        }
        if self.is_constant(b, 1.0) {
            return a;
        }
        let output = self.auxiliary();
        self.add_helper(PmulQeqR::new(a, b, output))
    }

    /// A variable equal to `a / b`.
    pub fn div(&mut self, a: FloatVar, b: FloatVar) -> FloatVar {
        if self.is_constant(a, 0.0) {
            return self.constant(0.0);
        }
        if self.is_constant(b, 1.0) {
            return a;
        }
        let output = self.auxiliary();
        self.add_helper(PdivQeqR::new(a, b, output))
    }

    /// A variable equal to `a * factor`.
    pub fn scale(&mut self, a: FloatVar, factor: f64) -> Result<FloatVar, UnsupportedStructure> {
        if factor == 0.0 || self.is_constant(a, 0.0) {
            return Ok(self.constant(0.0));
        }
        if factor == 1.0 {
            return Ok(a);
        }
        let output = self.auxiliary();
        let relation = PmulCeqR::new(a, factor, output).map_err(unsupported_constant)?;
        Ok(self.add_helper(relation))
    }

    /// A variable equal to `a + offset`.
    pub fn add_constant(
        &mut self,
        a: FloatVar,
        offset: f64,
    ) -> Result<FloatVar, UnsupportedStructure> {
        if offset == 0.0 {
            return Ok(a);
        }
        let output = self.auxiliary();
        let relation = PplusCeqR::new(a, offset, output).map_err(unsupported_constant)?;
        Ok(self.add_helper(relation))
    }

    /// A variable equal to `sin(a)`.
    pub fn sin(&mut self, a: FloatVar) -> FloatVar {
        let output = self.auxiliary();
        self.add_helper(SinPeqR::new(a, output))
    }

    /// A variable equal to `cos(a)`.
    pub fn cos(&mut self, a: FloatVar) -> FloatVar {
        let output = self.auxiliary();
        self.add_helper(CosPeqR::new(a, output))
    }
}

fn unsupported_constant(error: ModelConstructionError) -> UnsupportedStructure {
    UnsupportedStructure::NotDifferentiable {
        relation: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_store::TestStore;
    use crate::propagators::float::PeqQ;

    fn evaluate_at(
        store: &Store,
        graph: &ExpressionGraph,
        var: FloatVar,
        assignment: &[(FloatVar, f64)],
    ) -> Option<Interval> {
        let assignment: HashMap<VarId, Interval> = assignment
            .iter()
            .map(|&(var, value)| (var.id(), Interval::point(value)))
            .collect();
        graph.evaluation(store, assignment).value(var)
    }

    #[test]
    fn derivative_of_a_primitive_is_a_constant() {
        let mut store = TestStore::default();
        let x = store.new_float_variable(0.0, 1.0);
        let y = store.new_float_variable(0.0, 1.0);

        let (dx, dy) = {
            let mut engine = DerivativeEngine::new(&mut store, &[x, y]);
            (
                engine.derivative(x, x).expect("derivative exists"),
                engine.derivative(y, x).expect("derivative exists"),
            )
        };

        assert_eq!(Interval::point(1.0), store.float_bounds(dx));
        assert_eq!(Interval::point(0.0), store.float_bounds(dy));
    }

    #[test]
    fn product_rule() {
        let mut store = TestStore::default();
        let x = store.new_float_variable(-10.0, 10.0);
        let y = store.new_float_variable(-10.0, 10.0);
        let f = store.new_float_variable(-100.0, 100.0);
        let _ = store.impose(PmulQeqR::new(x, y, f));

        let mut engine = DerivativeEngine::new(&mut store, &[x, y]);
        let df_dx = engine.derivative(f, x).expect("derivative exists");
        let graph = engine.into_graph();

        assert_eq!(
            Some(Interval::point(3.0)),
            evaluate_at(&store, &graph, df_dx, &[(x, 2.0), (y, 3.0)])
        );
    }

    #[test]
    fn chain_rule_through_intermediate_variables() {
        let mut store = TestStore::default();
        let x = store.new_float_variable(-1.0, 1.0);
        let square = store.new_float_variable(f64::NEG_INFINITY, f64::INFINITY);
        let f = store.new_float_variable(f64::NEG_INFINITY, f64::INFINITY);
        let _ = store.impose(PmulQeqR::new(x, x, square));
        let _ = store.impose(SinPeqR::new(square, f));

        let mut engine = DerivativeEngine::new(&mut store, &[x]);
        let df_dx = engine.derivative(f, x).expect("derivative exists");
        let graph = engine.into_graph();

        // d sin(x^2) / dx = 2x cos(x^2)
        let expected = 2.0 * 0.5 * 0.25_f64.cos();
        let value = evaluate_at(&store, &graph, df_dx, &[(x, 0.5)]).expect("defined");
        assert!(value.contains(expected));
        assert!(value.width() < 1e-12);
    }

    #[test]
    fn quotient_rule() {
        let mut store = TestStore::default();
        let x = store.new_float_variable(1.0, 4.0);
        let f = store.new_float_variable(f64::NEG_INFINITY, f64::INFINITY);
        let one = store.new_float_constant(1.0).expect("finite constant");
        let _ = store.impose(PdivQeqR::new(one, x, f));

        let mut engine = DerivativeEngine::new(&mut store, &[x]);
        let df_dx = engine.derivative(f, x).expect("derivative exists");
        let graph = engine.into_graph();

        // d(1 / x) / dx = -1 / x^2
        let value = evaluate_at(&store, &graph, df_dx, &[(x, 2.0)]).expect("defined");
        assert!(value.contains(-0.25));
        assert!(value.width() < 1e-12);
    }

    #[test]
    fn zero_derivatives_are_folded() {
        let mut store = TestStore::default();
        let x = store.new_float_variable(0.0, 1.0);
        let y = store.new_float_variable(0.0, 1.0);
        let f = store.new_float_variable(f64::NEG_INFINITY, f64::INFINITY);
        let _ = store.impose(PplusQeqR::new(x, y, f));
        let constraints = store.num_constraints();

        let df_dx = DerivativeEngine::new(&mut store, &[x, y])
            .derivative(f, x)
            .expect("derivative exists");

        assert_eq!(Interval::point(1.0), store.float_bounds(df_dx));
        assert_eq!(constraints, store.num_constraints());
    }

    #[test]
    fn derivative_helpers_never_propagate() {
        let mut store = TestStore::default();
        let x = store.new_float_variable(0.0, 1.0);
        let f = store.new_float_variable(f64::NEG_INFINITY, f64::INFINITY);
        let _ = store.impose(SinPeqR::new(x, f));

        let df_dx = DerivativeEngine::new(&mut store, &[x])
            .derivative(f, x)
            .expect("derivative exists");
        store.consistency().expect("no empty domains");
        store.in_float(x, 0.0, 0.5).expect("no empty domains");
        store.consistency().expect("no empty domains");

        assert!(store.float_bounds(f).upper() < 0.5);
        assert_eq!(Interval::entire(), store.float_bounds(df_dx));
    }

    #[test]
    fn ambiguous_definitions_are_reported() {
        let mut store = TestStore::default();
        let x = store.new_float_variable(0.0, 1.0);
        let y = store.new_float_variable(0.0, 1.0);
        let f = store.new_float_variable(f64::NEG_INFINITY, f64::INFINITY);
        let _ = store.impose(PeqQ::new(x, f));
        let handle = store.impose(PeqQ::new(y, f));

        assert!(matches!(
            DerivativeEngine::new(&mut store, &[x, y]).derivative(f, x),
            Err(UnsupportedStructure::AmbiguousDefinition { candidates: 2, .. })
        ));

        store.define(f, handle).expect("the relation defines f");
        let (df_dx, df_dy) = {
            let mut engine = DerivativeEngine::new(&mut store, &[x, y]);
            (
                engine.derivative(f, x).expect("explicit definition"),
                engine.derivative(f, y).expect("explicit definition"),
            )
        };

        assert_eq!(Interval::point(0.0), store.float_bounds(df_dx));
        assert_eq!(Interval::point(1.0), store.float_bounds(df_dy));
    }

    #[test]
    fn undefined_functions_are_reported() {
        let mut store = TestStore::default();
        let x = store.new_float_variable(0.0, 1.0);
        let f = store.new_float_variable(0.0, 1.0);

        let mut engine = DerivativeEngine::new(&mut store, &[x]);
        assert!(matches!(
            engine.derivative(f, x),
            Err(UnsupportedStructure::NoDefinition { .. })
        ));
    }
}
