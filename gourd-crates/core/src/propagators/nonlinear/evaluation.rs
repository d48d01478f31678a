use itertools::Itertools;

use crate::containers::HashMap;
use crate::containers::HashSet;
use crate::engine::variables::FloatVar;
use crate::engine::variables::VarId;
use crate::math::Interval;
use crate::propagation::Constraint;
use crate::propagation::ReadDomains;

/// The relations defining the functions of a non-linear system and their derivatives, keyed by
/// the variable they define. Variables without a relation are leaves of the graph.
#[derive(Clone, Default)]
pub(crate) struct ExpressionGraph {
    relations: HashMap<VarId, Box<dyn Constraint>>,
}

impl std::fmt::Debug for ExpressionGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(
                self.relations
                    .iter()
                    .map(|(var, relation)| (var, relation.to_string())),
            )
            .finish()
    }
}

impl ExpressionGraph {
    /// Adds `relation` as the definition of its output, unless that output already has one.
    /// Constraints without a functional view are ignored.
    pub(crate) fn insert(&mut self, relation: Box<dyn Constraint>) {
        let Some(output) = relation
            .as_differentiable()
            .map(|relation| relation.output().id())
        else {
            return;
        };
        let _ = self.relations.entry(output).or_insert(relation);
    }

    pub(crate) fn len(&self) -> usize {
        self.relations.len()
    }

    /// The variables used by the relations which are not defined in the graph.
    pub(crate) fn leaves(&self) -> Vec<VarId> {
        self.relations
            .values()
            .filter_map(|relation| relation.as_differentiable())
            .flat_map(|relation| relation.inputs())
            .map(FloatVar::id)
            .filter(|var| !self.relations.contains_key(var))
            .unique()
            .collect()
    }

    /// Starts an evaluation in which the variables of `assignment` take the given values, and
    /// the other leaves range over the hulls of their domains.
    pub(crate) fn evaluation<'a, D: ReadDomains>(
        &'a self,
        domains: &'a D,
        assignment: HashMap<VarId, Interval>,
    ) -> Evaluation<'a, D> {
        Evaluation {
            graph: self,
            domains,
            assignment,
            memo: HashMap::default(),
            visiting: HashSet::default(),
        }
    }
}

/// Evaluates variables of an [`ExpressionGraph`] over a fixed assignment, remembering every
/// intermediate result.
pub(crate) struct Evaluation<'a, D> {
    graph: &'a ExpressionGraph,
    domains: &'a D,
    assignment: HashMap<VarId, Interval>,
    memo: HashMap<VarId, Option<Interval>>,
    visiting: HashSet<VarId>,
}

impl<D> std::fmt::Debug for Evaluation<'_, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Evaluation")
            .field("assignment", &self.assignment)
            .field("memo", &self.memo)
            .finish_non_exhaustive()
    }
}

impl<D: ReadDomains> Evaluation<'_, D> {
    /// An enclosure of the values of `var`, or `None` if a relation on the way is undefined or
    /// the relations are cyclic.
    ///
    /// The result is not intersected with the domain of `var`: at the midpoint of a box the
    /// domains describe the whole box, not the point.
    pub(crate) fn value(&mut self, var: FloatVar) -> Option<Interval> {
        let id = var.id();
        if let Some(&value) = self.assignment.get(&id) {
            return Some(value);
        }
        if let Some(&value) = self.memo.get(&id) {
            return value;
        }

        let graph = self.graph;
        let Some(relation) = graph
            .relations
            .get(&id)
            .and_then(|relation| relation.as_differentiable())
        else {
            return Some(self.domains.float_bounds(var));
        };

        if !self.visiting.insert(id) {
            return None;
        }
        let value = relation
            .inputs()
            .into_iter()
            .map(|input| self.value(input))
            .collect::<Option<Vec<_>>>()
            .and_then(|inputs| relation.evaluate(&inputs));
        let _ = self.visiting.remove(&id);

        let _ = self.memo.insert(id, value);
        value
    }
}
