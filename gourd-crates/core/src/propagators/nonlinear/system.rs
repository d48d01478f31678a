use std::fmt::Display;

use itertools::Itertools;
use log::debug;
use log::trace;

use super::DerivativeEngine;
use super::ExpressionGraph;
use super::GaussSeidelOutcome;
use super::IntervalGaussSeidel;
use super::NewtonOptions;
use super::NewtonStatistics;
use super::UnsupportedStructure;
use crate::basic_types::EmptyDomain;
use crate::basic_types::PropagationStatus;
use crate::containers::HashMap;
use crate::engine::variables::FloatVar;
use crate::engine::variables::VarId;
use crate::engine::Store;
use crate::math::is_within_precision;
use crate::math::Interval;
use crate::propagation::Constraint;
use crate::propagation::ConstraintHandle;
use crate::propagation::Domains;
use crate::propagation::PropagationContext;
use crate::propagation::ReadDomains;
use crate::statistics::Statistic;
use crate::statistics::StatisticLogger;

/// The system `f_i(x) = 0` of float variables `f_i` over the unknowns `x`, narrowed with the
/// interval Newton method.
///
/// The Jacobian is synthesized once, when the system is imposed, by a [`DerivativeEngine`]. Every
/// Newton step evaluates the functions at the midpoint of the box of unknowns and the Jacobian
/// over the whole box, and solves the linear enclosure with [`IntervalGaussSeidel`]. A step which
/// cannot be carried out is declined; the domains are then left as they are.
#[derive(Clone, Debug)]
pub struct NonlinearSystem {
    functions: Box<[FloatVar]>,
    unknowns: Box<[FloatVar]>,
    /// `jacobian[i][j]` is the derivative of function `i` with respect to unknown `j`.
    jacobian: Box<[Box<[FloatVar]>]>,
    graph: ExpressionGraph,
    scope: Vec<VarId>,
    options: NewtonOptions,
    statistics: NewtonStatistics,
}

impl NonlinearSystem {
    /// Synthesizes the Jacobian of `functions` over `unknowns` and imposes `functions = 0`.
    ///
    /// Fails if there are not as many functions as unknowns, or if a function is not built from
    /// differentiable relations.
    pub fn impose(
        store: &mut Store,
        functions: Vec<FloatVar>,
        unknowns: Vec<FloatVar>,
        options: NewtonOptions,
    ) -> Result<ConstraintHandle<NonlinearSystem>, UnsupportedStructure> {
        if functions.is_empty() || functions.len() != unknowns.len() {
            return Err(UnsupportedStructure::NotSquare {
                functions: functions.len(),
                unknowns: unknowns.len(),
            });
        }

        let mut engine = DerivativeEngine::new(store, &unknowns);
        let jacobian = functions
            .iter()
            .map(|&function| {
                unknowns
                    .iter()
                    .map(|&unknown| engine.derivative(function, unknown))
                    .collect::<Result<Box<[_]>, _>>()
            })
            .collect::<Result<Box<[_]>, _>>()?;
        let graph = engine.into_graph();

        let scope = functions
            .iter()
            .chain(unknowns.iter())
            .map(|var| var.id())
            .chain(graph.leaves())
            .unique()
            .collect_vec();

        debug!(
            "Imposing a system of {} equations over {} relations",
            functions.len(),
            graph.len()
        );

        Ok(store.impose(NonlinearSystem {
            functions: functions.into(),
            unknowns: unknowns.into(),
            jacobian,
            graph,
            scope,
            options,
            statistics: NewtonStatistics::default(),
        }))
    }

    pub fn statistics(&self) -> NewtonStatistics {
        self.statistics
    }

    fn decline(&mut self, reason: &str) -> bool {
        trace!("Declined Newton step: {reason}");
        self.statistics.declines += 1;
        false
    }

    /// Carries out one Newton step. Returns false if the step was declined.
    fn newton_step(&mut self, context: &mut PropagationContext<'_>) -> Result<bool, EmptyDomain> {
        self.statistics.steps += 1;

        let bounds = self
            .unknowns
            .iter()
            .map(|&unknown| context.float_bounds(unknown))
            .collect_vec();
        let Some(midpoint) = bounds
            .iter()
            .map(Interval::midpoint)
            .collect::<Option<Vec<_>>>()
        else {
            return Ok(self.decline("unbounded unknowns"));
        };

        let (residuals, jacobian) = {
            let domains = context.domains();

            let at_midpoint = self
                .unknowns
                .iter()
                .zip(&midpoint)
                .map(|(unknown, &value)| (unknown.id(), Interval::point(value)))
                .collect::<HashMap<_, _>>();
            let mut evaluation = self.graph.evaluation(&domains, at_midpoint);
            let residuals = self
                .functions
                .iter()
                .map(|&function| evaluation.value(function))
                .collect::<Option<Vec<_>>>();

            let over_box = self
                .unknowns
                .iter()
                .zip(&bounds)
                .map(|(unknown, &interval)| (unknown.id(), interval))
                .collect::<HashMap<_, _>>();
            let mut evaluation = self.graph.evaluation(&domains, over_box);
            let jacobian = self
                .jacobian
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|&derivative| evaluation.value(derivative))
                        .collect::<Option<Vec<_>>>()
                })
                .collect::<Option<Vec<_>>>();

            (residuals, jacobian)
        };
        let (Some(residuals), Some(jacobian)) = (residuals, jacobian) else {
            return Ok(self.decline("undefined at the box"));
        };

        // x* - m solves J(x* - m) = -F(m) for some J in the Jacobian over the box
        let offsets = bounds
            .iter()
            .zip(&midpoint)
            .map(|(interval, &value)| interval.sub(Interval::point(value)))
            .collect_vec();
        let rhs = residuals.into_iter().map(Interval::neg).collect_vec();
        let outcome = IntervalGaussSeidel::new(jacobian, rhs).solve(
            offsets,
            self.options.gauss_seidel_iterations,
            self.options.preconditioning,
        );

        match outcome {
            GaussSeidelOutcome::Solution {
                enclosure,
                preconditioned,
                ..
            } => {
                if preconditioned {
                    self.statistics.preconditionings += 1;
                }
                let changes = context.changes();
                for ((&unknown, &value), delta) in
                    self.unknowns.iter().zip(&midpoint).zip(enclosure)
                {
                    context.in_float_interval(unknown, Interval::point(value).add(delta))?;
                }
                if context.changes() != changes {
                    self.statistics.narrowing_steps += 1;
                }
                Ok(true)
            }
            GaussSeidelOutcome::NoSolution => {
                self.statistics.failures += 1;
                debug!("Newton step proved that {self} has no solution in the box");
                Err(EmptyDomain)
            }
            GaussSeidelOutcome::NotDominant => Ok(self.decline("no diagonally dominant order")),
        }
    }
}

impl Constraint for NonlinearSystem {
    fn name(&self) -> &str {
        "NonlinearSystem"
    }

    fn scope(&self) -> Vec<VarId> {
        self.scope.clone()
    }

    fn consistency(&mut self, context: &mut PropagationContext<'_>) -> PropagationStatus {
        for &function in self.functions.iter() {
            context.in_float_interval(function, Interval::point(0.0))?;
        }

        for _ in 0..self.options.max_steps {
            let changes = context.changes();
            let carried_out = self.newton_step(context)?;
            if !carried_out || changes == context.changes() {
                break;
            }
        }
        Ok(())
    }

    fn satisfied(&self, domains: &Domains<'_>) -> bool {
        if self
            .unknowns
            .iter()
            .any(|unknown| !domains.is_ground(unknown.id()))
        {
            return false;
        }

        let mut evaluation = self.graph.evaluation(domains, HashMap::default());
        self.functions.iter().all(|&function| {
            evaluation.value(function).is_some_and(|value| {
                value.contains_zero() && is_within_precision(value.lower(), value.upper())
            })
        })
    }

    fn log_statistics(&self, statistic_logger: StatisticLogger) {
        self.statistics.log(statistic_logger);
    }
}

impl Display for NonlinearSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "NonlinearSystem([{}] = 0 over [{}])",
            self.functions.iter().join(", "),
            self.unknowns.iter().join(", ")
        )
    }
}
