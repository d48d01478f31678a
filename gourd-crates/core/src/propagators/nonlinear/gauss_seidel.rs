use log::trace;

use super::Preconditioning;
use crate::gourd_assert_advanced;
use crate::gourd_assert_eq_simple;
use crate::gourd_assert_simple;
use crate::math::Interval;

/// The result of [`IntervalGaussSeidel::solve`].
#[derive(Clone, Debug, PartialEq)]
pub enum GaussSeidelOutcome {
    /// An enclosure of every solution inside the initial box.
    Solution {
        enclosure: Vec<Interval>,
        /// The number of sweeps which narrowed the box.
        iterations: usize,
        preconditioned: bool,
    },
    /// The initial box contains no solution.
    NoSolution,
    /// No order of the rows is diagonally dominant, not even after preconditioning.
    NotDominant,
}

/// Encloses the solutions of the interval linear system `A x = b` inside a box.
///
/// Each sweep solves row `i` for unknown `i` using the latest values of the other unknowns, and
/// intersects the result with the box. This requires the diagonal to dominate its row, so the
/// rows are first reordered by an exhaustive search. If no order works, the system is
/// multiplied by the inverse of the midpoint of `A` and the search is repeated.
#[derive(Clone, Debug)]
pub struct IntervalGaussSeidel {
    matrix: Vec<Vec<Interval>>,
    rhs: Vec<Interval>,
}

impl IntervalGaussSeidel {
    pub fn new(matrix: Vec<Vec<Interval>>, rhs: Vec<Interval>) -> Self {
        gourd_assert_simple!(
            matrix.len() == rhs.len() && matrix.iter().all(|row| row.len() == rhs.len()),
            "the linear system must be square"
        );
        IntervalGaussSeidel { matrix, rhs }
    }

    /// Narrows `initial` to the solutions of the system, sweeping at most `max_iterations` times.
    pub fn solve(
        &self,
        initial: Vec<Interval>,
        max_iterations: usize,
        preconditioning: Preconditioning,
    ) -> GaussSeidelOutcome {
        gourd_assert_eq_simple!(initial.len(), self.rhs.len());

        let mut system = (self.matrix.clone(), self.rhs.clone());
        let mut preconditioned = false;
        if preconditioning == Preconditioning::Always {
            if let Some(transformed) = self.preconditioned() {
                system = transformed;
                preconditioned = true;
            }
        }

        let mut order = dominant_order(&system.0);
        if order.is_none() && preconditioning == Preconditioning::WhenNotDominant {
            if let Some(transformed) = self.preconditioned() {
                order = dominant_order(&transformed.0);
                system = transformed;
                preconditioned = true;
            }
        }
        let Some(order) = order else {
            trace!("No diagonally dominant row order");
            return GaussSeidelOutcome::NotDominant;
        };

        let (matrix, rhs) = system;
        let mut x = initial;
        let mut iterations = 0;
        for _ in 0..max_iterations {
            let mut narrowed = false;
            for (i, &row) in order.iter().enumerate() {
                let mut residual = rhs[row];
                for (j, &coefficient) in matrix[row].iter().enumerate() {
                    if j != i {
                        residual = residual.sub(coefficient.mul(x[j]));
                    }
                }
                let Some(candidate) = residual.div(matrix[row][i]) else {
                    return GaussSeidelOutcome::NoSolution;
                };
                let Some(intersection) = x[i].intersect(candidate) else {
                    return GaussSeidelOutcome::NoSolution;
                };
                gourd_assert_advanced!(intersection.is_subset_of(x[i]));
                if intersection != x[i] {
                    x[i] = intersection;
                    narrowed = true;
                }
            }
            if !narrowed {
                break;
            }
            iterations += 1;
        }

        GaussSeidelOutcome::Solution {
            enclosure: x,
            iterations,
            preconditioned,
        }
    }

    /// The system multiplied from the left by the inverse of the midpoint matrix, if that exists.
    fn preconditioned(&self) -> Option<(Vec<Vec<Interval>>, Vec<Interval>)> {
        let midpoint = self
            .matrix
            .iter()
            .map(|row| row.iter().map(Interval::midpoint).collect::<Option<Vec<_>>>())
            .collect::<Option<Vec<_>>>()?;
        let inverse = inverse(midpoint)?;

        let n = self.rhs.len();
        let matrix = inverse
            .iter()
            .map(|weights| {
                (0..n)
                    .map(|j| combination(weights, |k| self.matrix[k][j]))
                    .collect()
            })
            .collect();
        let rhs = inverse
            .iter()
            .map(|weights| combination(weights, |k| self.rhs[k]))
            .collect();
        Some((matrix, rhs))
    }
}

/// The sum of `weights[k] * entry(k)` over all `k`.
fn combination(weights: &[f64], entry: impl Fn(usize) -> Interval) -> Interval {
    weights
        .iter()
        .enumerate()
        .fold(Interval::point(0.0), |sum, (k, &weight)| {
            sum.add(entry(k).scale(weight))
        })
}

/// Whether `row` is strictly diagonally dominant when it is used to solve for unknown `column`.
fn is_dominant(row: &[Interval], column: usize) -> bool {
    let diagonal = row[column].mig();
    let others = row
        .iter()
        .enumerate()
        .filter(|&(j, _)| j != column)
        .map(|(_, coefficient)| coefficient.mag())
        .sum::<f64>();
    diagonal > others
}

/// An assignment of a distinct row to every unknown such that each row is dominant for its
/// unknown, found by backtracking over the unknowns in order.
fn dominant_order(matrix: &[Vec<Interval>]) -> Option<Vec<usize>> {
    fn assign(
        matrix: &[Vec<Interval>],
        order: &mut Vec<usize>,
        used: &mut [bool],
    ) -> bool {
        let column = order.len();
        if column == matrix.len() {
            return true;
        }
        for row in 0..matrix.len() {
            if used[row] || !is_dominant(&matrix[row], column) {
                continue;
            }
            used[row] = true;
            order.push(row);
            if assign(matrix, order, used) {
                return true;
            }
            let _ = order.pop();
            used[row] = false;
        }
        false
    }

    let mut order = Vec::with_capacity(matrix.len());
    let mut used = vec![false; matrix.len()];
    assign(matrix, &mut order, &mut used).then_some(order)
}

/// Inverts a real matrix by Gauss-Jordan elimination with partial pivoting.
fn inverse(mut matrix: Vec<Vec<f64>>) -> Option<Vec<Vec<f64>>> {
    let n = matrix.len();
    let mut inverse = (0..n)
        .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect::<Vec<f64>>())
        .collect::<Vec<_>>();

    for column in 0..n {
        let pivot = (column..n).max_by(|&a, &b| {
            matrix[a][column]
                .abs()
                .total_cmp(&matrix[b][column].abs())
        })?;
        if matrix[pivot][column] == 0.0 || !matrix[pivot][column].is_finite() {
            return None;
        }
        matrix.swap(column, pivot);
        inverse.swap(column, pivot);

        let scale = matrix[column][column];
        matrix[column].iter_mut().for_each(|value| *value /= scale);
        inverse[column].iter_mut().for_each(|value| *value /= scale);

        let pivot_row = matrix[column].clone();
        let pivot_inverse = inverse[column].clone();
        for row in (0..n).filter(|&row| row != column) {
            let factor = matrix[row][column];
            if factor == 0.0 {
                continue;
            }
            for k in 0..n {
                matrix[row][k] -= factor * pivot_row[k];
                inverse[row][k] -= factor * pivot_inverse[k];
            }
        }
    }

    inverse
        .iter()
        .flatten()
        .all(|value| value.is_finite())
        .then_some(inverse)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(rows: &[&[f64]]) -> Vec<Vec<Interval>> {
        rows.iter()
            .map(|row| row.iter().map(|&value| Interval::point(value)).collect())
            .collect()
    }

    fn wide_box(n: usize) -> Vec<Interval> {
        vec![Interval::new(-10.0, 10.0); n]
    }

    #[test]
    fn diagonal_system_converges_in_one_iteration() {
        let solver = IntervalGaussSeidel::new(
            points(&[&[2.0, 0.0], &[0.0, 2.0]]),
            vec![Interval::point(4.0), Interval::point(6.0)],
        );

        let outcome = solver.solve(wide_box(2), 20, Preconditioning::Never);

        assert_eq!(
            GaussSeidelOutcome::Solution {
                enclosure: vec![Interval::point(2.0), Interval::point(3.0)],
                iterations: 1,
                preconditioned: false,
            },
            outcome
        );
    }

    #[test]
    fn rows_are_reordered_to_make_the_diagonal_dominant() {
        let solver = IntervalGaussSeidel::new(
            points(&[&[0.0, 1.0], &[1.0, 0.0]]),
            vec![Interval::point(5.0), Interval::point(7.0)],
        );

        let outcome = solver.solve(wide_box(2), 20, Preconditioning::Never);

        let GaussSeidelOutcome::Solution { enclosure, .. } = outcome else {
            panic!("expected a solution, got {outcome:?}");
        };
        assert_eq!(vec![Interval::point(7.0), Interval::point(5.0)], enclosure);
    }

    #[test]
    fn non_dominant_system_is_declined_without_preconditioning() {
        let solver = IntervalGaussSeidel::new(
            points(&[&[1.0, 2.0], &[3.0, 4.0]]),
            vec![Interval::point(5.0), Interval::point(6.0)],
        );

        assert_eq!(
            GaussSeidelOutcome::NotDominant,
            solver.solve(wide_box(2), 20, Preconditioning::Never)
        );
    }

    #[test]
    fn preconditioning_makes_a_point_system_solvable() {
        // x + 2y = 5, 3x + 4y = 6 has the solution x = -4, y = 4.5
        let solver = IntervalGaussSeidel::new(
            points(&[&[1.0, 2.0], &[3.0, 4.0]]),
            vec![Interval::point(5.0), Interval::point(6.0)],
        );

        let outcome = solver.solve(wide_box(2), 20, Preconditioning::WhenNotDominant);

        let GaussSeidelOutcome::Solution {
            enclosure,
            preconditioned,
            ..
        } = outcome
        else {
            panic!("expected a solution, got {outcome:?}");
        };
        assert!(preconditioned);
        assert!(enclosure[0].contains(-4.0) && enclosure[0].width() < 1e-9);
        assert!(enclosure[1].contains(4.5) && enclosure[1].width() < 1e-9);
    }

    #[test]
    fn solution_outside_of_the_box_is_reported() {
        let solver = IntervalGaussSeidel::new(
            points(&[&[1.0, 0.0], &[0.0, 1.0]]),
            vec![Interval::point(50.0), Interval::point(0.0)],
        );

        assert_eq!(
            GaussSeidelOutcome::NoSolution,
            solver.solve(wide_box(2), 20, Preconditioning::Never)
        );
    }

    #[test]
    fn interval_coefficients_give_an_enclosure() {
        let solver = IntervalGaussSeidel::new(
            vec![
                vec![Interval::new(3.0, 4.0), Interval::new(-1.0, 1.0)],
                vec![Interval::new(-1.0, 1.0), Interval::new(3.0, 4.0)],
            ],
            vec![Interval::point(3.0), Interval::point(3.0)],
        );

        let outcome = solver.solve(wide_box(2), 20, Preconditioning::Never);

        let GaussSeidelOutcome::Solution { enclosure, .. } = outcome else {
            panic!("expected a solution, got {outcome:?}");
        };
        // the solution of the midpoint system is x = y = 3 / 3.5
        let midpoint_solution = 3.0 / 3.5;
        assert!(enclosure[0].contains(midpoint_solution));
        assert!(enclosure[1].contains(midpoint_solution));
        assert!(enclosure[0].upper() < 10.0);
    }
}
