use crate::error::SolverError;
use crate::problem::LpProblem;
use crate::solution::{LpSolution, SolutionStatus};
use crate::tableau::{Tableau, VarKind};

/// Two-phase tableau simplex solver for linear programs.
///
/// Phase 1 prices artificial columns at -1 to drive them out of the basis;
/// once their total contribution reaches zero the artificial block is dropped
/// and the same pivoting loop continues on the true objective.
pub struct Solver {
    /// Maximum number of pivots before giving up
    max_iterations: usize,
    /// Tolerance for floating point comparisons
    tolerance: f64,
}

impl Default for Solver {
    fn default() -> Self {
        Self {
            max_iterations: 10000,
            tolerance: 1e-9,
        }
    }
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    /// Solve a linear program.
    ///
    /// Returns `Err` only for contract violations ([`LpProblem::validate`]);
    /// infeasibility and unboundedness come back as solution statuses.
    pub fn solve(&self, problem: &LpProblem) -> Result<LpSolution, SolverError> {
        problem.validate()?;

        let mut tableau = Tableau::build(problem);
        let mut iterations = 0usize;

        while iterations < self.max_iterations {
            let phase_one = tableau.has_artificials();
            let Some(entering) = self.entering_column(&tableau, phase_one) else {
                // Priced optimal for whichever phase is active.
                if phase_one {
                    let residual = tableau.phase_one_objective();
                    if residual.abs() > self.tolerance
                        && tableau.has_positive_basic_artificial(self.tolerance)
                    {
                        log::debug!(
                            "infeasible: artificial variables stuck at residual {residual:e}"
                        );
                        return Ok(LpSolution::infeasible(iterations));
                    }
                    log::debug!("phase 1 complete after {iterations} pivots");
                    tableau = self.enter_phase_two(tableau, &mut iterations);
                    continue;
                }
                let multiple_optima = self.has_alternate_optimum(&tableau);
                return Ok(self.extract(&tableau, problem, iterations, multiple_optima));
            };

            let Some(leaving) = self.leaving_row(&tableau, entering) else {
                // No positive entry in the entering column: the objective
                // improves without limit along it.
                return Ok(LpSolution::unbounded(iterations));
            };

            log::trace!("pivot {iterations}: column {entering} enters, row {leaving} leaves");
            tableau.pivot(leaving, entering);
            iterations += 1;
        }

        // Pivot budget exhausted; report the basis we ended on.
        log::debug!("pivot budget of {} exhausted", self.max_iterations);
        Ok(self.extract(&tableau, problem, iterations, false))
    }

    /// Pricing step: reduced cost of every non-basic column,
    /// `z_j = sum_i rows[i][j] * cost[basis[i]] - cost[j]`, under the active
    /// phase's cost row.
    ///
    /// Returns the column with the most negative reduced cost, ties broken by
    /// lowest index, or `None` when the current basis is cost-optimal.
    fn entering_column(&self, tableau: &Tableau, phase_one: bool) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for j in 0..tableau.n_cols() {
            if tableau.is_basic(j) {
                continue;
            }
            let z = self.reduced_cost(tableau, j, phase_one);
            if z < -self.tolerance {
                match best {
                    Some((_, bz)) if z >= bz => {}
                    _ => best = Some((j, z)),
                }
            }
        }
        best.map(|(j, _)| j)
    }

    fn reduced_cost(&self, tableau: &Tableau, j: usize, phase_one: bool) -> f64 {
        let mut z = 0.0;
        for (i, &b) in tableau.basis.iter().enumerate() {
            z += tableau.rows[i][j] * tableau.phase_cost(b, phase_one);
        }
        z - tableau.phase_cost(j, phase_one)
    }

    /// Ratio test: among rows with a strictly positive entry in the entering
    /// column, the one minimizing `rhs / entry`. Ties prefer a row whose
    /// basic variable is artificial, then the lowest row index.
    fn leaving_row(&self, tableau: &Tableau, entering: usize) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for i in 0..tableau.n_rows() {
            let entry = tableau.rows[i][entering];
            if entry <= self.tolerance {
                continue;
            }
            let ratio = tableau.rhs[i] / entry;
            match best {
                None => best = Some((i, ratio)),
                Some((row, r)) => {
                    if ratio < r - self.tolerance {
                        best = Some((i, ratio));
                    } else if (ratio - r).abs() <= self.tolerance
                        && tableau.column(tableau.basis[i]).kind == VarKind::Artificial
                        && tableau.column(tableau.basis[row]).kind != VarKind::Artificial
                    {
                        best = Some((i, ratio));
                    }
                }
            }
        }
        best.map(|(i, _)| i)
    }

    /// Transition to Phase 2: clear any degenerate artificial out of the
    /// basis, then drop the artificial block, producing a smaller tableau
    /// with the same basis and right-hand sides.
    ///
    /// A basic artificial at this point sits at a zero right-hand side. It is
    /// pivoted onto any usable real column; when its row has no nonzero real
    /// entry the constraint is redundant and the row is removed.
    fn enter_phase_two(&self, mut tableau: Tableau, iterations: &mut usize) -> Tableau {
        let mut i = 0;
        while i < tableau.n_rows() {
            if tableau.column(tableau.basis[i]).kind != VarKind::Artificial {
                i += 1;
                continue;
            }
            let pivot_col = (0..tableau.n_cols()).find(|&j| {
                tableau.column(j).kind != VarKind::Artificial
                    && !tableau.is_basic(j)
                    && tableau.rows[i][j].abs() > self.tolerance
            });
            match pivot_col {
                Some(j) => {
                    tableau.pivot(i, j);
                    *iterations += 1;
                    i += 1;
                }
                None => {
                    log::debug!("dropping redundant row {i} at phase transition");
                    tableau.remove_row(i);
                }
            }
        }
        tableau.without_artificials()
    }

    /// At the optimum, a non-basic column with zero reduced cost means the
    /// optimal face is not a single vertex.
    fn has_alternate_optimum(&self, tableau: &Tableau) -> bool {
        (0..tableau.n_cols()).any(|j| {
            !tableau.is_basic(j) && self.reduced_cost(tableau, j, false).abs() <= self.tolerance
        })
    }

    /// Read the optimum off the tableau: basic decision variables take their
    /// row's right-hand side, everything else is zero. The objective value is
    /// recomputed from the caller's own coefficients, so the minimize /
    /// maximize sign handling never leaks into the result.
    fn extract(
        &self,
        tableau: &Tableau,
        problem: &LpProblem,
        iterations: usize,
        multiple_optima: bool,
    ) -> LpSolution {
        let n = problem.num_variables();
        let mut values = vec![0.0; n];
        for (i, &b) in tableau.basis.iter().enumerate() {
            if b < n {
                values[b] = tableau.rhs[i];
            }
        }

        let objective_value = problem
            .objective
            .iter()
            .zip(values.iter())
            .map(|(&c, &v)| c * v)
            .sum();

        LpSolution {
            status: SolutionStatus::Optimal,
            values,
            objective_value,
            iterations,
            multiple_optima,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{ConstraintOp, Direction, LpProblem};

    #[test]
    fn test_simple_maximization() {
        // Maximize: 3x + 2y
        // Subject to:
        //   x + y <= 4
        //   x + 3y <= 6
        //   x, y >= 0
        // Optimal: x=4, y=0, obj=12
        let mut problem = LpProblem::new(Direction::Maximize, vec![3.0, 2.0]);
        problem.add_constraint(vec![1.0, 1.0], ConstraintOp::Le, 4.0);
        problem.add_constraint(vec![1.0, 3.0], ConstraintOp::Le, 6.0);

        let solution = Solver::new().solve(&problem).expect("valid problem");

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!(
            (solution.values[0] - 4.0).abs() < 1e-6,
            "x = {} (expected 4)",
            solution.values[0]
        );
        assert!(
            solution.values[1].abs() < 1e-6,
            "y = {} (expected 0)",
            solution.values[1]
        );
        assert!(
            (solution.objective_value - 12.0).abs() < 1e-6,
            "obj = {} (expected 12)",
            solution.objective_value
        );
        assert!(solution.iterations > 0);
    }

    #[test]
    fn test_minimization_with_ge() {
        // Minimize: 2x + 3y
        // Subject to:
        //   x + y >= 4
        //   x <= 3
        //   y <= 3
        // Optimal: x=3, y=1, obj=9
        let mut problem = LpProblem::new(Direction::Minimize, vec![2.0, 3.0]);
        problem.add_constraint(vec![1.0, 1.0], ConstraintOp::Ge, 4.0);
        problem.add_constraint(vec![1.0, 0.0], ConstraintOp::Le, 3.0);
        problem.add_constraint(vec![0.0, 1.0], ConstraintOp::Le, 3.0);

        let solution = Solver::new().solve(&problem).expect("valid problem");

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!(
            (solution.values[0] - 3.0).abs() < 1e-6,
            "x = {} (expected 3)",
            solution.values[0]
        );
        assert!(
            (solution.values[1] - 1.0).abs() < 1e-6,
            "y = {} (expected 1)",
            solution.values[1]
        );
        assert!(
            (solution.objective_value - 9.0).abs() < 1e-6,
            "obj = {} (expected 9)",
            solution.objective_value
        );
    }

    #[test]
    fn test_equality_constraint() {
        // Minimize x + y subject to x + y = 2
        let mut problem = LpProblem::new(Direction::Minimize, vec![1.0, 1.0]);
        problem.add_constraint(vec![1.0, 1.0], ConstraintOp::Eq, 2.0);

        let solution = Solver::new().solve(&problem).expect("valid problem");

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!((solution.objective_value - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_infeasible() {
        // x >= 5 and x <= 2 cannot both hold
        let mut problem = LpProblem::new(Direction::Maximize, vec![1.0]);
        problem.add_constraint(vec![1.0], ConstraintOp::Ge, 5.0);
        problem.add_constraint(vec![1.0], ConstraintOp::Le, 2.0);

        let solution = Solver::new().solve(&problem).expect("valid problem");
        assert_eq!(solution.status, SolutionStatus::Infeasible);
    }

    #[test]
    fn test_unbounded() {
        // Maximize x subject only to x >= 0
        let mut problem = LpProblem::new(Direction::Maximize, vec![1.0]);
        problem.add_constraint(vec![1.0], ConstraintOp::Ge, 0.0);

        let solution = Solver::new().solve(&problem).expect("valid problem");
        assert_eq!(solution.status, SolutionStatus::Unbounded);
    }

    #[test]
    fn test_multiple_optima_flagged() {
        // Maximize x + y subject to x + y <= 1: every point on the segment
        // between (1,0) and (0,1) is optimal.
        let mut problem = LpProblem::new(Direction::Maximize, vec![1.0, 1.0]);
        problem.add_constraint(vec![1.0, 1.0], ConstraintOp::Le, 1.0);

        let solution = Solver::new().solve(&problem).expect("valid problem");

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!((solution.objective_value - 1.0).abs() < 1e-6);
        assert!(solution.multiple_optima);
    }

    #[test]
    fn test_unique_optimum_not_flagged() {
        let mut problem = LpProblem::new(Direction::Maximize, vec![3.0, 2.0]);
        problem.add_constraint(vec![1.0, 1.0], ConstraintOp::Le, 4.0);
        problem.add_constraint(vec![1.0, 3.0], ConstraintOp::Le, 6.0);

        let solution = Solver::new().solve(&problem).expect("valid problem");
        assert!(!solution.multiple_optima);
    }

    #[test]
    fn test_solution_satisfies_constraints() {
        let mut problem = LpProblem::new(Direction::Minimize, vec![4.0, 1.0, 3.0]);
        problem.add_constraint(vec![2.0, 1.0, 1.0], ConstraintOp::Ge, 10.0);
        problem.add_constraint(vec![1.0, 3.0, 2.0], ConstraintOp::Ge, 12.0);
        problem.add_constraint(vec![1.0, 1.0, 1.0], ConstraintOp::Le, 20.0);

        let solution = Solver::new().solve(&problem).expect("valid problem");

        assert_eq!(solution.status, SolutionStatus::Optimal);
        for c in &problem.constraints {
            assert!(
                c.is_satisfied_by(&solution.values, 1e-6),
                "violated: {:?} at {:?}",
                c,
                solution.values
            );
        }
    }

    #[test]
    fn test_deterministic_resolve() {
        let mut problem = LpProblem::new(Direction::Maximize, vec![1.0, 1.0, 1.0]);
        problem.add_constraint(vec![1.0, 1.0, 0.0], ConstraintOp::Le, 3.0);
        problem.add_constraint(vec![0.0, 1.0, 1.0], ConstraintOp::Le, 3.0);
        problem.add_constraint(vec![1.0, 0.0, 1.0], ConstraintOp::Le, 3.0);

        let solver = Solver::new();
        let first = solver.solve(&problem).expect("valid problem");
        let second = solver.solve(&problem).expect("valid problem");

        assert_eq!(first.values, second.values);
        assert_eq!(first.objective_value, second.objective_value);
        assert_eq!(first.iterations, second.iterations);
    }

    #[test]
    fn test_contract_violation_is_error() {
        let mut problem = LpProblem::new(Direction::Maximize, vec![1.0, 2.0]);
        problem.add_constraint(vec![1.0], ConstraintOp::Le, 1.0);

        assert!(Solver::new().solve(&problem).is_err());
    }
}
