use crate::error::SolverError;
use crate::problem::{Constraint, ConstraintOp, Direction, LpProblem, MipProblem};
use crate::simplex::Solver;
use crate::solution::{MipSolution, SolutionStatus};

/// Branch-and-bound driver for mixed-integer linear programs.
///
/// Explores a depth-first stack of sub-problems, each the original
/// constraint list plus bounding constraints on one variable, solving the LP
/// relaxation of every node with the simplex [`Solver`]. The search is
/// strictly sequential so tie-breaking and the expansion cap stay
/// deterministic.
pub struct BranchAndBound {
    /// Hard cap on node expansions after the root
    max_expansions: usize,
    /// Slack allowed when testing a value for integrality
    integrality_tolerance: f64,
    /// Relaxation solver applied at every node
    lp: Solver,
}

impl Default for BranchAndBound {
    fn default() -> Self {
        Self {
            max_expansions: 100,
            integrality_tolerance: 1e-5,
            lp: Solver::new(),
        }
    }
}

/// Best integral solution seen so far.
struct Incumbent {
    values: Vec<f64>,
    objective_value: f64,
}

impl BranchAndBound {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_expansions(mut self, max: usize) -> Self {
        self.max_expansions = max;
        self
    }

    pub fn with_integrality_tolerance(mut self, tol: f64) -> Self {
        self.integrality_tolerance = tol;
        self
    }

    pub fn with_lp_solver(mut self, lp: Solver) -> Self {
        self.lp = lp;
        self
    }

    /// Solve a mixed-integer linear program.
    ///
    /// `Err` is reserved for contract violations ([`MipProblem::validate`]).
    /// A solution returned after the expansion cap was hit carries
    /// `certified: false`: it is the best found, not a proven optimum.
    pub fn solve(&self, problem: &MipProblem) -> Result<MipSolution, SolverError> {
        problem.validate()?;

        let base = &problem.lp;
        let root = self.lp.solve(base)?;
        match root.status {
            SolutionStatus::Infeasible => return Ok(MipSolution::infeasible(1, true)),
            SolutionStatus::Unbounded => return Ok(MipSolution::unbounded(1)),
            SolutionStatus::Optimal => {}
        }

        let mut stack: Vec<Vec<Constraint>> = Vec::new();
        match self.branching_variable(&root.values, &problem.integers) {
            None => {
                // The relaxation is already integral; nothing to branch on.
                return Ok(MipSolution {
                    status: SolutionStatus::Optimal,
                    values: root.values,
                    objective_value: root.objective_value,
                    nodes_explored: 1,
                    certified: true,
                });
            }
            Some((var, value)) => {
                self.branch(&mut stack, &base.constraints, base.num_variables(), var, value);
            }
        }

        let mut incumbent: Option<Incumbent> = None;
        let mut expansions = 0usize;

        loop {
            if expansions >= self.max_expansions {
                log::debug!("expansion cap of {} reached", self.max_expansions);
                break;
            }
            let Some(constraints) = stack.pop() else {
                break;
            };
            expansions += 1;

            let node = LpProblem {
                direction: base.direction,
                objective: base.objective.clone(),
                constraints,
            };
            let relaxation = self.lp.solve(&node)?;
            if relaxation.status != SolutionStatus::Optimal {
                continue;
            }

            match self.branching_variable(&relaxation.values, &problem.integers) {
                None => {
                    let improved = match &incumbent {
                        None => true,
                        Some(best) => self.beats(
                            base.direction,
                            relaxation.objective_value,
                            best.objective_value,
                        ),
                    };
                    if improved {
                        log::debug!(
                            "incumbent {} after {} expansions",
                            relaxation.objective_value,
                            expansions
                        );
                        incumbent = Some(Incumbent {
                            values: relaxation.values,
                            objective_value: relaxation.objective_value,
                        });
                    }
                }
                Some((var, value)) => {
                    // Only descend while the relaxed bound can still beat the
                    // incumbent.
                    let worth_exploring = match &incumbent {
                        None => true,
                        Some(best) => self.beats(
                            base.direction,
                            relaxation.objective_value,
                            best.objective_value,
                        ),
                    };
                    if worth_exploring {
                        log::trace!("branching on variable {var} at {value}");
                        self.branch(
                            &mut stack,
                            &node.constraints,
                            base.num_variables(),
                            var,
                            value,
                        );
                    }
                }
            }
        }

        let certified = stack.is_empty();
        let nodes_explored = expansions + 1;
        match incumbent {
            Some(best) => Ok(MipSolution {
                status: SolutionStatus::Optimal,
                values: best.values,
                objective_value: best.objective_value,
                nodes_explored,
                certified,
            }),
            None => Ok(MipSolution::infeasible(nodes_explored, certified)),
        }
    }

    fn beats(&self, direction: Direction, candidate: f64, best: f64) -> bool {
        match direction {
            Direction::Maximize => candidate > best,
            Direction::Minimize => candidate < best,
        }
    }

    /// Pick the branching variable: among integer-masked variables whose
    /// relaxation value is non-integral, the one with the largest raw value.
    /// Returns `None` when the assignment is integral everywhere it must be.
    fn branching_variable(&self, values: &[f64], integers: &[bool]) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (j, (&must_be_int, &v)) in integers.iter().zip(values.iter()).enumerate() {
            if !must_be_int || (v - v.round()).abs() < self.integrality_tolerance {
                continue;
            }
            match best {
                Some((_, bv)) if v <= bv => {}
                _ => best = Some((j, v)),
            }
        }
        best
    }

    /// Push the two children of a node: the ceiling branch first, then the
    /// floor branch, so depth-first exploration takes the floor side first.
    fn branch(
        &self,
        stack: &mut Vec<Vec<Constraint>>,
        constraints: &[Constraint],
        num_vars: usize,
        var: usize,
        value: f64,
    ) {
        let mut up = constraints.to_vec();
        up.push(Constraint::single(
            num_vars,
            var,
            ConstraintOp::Ge,
            value.ceil(),
        ));
        stack.push(up);

        let mut down = constraints.to_vec();
        down.push(Constraint::single(
            num_vars,
            var,
            ConstraintOp::Le,
            value.floor(),
        ));
        stack.push(down);
    }
}
