use crate::problem::{ConstraintOp, Direction, LpProblem};

/// What a tableau column stands for.
///
/// Artificial columns are recognized by kind, not by a sentinel cost value,
/// so an objective coefficient of exactly -1 stays unambiguous.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum VarKind {
    Decision,
    Slack,
    Surplus,
    Artificial,
}

/// One column of the working matrix: its kind and its pricing cost.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Column {
    pub kind: VarKind,
    pub cost: f64,
}

/// Cost of an artificial column while it is still in the tableau.
const PHASE_ONE_COST: f64 = -1.0;

/// The working matrix of the simplex method, plus its bookkeeping.
///
/// Column layout: decision block, then slack/surplus block, then artificial
/// block. The right-hand side is kept alongside the rows and is always
/// non-negative after construction. The tableau lives for one solve call and
/// is mutated in place by every pivot.
#[derive(Debug, Clone)]
pub(crate) struct Tableau {
    /// Constraint rows, one inner vector per constraint
    pub rows: Vec<Vec<f64>>,
    /// Right-hand side per row
    pub rhs: Vec<f64>,
    /// Kind and cost per column
    pub columns: Vec<Column>,
    /// For each row, the column index of the basic variable
    pub basis: Vec<usize>,
}

impl Tableau {
    /// Build the initial tableau for a problem that passed validation.
    ///
    /// Minimization is folded in here by negating the effective cost of the
    /// decision columns; the caller's objective vector is left untouched.
    pub(crate) fn build(problem: &LpProblem) -> Self {
        let n = problem.num_variables();
        let m = problem.num_constraints();

        let mut aux_kinds = Vec::new();
        let mut n_artificial = 0;
        for c in &problem.constraints {
            match c.op {
                ConstraintOp::Le => aux_kinds.push(VarKind::Slack),
                ConstraintOp::Ge => {
                    aux_kinds.push(VarKind::Surplus);
                    n_artificial += 1;
                }
                ConstraintOp::Eq => n_artificial += 1,
            }
        }

        let sign = match problem.direction {
            Direction::Maximize => 1.0,
            Direction::Minimize => -1.0,
        };

        let total = n + aux_kinds.len() + n_artificial;
        let mut columns = Vec::with_capacity(total);
        for &c in &problem.objective {
            columns.push(Column {
                kind: VarKind::Decision,
                cost: sign * c,
            });
        }
        for kind in aux_kinds {
            columns.push(Column { kind, cost: 0.0 });
        }
        for _ in 0..n_artificial {
            columns.push(Column {
                kind: VarKind::Artificial,
                cost: PHASE_ONE_COST,
            });
        }

        let mut rows = vec![vec![0.0; total]; m];
        let mut rhs = vec![0.0; m];
        let mut basis = vec![0usize; m];

        let mut aux_idx = n;
        let mut art_idx = total - n_artificial;

        for (i, c) in problem.constraints.iter().enumerate() {
            // A negative right-hand side negates the whole row before the
            // operator's columns are laid down, keeping every constructed RHS
            // non-negative. A negated row keeps its operator's column recipe,
            // so its practical sense swaps (a negated Le behaves like Ge).
            let negate = c.rhs < 0.0;
            for (j, &a) in c.coefficients.iter().enumerate() {
                rows[i][j] = if negate { -a } else { a };
            }
            rhs[i] = if negate { -c.rhs } else { c.rhs };

            match c.op {
                ConstraintOp::Le => {
                    rows[i][aux_idx] = 1.0;
                    basis[i] = aux_idx;
                    aux_idx += 1;
                }
                ConstraintOp::Ge => {
                    rows[i][aux_idx] = -1.0;
                    aux_idx += 1;
                    rows[i][art_idx] = 1.0;
                    basis[i] = art_idx;
                    art_idx += 1;
                }
                ConstraintOp::Eq => {
                    rows[i][art_idx] = 1.0;
                    basis[i] = art_idx;
                    art_idx += 1;
                }
            }
        }

        Self {
            rows,
            rhs,
            columns,
            basis,
        }
    }

    pub(crate) fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub(crate) fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub(crate) fn column(&self, j: usize) -> Column {
        self.columns[j]
    }

    pub(crate) fn is_basic(&self, j: usize) -> bool {
        self.basis.contains(&j)
    }

    pub(crate) fn has_artificials(&self) -> bool {
        self.columns
            .iter()
            .any(|c| c.kind == VarKind::Artificial)
    }

    /// Pricing cost of a column for the active phase. While artificial
    /// columns remain, only they carry a (Phase-1) cost; the stored objective
    /// costs take over once the artificial block is gone.
    pub(crate) fn phase_cost(&self, j: usize, phase_one: bool) -> f64 {
        let column = self.columns[j];
        if phase_one && column.kind != VarKind::Artificial {
            0.0
        } else {
            column.cost
        }
    }

    /// Phase-1 objective: `sum(rhs[i] * cost[basis[i]])` under the Phase-1
    /// cost row. Zero exactly when no basic artificial carries a positive
    /// right-hand side.
    pub(crate) fn phase_one_objective(&self) -> f64 {
        self.basis
            .iter()
            .zip(self.rhs.iter())
            .map(|(&b, &r)| r * self.phase_cost(b, true))
            .sum()
    }

    /// Whether some row still has an artificial basic variable at a
    /// right-hand side above `tolerance`.
    pub(crate) fn has_positive_basic_artificial(&self, tolerance: f64) -> bool {
        self.basis.iter().zip(self.rhs.iter()).any(|(&b, &r)| {
            self.columns[b].kind == VarKind::Artificial && r > tolerance
        })
    }

    /// Perform one pivot: scale the pivot row so the pivot element becomes 1,
    /// eliminate the entering column from every other row, and record the new
    /// basic variable.
    pub(crate) fn pivot(&mut self, row: usize, col: usize) {
        let pivot_val = self.rows[row][col];
        for v in self.rows[row].iter_mut() {
            *v /= pivot_val;
        }
        self.rhs[row] /= pivot_val;

        for i in 0..self.rows.len() {
            if i == row {
                continue;
            }
            let factor = self.rows[i][col];
            if factor == 0.0 {
                continue;
            }
            for j in 0..self.columns.len() {
                self.rows[i][j] -= factor * self.rows[row][j];
            }
            self.rhs[i] -= factor * self.rhs[row];
        }

        self.basis[row] = col;
    }

    /// Drop a (redundant) row entirely.
    pub(crate) fn remove_row(&mut self, row: usize) {
        self.rows.remove(row);
        self.rhs.remove(row);
        self.basis.remove(row);
    }

    /// Produce the Phase-2 tableau: the same rows, right-hand sides, and
    /// basis, with every artificial column removed. No basic variable may be
    /// artificial when this is called.
    pub(crate) fn without_artificials(self) -> Self {
        let keep: Vec<usize> = (0..self.columns.len())
            .filter(|&j| self.columns[j].kind != VarKind::Artificial)
            .collect();

        let mut new_index = vec![usize::MAX; self.columns.len()];
        for (new, &old) in keep.iter().enumerate() {
            new_index[old] = new;
        }

        let rows = self
            .rows
            .iter()
            .map(|row| keep.iter().map(|&j| row[j]).collect())
            .collect();
        let columns = keep.iter().map(|&j| self.columns[j]).collect();
        let basis = self.basis.iter().map(|&b| new_index[b]).collect();

        Self {
            rows,
            rhs: self.rhs,
            columns,
            basis,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{Direction, LpProblem};

    fn sample_problem() -> LpProblem {
        let mut problem = LpProblem::new(Direction::Maximize, vec![3.0, 2.0]);
        problem.add_constraint(vec![1.0, 1.0], ConstraintOp::Le, 4.0);
        problem.add_constraint(vec![1.0, 3.0], ConstraintOp::Ge, 6.0);
        problem.add_constraint(vec![1.0, 0.0], ConstraintOp::Eq, 2.0);
        problem
    }

    #[test]
    fn test_build_column_layout() {
        let tableau = Tableau::build(&sample_problem());

        // 2 decision + slack + surplus + 2 artificial
        assert_eq!(tableau.n_cols(), 6);
        assert_eq!(tableau.n_rows(), 3);
        assert_eq!(tableau.column(0).kind, VarKind::Decision);
        assert_eq!(tableau.column(2).kind, VarKind::Slack);
        assert_eq!(tableau.column(3).kind, VarKind::Surplus);
        assert_eq!(tableau.column(4).kind, VarKind::Artificial);
        assert_eq!(tableau.column(5).kind, VarKind::Artificial);

        // Le row is basic in its slack, Ge and Eq rows in their artificials
        assert_eq!(tableau.basis, vec![2, 4, 5]);
        assert!(tableau.has_artificials());

        // Surplus carries -1, artificials +1
        assert_eq!(tableau.rows[1][3], -1.0);
        assert_eq!(tableau.rows[1][4], 1.0);
        assert_eq!(tableau.rows[2][5], 1.0);
    }

    #[test]
    fn test_build_minimize_negates_costs() {
        let mut problem = LpProblem::new(Direction::Minimize, vec![2.0, -3.0]);
        problem.add_constraint(vec![1.0, 1.0], ConstraintOp::Le, 4.0);
        let tableau = Tableau::build(&problem);

        assert_eq!(tableau.column(0).cost, -2.0);
        assert_eq!(tableau.column(1).cost, 3.0);
        // Caller's vector is untouched
        assert_eq!(problem.objective, vec![2.0, -3.0]);
    }

    #[test]
    fn test_build_negative_rhs_normalized() {
        let mut problem = LpProblem::new(Direction::Maximize, vec![1.0, 1.0]);
        problem.add_constraint(vec![1.0, -2.0], ConstraintOp::Le, -3.0);
        let tableau = Tableau::build(&problem);

        assert_eq!(tableau.rhs[0], 3.0);
        assert_eq!(tableau.rows[0][0], -1.0);
        assert_eq!(tableau.rows[0][1], 2.0);
        // The operator's recipe is unchanged: slack at +1, still basic
        assert_eq!(tableau.rows[0][2], 1.0);
        assert_eq!(tableau.basis, vec![2]);
    }

    #[test]
    fn test_basis_is_unique() {
        let tableau = Tableau::build(&sample_problem());
        let mut seen = tableau.basis.clone();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), tableau.basis.len());
    }

    #[test]
    fn test_without_artificials_remaps_basis() {
        let mut tableau = Tableau::build(&sample_problem());
        // Fake a basis on real columns only
        tableau.basis = vec![0, 1, 2];
        let reduced = tableau.without_artificials();

        assert_eq!(reduced.n_cols(), 4);
        assert!(!reduced.has_artificials());
        assert_eq!(reduced.basis, vec![0, 1, 2]);
        assert_eq!(reduced.n_rows(), 3);
    }

    #[test]
    fn test_pivot_makes_unit_column() {
        let mut problem = LpProblem::new(Direction::Maximize, vec![3.0, 2.0]);
        problem.add_constraint(vec![1.0, 1.0], ConstraintOp::Le, 4.0);
        problem.add_constraint(vec![1.0, 3.0], ConstraintOp::Le, 6.0);
        let mut tableau = Tableau::build(&problem);

        tableau.pivot(0, 0);

        assert_eq!(tableau.basis[0], 0);
        assert_eq!(tableau.rows[0][0], 1.0);
        assert_eq!(tableau.rows[1][0], 0.0);
        assert_eq!(tableau.rhs, vec![4.0, 2.0]);
    }
}
