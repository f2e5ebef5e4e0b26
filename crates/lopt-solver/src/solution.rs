/// Terminal state of a solve
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionStatus {
    /// A best solution was found
    Optimal,
    /// No point satisfies all constraints
    Infeasible,
    /// The objective can be improved without limit
    Unbounded,
}

/// The result of solving a linear program
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct LpSolution {
    pub status: SolutionStatus,
    /// Optimal value for each decision variable (empty unless optimal)
    pub values: Vec<f64>,
    /// Objective value at the optimum
    pub objective_value: f64,
    /// Number of pivots performed
    pub iterations: usize,
    /// True when a non-basic column with zero reduced cost remains at the
    /// optimum: the optimal face is not a single vertex and other optimal
    /// solutions exist.
    pub multiple_optima: bool,
}

impl LpSolution {
    pub fn infeasible(iterations: usize) -> Self {
        Self {
            status: SolutionStatus::Infeasible,
            values: Vec::new(),
            objective_value: f64::INFINITY,
            iterations,
            multiple_optima: false,
        }
    }

    pub fn unbounded(iterations: usize) -> Self {
        Self {
            status: SolutionStatus::Unbounded,
            values: Vec::new(),
            objective_value: f64::NEG_INFINITY,
            iterations,
            multiple_optima: false,
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }
}

/// The result of solving a mixed-integer linear program
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct MipSolution {
    pub status: SolutionStatus,
    /// Best integral assignment found (empty unless optimal)
    pub values: Vec<f64>,
    /// Objective value of the best integral assignment
    pub objective_value: f64,
    /// Number of LP relaxations solved, root included
    pub nodes_explored: usize,
    /// True when the search tree was exhausted before the expansion cap: the
    /// returned solution is a proven optimum. False means best-effort only.
    pub certified: bool,
}

impl MipSolution {
    pub fn infeasible(nodes_explored: usize, certified: bool) -> Self {
        Self {
            status: SolutionStatus::Infeasible,
            values: Vec::new(),
            objective_value: f64::INFINITY,
            nodes_explored,
            certified,
        }
    }

    pub fn unbounded(nodes_explored: usize) -> Self {
        Self {
            status: SolutionStatus::Unbounded,
            values: Vec::new(),
            objective_value: f64::NEG_INFINITY,
            nodes_explored,
            certified: true,
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }
}
