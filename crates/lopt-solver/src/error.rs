use thiserror::Error;

/// Caller-contract violations detected before solving starts.
///
/// Infeasibility and unboundedness are not errors; they are reported through
/// [`crate::SolutionStatus`]. An error here means the problem description
/// itself is malformed and no tableau can be built from it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SolverError {
    #[error("objective vector is empty")]
    EmptyObjective,
    #[error("problem has no constraints")]
    NoConstraints,
    #[error("constraint {index} has {found} coefficients, expected {expected}")]
    DimensionMismatch {
        index: usize,
        found: usize,
        expected: usize,
    },
    #[error("integer mask has {found} entries, expected {expected}")]
    MaskLengthMismatch { found: usize, expected: usize },
}
