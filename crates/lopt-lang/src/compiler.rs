use std::collections::{HashMap, HashSet};

use lopt_solver::{ConstraintOp, Direction, LpProblem, MipProblem};
use thiserror::Error;

use crate::ast::*;

#[derive(Error, Debug, Clone)]
pub enum CompileError {
    #[error("Model has no objective")]
    MissingObjective,
    #[error("Model has more than one objective")]
    DuplicateObjective,
    #[error("Model has no constraints")]
    NoConstraints,
    #[error("Unknown variable in int block: {0}")]
    UnknownVariable(String),
    #[error("Duplicate constraint name: {0}")]
    DuplicateConstraintName(String),
    #[error("Constant term in objective")]
    ConstantInObjective,
}

/// A model lowered to solver form, with the name tables needed to print
/// results back in source terms.
#[derive(Debug, Clone)]
pub struct CompiledModel {
    /// Variable names in column order
    pub variables: Vec<String>,
    /// Constraint labels in row order (None for unnamed constraints)
    pub constraint_names: Vec<Option<String>>,
    pub problem: MipProblem,
}

impl CompiledModel {
    pub fn lp(&self) -> &LpProblem {
        &self.problem.lp
    }

    /// Whether any variable is marked integral
    pub fn is_mixed_integer(&self) -> bool {
        self.problem.integers.iter().any(|&b| b)
    }
}

/// Compiler from the parsed AST to an [`MipProblem`].
///
/// Variables take their column order from first appearance, objective first,
/// then constraints top to bottom. Constant terms on a constraint's left side
/// are folded into its right-hand side.
pub struct Compiler {
    variables: Vec<String>,
    index: HashMap<String, usize>,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler {
    pub fn new() -> Self {
        Self {
            variables: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn compile(mut self, model: &Model) -> Result<CompiledModel, CompileError> {
        let mut objective: Option<&Objective> = None;
        let mut constraints: Vec<&ConstraintDecl> = Vec::new();
        let mut integer_names: Vec<&String> = Vec::new();

        for item in &model.items {
            match item {
                Item::Objective(obj) => {
                    if objective.is_some() {
                        return Err(CompileError::DuplicateObjective);
                    }
                    objective = Some(obj);
                }
                Item::Constraints(block) => constraints.extend(block.constraints.iter()),
                Item::Integers(block) => integer_names.extend(block.names.iter()),
            }
        }

        let objective = objective.ok_or(CompileError::MissingObjective)?;
        if constraints.is_empty() {
            return Err(CompileError::NoConstraints);
        }

        // Column order: first appearance, objective before constraints.
        for term in &objective.expr.terms {
            if let Some(name) = &term.variable {
                self.intern(name);
            }
        }
        for c in &constraints {
            for term in &c.expr.terms {
                if let Some(name) = &term.variable {
                    self.intern(name);
                }
            }
        }

        let direction = match objective.direction {
            ObjectiveDirection::Minimize => Direction::Minimize,
            ObjectiveDirection::Maximize => Direction::Maximize,
        };

        let n = self.variables.len();
        let mut function = vec![0.0; n];
        for term in &objective.expr.terms {
            match &term.variable {
                Some(name) => function[self.index[name]] += term.coefficient,
                None => return Err(CompileError::ConstantInObjective),
            }
        }

        let mut lp = LpProblem::new(direction, function);
        let mut constraint_names = Vec::with_capacity(constraints.len());
        let mut seen_names = HashSet::new();

        for c in &constraints {
            if let Some(name) = &c.name {
                if !seen_names.insert(name.clone()) {
                    return Err(CompileError::DuplicateConstraintName(name.clone()));
                }
            }

            let mut coefficients = vec![0.0; n];
            let mut rhs = c.rhs;
            for term in &c.expr.terms {
                match &term.variable {
                    Some(name) => coefficients[self.index[name]] += term.coefficient,
                    None => rhs -= term.coefficient,
                }
            }

            let op = match c.cmp {
                Cmp::Le => ConstraintOp::Le,
                Cmp::Ge => ConstraintOp::Ge,
                Cmp::Eq => ConstraintOp::Eq,
            };
            lp.add_constraint(coefficients, op, rhs);
            constraint_names.push(c.name.clone());
        }

        let mut integers = vec![false; n];
        for name in integer_names {
            let &idx = self
                .index
                .get(name)
                .ok_or_else(|| CompileError::UnknownVariable(name.clone()))?;
            integers[idx] = true;
        }

        Ok(CompiledModel {
            variables: self.variables,
            constraint_names,
            problem: MipProblem::new(lp, integers),
        })
    }

    fn intern(&mut self, name: &str) {
        if !self.index.contains_key(name) {
            self.index.insert(name.to_string(), self.variables.len());
            self.variables.push(name.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Parser;
    use lopt_solver::{BranchAndBound, SolutionStatus, Solver};

    const SAMPLE: &str = "\
maximize: 3 x + 2 y

subject to {
  capacity: x + y <= 4
  blend: x + 3 y <= 6
}
";

    fn compile(source: &str) -> Result<CompiledModel, CompileError> {
        let model = Parser::parse(source).expect("parse failed");
        Compiler::new().compile(&model)
    }

    #[test]
    fn test_compile_sample() {
        let compiled = compile(SAMPLE).expect("compile failed");

        assert_eq!(compiled.variables, vec!["x", "y"]);
        assert_eq!(compiled.lp().objective, vec![3.0, 2.0]);
        assert_eq!(compiled.lp().direction, Direction::Maximize);
        assert_eq!(compiled.lp().num_constraints(), 2);
        assert_eq!(
            compiled.constraint_names,
            vec![Some("capacity".to_string()), Some("blend".to_string())]
        );
        assert!(!compiled.is_mixed_integer());
    }

    #[test]
    fn test_compile_and_solve() {
        let compiled = compile(SAMPLE).expect("compile failed");
        let solution = Solver::new().solve(compiled.lp()).expect("valid problem");

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!((solution.values[0] - 4.0).abs() < 1e-6);
        assert!(solution.values[1].abs() < 1e-6);
        assert!((solution.objective_value - 12.0).abs() < 1e-6);
    }

    #[test]
    fn test_compile_and_solve_integer() {
        let source = "\
maximize: x

subject to {
  2 x <= 5
}

int { x }
";
        let compiled = compile(source).expect("compile failed");
        assert!(compiled.is_mixed_integer());

        let solution = BranchAndBound::new()
            .solve(&compiled.problem)
            .expect("valid problem");
        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!((solution.values[0] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_constant_terms_fold_into_rhs() {
        let source = "minimize: x\nsubject to {\n  x + 1 <= 4\n}";
        let compiled = compile(source).expect("compile failed");

        let c = &compiled.lp().constraints[0];
        assert_eq!(c.coefficients, vec![1.0]);
        assert_eq!(c.rhs, 3.0);
    }

    #[test]
    fn test_repeated_variable_accumulates() {
        let source = "minimize: x\nsubject to {\n  x + x <= 4\n}";
        let compiled = compile(source).expect("compile failed");
        assert_eq!(compiled.lp().constraints[0].coefficients, vec![2.0]);
    }

    #[test]
    fn test_variable_order_is_first_appearance() {
        let source = "minimize: b + a\nsubject to {\n  c + a <= 1\n}";
        let compiled = compile(source).expect("compile failed");
        assert_eq!(compiled.variables, vec!["b", "a", "c"]);
        assert_eq!(compiled.lp().objective, vec![1.0, 1.0, 0.0]);
        assert_eq!(compiled.lp().constraints[0].coefficients, vec![0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_missing_objective() {
        let source = "subject to {\n  x <= 1\n}";
        assert!(matches!(
            compile(source),
            Err(CompileError::MissingObjective)
        ));
    }

    #[test]
    fn test_duplicate_objective() {
        let source = "minimize: x\nmaximize: x\nsubject to {\n  x <= 1\n}";
        assert!(matches!(
            compile(source),
            Err(CompileError::DuplicateObjective)
        ));
    }

    #[test]
    fn test_no_constraints() {
        assert!(matches!(
            compile("minimize: x"),
            Err(CompileError::NoConstraints)
        ));
    }

    #[test]
    fn test_unknown_integer_variable() {
        let source = "minimize: x\nsubject to {\n  x <= 1\n}\nint { z }";
        assert!(matches!(
            compile(source),
            Err(CompileError::UnknownVariable(name)) if name == "z"
        ));
    }

    #[test]
    fn test_duplicate_constraint_name() {
        let source = "minimize: x\nsubject to {\n  cap: x <= 1\n  cap: x <= 2\n}";
        assert!(matches!(
            compile(source),
            Err(CompileError::DuplicateConstraintName(name)) if name == "cap"
        ));
    }

    #[test]
    fn test_constant_in_objective() {
        let source = "minimize: x + 5\nsubject to {\n  x <= 1\n}";
        assert!(matches!(
            compile(source),
            Err(CompileError::ConstantInObjective)
        ));
    }
}
