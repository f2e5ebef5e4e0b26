//! WASM bindings for lopt
//!
//! JavaScript-friendly entry points for editors and web-based tooling: parse
//! a model, tokenize it for highlighting, or solve it end to end.

use wasm_bindgen::prelude::*;

use crate::compiler::Compiler;
use crate::lexer::{Lexer, TokenKind};
use crate::parser::Parser;
use lopt_solver::{BranchAndBound, SolutionStatus, Solver};

/// Parse source code and return the AST as JSON
#[wasm_bindgen]
pub fn parse(source: &str) -> Result<JsValue, JsValue> {
    let model = Parser::parse(source).map_err(|e| JsValue::from_str(&e.to_string()))?;
    serde_wasm_bindgen::to_value(&model).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Tokenize source code and return tokens as JSON
#[wasm_bindgen]
pub fn tokenize(source: &str) -> Result<JsValue, JsValue> {
    let tokens: Vec<TokenInfo> = Lexer::tokenize(source)
        .into_iter()
        .map(|t| TokenInfo {
            kind: format!("{:?}", t.kind),
            text: t.text,
            start: t.span.start,
            end: t.span.end,
        })
        .collect();
    serde_wasm_bindgen::to_value(&tokens).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Token information for JavaScript
#[derive(serde::Serialize)]
struct TokenInfo {
    kind: String,
    text: String,
    start: usize,
    end: usize,
}

/// Get semantic token types for syntax highlighting
#[wasm_bindgen]
pub fn get_semantic_tokens(source: &str) -> Result<JsValue, JsValue> {
    let tokens: Vec<SemanticToken> = Lexer::tokenize(source)
        .into_iter()
        .map(|t| {
            let token_type = match t.kind {
                TokenKind::Maximize
                | TokenKind::Minimize
                | TokenKind::Subject
                | TokenKind::To
                | TokenKind::Int => "keyword",
                TokenKind::Ident => "variable",
                TokenKind::Number => "number",
                TokenKind::Comment => "comment",
                TokenKind::Colon => "delimiter",
                TokenKind::LBrace | TokenKind::RBrace => "delimiter",
                TokenKind::Plus | TokenKind::Minus | TokenKind::Star => "operator",
                TokenKind::Le | TokenKind::Ge | TokenKind::Eq => "operator",
                TokenKind::Newline => "whitespace",
                TokenKind::Error | TokenKind::Eof => "error",
            };
            SemanticToken {
                start: t.span.start,
                end: t.span.end,
                token_type: token_type.to_string(),
            }
        })
        .collect();
    serde_wasm_bindgen::to_value(&tokens).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[derive(serde::Serialize)]
struct SemanticToken {
    start: usize,
    end: usize,
    token_type: String,
}

/// Compile and solve a model, returning the result as JSON
#[wasm_bindgen]
pub fn solve(source: &str) -> Result<JsValue, JsValue> {
    let model = Parser::parse(source).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let compiled = Compiler::new()
        .compile(&model)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    let report = if compiled.is_mixed_integer() {
        let solution = BranchAndBound::new()
            .solve(&compiled.problem)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        SolveReport {
            status: status_name(solution.status),
            objective: solution.objective_value,
            variables: name_values(&compiled.variables, &solution.values),
            iterations: solution.nodes_explored,
            certified: Some(solution.certified),
        }
    } else {
        let solution = Solver::new()
            .solve(compiled.lp())
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        SolveReport {
            status: status_name(solution.status),
            objective: solution.objective_value,
            variables: name_values(&compiled.variables, &solution.values),
            iterations: solution.iterations,
            certified: None,
        }
    };

    serde_wasm_bindgen::to_value(&report).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[derive(serde::Serialize)]
struct SolveReport {
    status: String,
    objective: f64,
    variables: Vec<VariableValue>,
    iterations: usize,
    certified: Option<bool>,
}

#[derive(serde::Serialize)]
struct VariableValue {
    name: String,
    value: f64,
}

fn status_name(status: SolutionStatus) -> String {
    match status {
        SolutionStatus::Optimal => "optimal",
        SolutionStatus::Infeasible => "infeasible",
        SolutionStatus::Unbounded => "unbounded",
    }
    .to_string()
}

fn name_values(names: &[String], values: &[f64]) -> Vec<VariableValue> {
    names
        .iter()
        .zip(values.iter())
        .map(|(name, &value)| VariableValue {
            name: name.clone(),
            value,
        })
        .collect()
}
