pub mod ast;
pub mod compiler;
pub mod lexer;
pub mod parser;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use ast::*;
pub use compiler::{CompileError, CompiledModel, Compiler};
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{ParseError, Parser};
