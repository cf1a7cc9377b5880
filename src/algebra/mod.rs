//! The expression tree and the algorithms that operate on it.

mod expr;
pub mod ops;
mod parse;

pub use expr::{Bracketed, Expression, Operand, OperatorKind, Variable};
pub use ops::{Context, EvaluationError};
pub use parse::{normalize, parse, ParseError, Parser, DEFAULT_MAX_DEPTH};
