//! A small calculator for arithmetic expressions.
//!
//! Text is parsed into an [`Expression`] tree (numbers, named variables,
//! `+ - * /` and parentheses) which is then flattened into a canonical form
//! and can be evaluated against any number of variable mappings.
//!
//! ```rust
//! use calculator::Variables;
//!
//! let expr = calculator::parse("2 * (radius + 1)").unwrap();
//! let vars = Variables::new().with("radius", 4.0);
//!
//! assert_eq!(expr.evaluate(&vars).unwrap(), 10.0);
//! assert_eq!(expr.to_string(), "2*(RADIUS+1)");
//! ```

#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;

pub mod algebra;
mod variables;

pub use algebra::{
    normalize, parse, Bracketed, Context, EvaluationError, Expression,
    Operand, OperatorKind, ParseError, Parser, Variable,
};
pub use variables::Variables;
