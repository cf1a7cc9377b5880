//! [`Expression`] operations.

use crate::algebra::{Expression, Operand, OperatorKind, Variable};
use smol_str::SmolStr;
use std::{
    borrow::Borrow,
    collections::{BTreeMap, HashMap},
    error::Error,
    fmt::{self, Display, Formatter},
    hash::{BuildHasher, Hash},
};

/// Contextual information used when evaluating an [`Expression`].
pub trait Context {
    /// Get the value of a named variable. Names arrive upper-cased.
    fn lookup(&self, name: &str) -> Option<f64>;
}

impl<'a, C: Context + ?Sized> Context for &'a C {
    fn lookup(&self, name: &str) -> Option<f64> { (**self).lookup(name) }
}

impl<K, S> Context for HashMap<K, f64, S>
where
    K: Borrow<str> + Hash + Eq,
    S: BuildHasher,
{
    fn lookup(&self, name: &str) -> Option<f64> { self.get(name).copied() }
}

impl<K> Context for BTreeMap<K, f64>
where
    K: Borrow<str> + Ord,
{
    fn lookup(&self, name: &str) -> Option<f64> { self.get(name).copied() }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationError {
    /// An operator without any operands has no meaningful value.
    NoOperands,
    /// The name wasn't known by the [`Context`] and isn't a number either.
    UnresolvedVariable { name: SmolStr },
}

impl Display for EvaluationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            EvaluationError::NoOperands => write!(f, "no operands"),
            EvaluationError::UnresolvedVariable { name } => {
                write!(f, "could not resolve variable \"{}\"", name)
            },
        }
    }
}

impl Error for EvaluationError {}

/// Evaluate an [`Expression`] to a single number.
///
/// Division follows the usual floating point rules, so dividing by zero
/// gives infinity or `NaN` rather than an error.
pub fn evaluate<C>(expr: &Expression, ctx: &C) -> Result<f64, EvaluationError>
where
    C: Context + ?Sized,
{
    match expr {
        Expression::Variable(v) => resolve(v, ctx),
        Expression::Addition(operands) => {
            fold(operands, 0.0, ctx, |acc, value, negated| {
                if negated {
                    acc - value
                } else {
                    acc + value
                }
            })
        },
        Expression::Multiplication(operands) => {
            fold(operands, 1.0, ctx, |acc, value, inverted| {
                if inverted {
                    acc / value
                } else {
                    acc * value
                }
            })
        },
    }
}

fn fold<C, F>(
    operands: &[Operand],
    initial: f64,
    ctx: &C,
    combine: F,
) -> Result<f64, EvaluationError>
where
    C: Context + ?Sized,
    F: Fn(f64, f64, bool) -> f64,
{
    if operands.is_empty() {
        return Err(EvaluationError::NoOperands);
    }

    operands.iter().try_fold(initial, |acc, operand| {
        let value = evaluate(&operand.expression, ctx)?;
        Ok(combine(acc, value, operand.inverted))
    })
}

fn resolve<C>(variable: &Variable, ctx: &C) -> Result<f64, EvaluationError>
where
    C: Context + ?Sized,
{
    match variable {
        Variable::Number(value) => Ok(*value),
        Variable::Named(name) => ctx
            .lookup(name)
            .or_else(|| parse_decimal(name))
            .ok_or_else(|| {
                log::debug!("Unable to resolve \"{}\"", name);
                EvaluationError::UnresolvedVariable { name: name.clone() }
            }),
    }
}

/// Parse a plain decimal number like `42`, `3.14`, `1.` or `.5`.
///
/// The decimal separator is always `.`. Signs, exponents, digit grouping,
/// `inf` and `nan` are all rejected.
pub fn parse_decimal(text: &str) -> Option<f64> {
    let mut digits = 0;
    let mut points = 0;

    for c in text.chars() {
        match c {
            '0'..='9' => digits += 1,
            '.' => points += 1,
            _ => return None,
        }
    }

    if digits == 0 || points > 1 {
        return None;
    }

    text.parse().ok()
}

/// Normalize an [`Expression`] tree.
///
/// Operators with a single, non-inverted operand are replaced by that
/// operand, and any operator nested directly inside an operator of the same
/// kind is merged into its parent. Signs are combined along the way, so
/// `a - (b - c)` becomes `a - b + c` and `a / (b / c)` becomes `a / b * c`.
pub fn simplify(expr: Expression) -> Expression {
    match expr {
        Expression::Addition(operands) => {
            simplify_operation(OperatorKind::Addition, operands)
        },
        Expression::Multiplication(operands) => {
            simplify_operation(OperatorKind::Multiplication, operands)
        },
        variable => variable,
    }
}

fn simplify_operation(
    kind: OperatorKind,
    mut operands: Vec<Operand>,
) -> Expression {
    if is_transparent(&operands) {
        return simplify(operands.remove(0).expression);
    }

    let mut flattened = Vec::with_capacity(operands.len());

    for Operand {
        expression,
        inverted,
    } in operands
    {
        // a simplified child is already flat, so its operands can be
        // spliced in directly
        match simplify(expression).into_operands_of(kind) {
            Ok(nested) => {
                flattened.extend(nested.into_iter().map(|op| {
                    Operand::new(op.expression, op.inverted ^ inverted)
                }))
            },
            Err(other) => flattened.push(Operand::new(other, inverted)),
        }
    }

    // double negatives may leave us with a redundant wrapper
    if is_transparent(&flattened) {
        return flattened.remove(0).expression;
    }

    kind.with_operands(flattened)
}

fn is_transparent(operands: &[Operand]) -> bool {
    match operands {
        [Operand {
            inverted: false, ..
        }] => true,
        _ => false,
    }
}
