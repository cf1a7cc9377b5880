use crate::algebra::ops::{self, Context, EvaluationError};
use smol_str::SmolStr;
use std::{
    fmt::{self, Display, Formatter},
    ops::{Add, Div, Mul, Neg, Sub},
};

/// An expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Variable(Variable),
    /// A sum. Inverted operands are subtracted.
    Addition(Vec<Operand>),
    /// A product. Inverted operands are divided by.
    Multiplication(Vec<Operand>),
}

impl Expression {
    pub fn named<S: Into<SmolStr>>(name: S) -> Self {
        Expression::Variable(Variable::named(name))
    }

    pub fn number(value: f64) -> Self {
        Expression::Variable(Variable::Number(value))
    }

    /// Which operator this is, if any.
    pub fn kind(&self) -> Option<OperatorKind> {
        match self {
            Expression::Variable(_) => None,
            Expression::Addition(_) => Some(OperatorKind::Addition),
            Expression::Multiplication(_) => Some(OperatorKind::Multiplication),
        }
    }

    pub fn is_operator(&self) -> bool { self.kind().is_some() }

    /// The operands of an operator, or an empty slice for a [`Variable`].
    pub fn operands(&self) -> &[Operand] {
        match self {
            Expression::Variable(_) => &[],
            Expression::Addition(operands)
            | Expression::Multiplication(operands) => operands,
        }
    }

    /// Every [`Variable`] leaf, in rendering order.
    pub fn leaves(&self) -> Box<dyn Iterator<Item = &Variable> + '_> {
        match self {
            Expression::Variable(v) => Box::new(std::iter::once(v)),
            Expression::Addition(operands)
            | Expression::Multiplication(operands) => Box::new(
                operands.iter().flat_map(|op| op.expression.leaves()),
            ),
        }
    }

    /// The names which need to be supplied by a [`Context`] before this
    /// expression can be evaluated. May contain duplicates.
    pub fn variables(&self) -> impl Iterator<Item = &str> + '_ {
        self.leaves()
            .filter(|v| !v.is_constant())
            .filter_map(Variable::name)
    }

    /// Evaluate this expression, resolving names using the [`Context`].
    pub fn evaluate<C>(&self, ctx: &C) -> Result<f64, EvaluationError>
    where
        C: Context + ?Sized,
    {
        ops::evaluate(self, ctx)
    }

    /// Flatten nested operators and remove redundant wrappers.
    pub fn simplify(self) -> Expression { ops::simplify(self) }

    /// Get an unambiguous, fully bracketed representation of this expression.
    pub fn bracketed(&self) -> Bracketed<'_> { Bracketed(self) }

    /// Unwrap the operands if this is an operator of the desired kind,
    /// otherwise hand the expression back.
    pub(crate) fn into_operands_of(
        self,
        kind: OperatorKind,
    ) -> Result<Vec<Operand>, Expression> {
        match self {
            Expression::Addition(operands)
                if kind == OperatorKind::Addition =>
            {
                Ok(operands)
            },
            Expression::Multiplication(operands)
                if kind == OperatorKind::Multiplication =>
            {
                Ok(operands)
            },
            other => Err(other),
        }
    }
}

/// The two kinds of operator node.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    Addition,
    Multiplication,
}

impl OperatorKind {
    /// Used when rendering to decide whether a child needs parentheses.
    pub fn precedence(self) -> u8 {
        match self {
            OperatorKind::Addition => 0,
            OperatorKind::Multiplication => 1,
        }
    }

    /// Create an operator node of this kind.
    pub fn with_operands(self, operands: Vec<Operand>) -> Expression {
        match self {
            OperatorKind::Addition => Expression::Addition(operands),
            OperatorKind::Multiplication => {
                Expression::Multiplication(operands)
            },
        }
    }

    fn symbol(self, inverted: bool) -> char {
        match (self, inverted) {
            (OperatorKind::Addition, false) => '+',
            (OperatorKind::Addition, true) => '-',
            (OperatorKind::Multiplication, false) => '*',
            (OperatorKind::Multiplication, true) => '/',
        }
    }
}

/// One element of an operator's operand list.
#[derive(Debug, Clone, PartialEq)]
pub struct Operand {
    pub expression: Expression,
    /// Subtract (for [`Expression::Addition`]) or divide by (for
    /// [`Expression::Multiplication`]) this operand.
    pub inverted: bool,
}

impl Operand {
    pub fn new(expression: Expression, inverted: bool) -> Self {
        Operand {
            expression,
            inverted,
        }
    }

    pub fn plain(expression: Expression) -> Self {
        Operand::new(expression, false)
    }

    pub fn inverse(expression: Expression) -> Self {
        Operand::new(expression, true)
    }
}

/// A leaf in the expression tree.
///
/// The parser only ever creates [`Variable::Named`] leaves, even for numeric
/// literals. Whether the text is a number is only decided when evaluating,
/// after the [`Context`] has had a chance to resolve it.
#[derive(Debug, Clone, PartialEq)]
pub enum Variable {
    Number(f64),
    Named(SmolStr),
}

impl Variable {
    pub fn named<S: Into<SmolStr>>(name: S) -> Self {
        Variable::Named(name.into())
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Variable::Named(name) => Some(name.as_str()),
            Variable::Number(_) => None,
        }
    }

    /// Does this leaf have a value without needing a [`Context`]?
    pub fn is_constant(&self) -> bool {
        match self {
            Variable::Number(_) => true,
            Variable::Named(name) => ops::parse_decimal(name).is_some(),
        }
    }
}

impl From<f64> for Expression {
    fn from(value: f64) -> Expression { Expression::number(value) }
}

impl From<Variable> for Expression {
    fn from(v: Variable) -> Expression { Expression::Variable(v) }
}

// define some operator overloads to make constructing an expression easier.

impl Add for Expression {
    type Output = Expression;

    fn add(self, rhs: Expression) -> Expression {
        Expression::Addition(vec![Operand::plain(self), Operand::plain(rhs)])
    }
}

impl Sub for Expression {
    type Output = Expression;

    fn sub(self, rhs: Expression) -> Expression {
        Expression::Addition(vec![Operand::plain(self), Operand::inverse(rhs)])
    }
}

impl Mul for Expression {
    type Output = Expression;

    fn mul(self, rhs: Expression) -> Expression {
        Expression::Multiplication(vec![
            Operand::plain(self),
            Operand::plain(rhs),
        ])
    }
}

impl Div for Expression {
    type Output = Expression;

    fn div(self, rhs: Expression) -> Expression {
        Expression::Multiplication(vec![
            Operand::plain(self),
            Operand::inverse(rhs),
        ])
    }
}

impl Neg for Expression {
    type Output = Expression;

    fn neg(self) -> Self::Output {
        Expression::Addition(vec![Operand::inverse(self)])
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Variable::Number(value) => write!(f, "{}", value),
            Variable::Named(name) => write!(f, "{}", name),
        }
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Variable(v) => write!(f, "{}", v),
            Expression::Addition(operands) => {
                write_operation(OperatorKind::Addition, operands, f)
            },
            Expression::Multiplication(operands) => {
                write_operation(OperatorKind::Multiplication, operands, f)
            },
        }
    }
}

fn write_operation(
    kind: OperatorKind,
    operands: &[Operand],
    f: &mut Formatter<'_>,
) -> fmt::Result {
    // there's no unary "/", so "1/x" it is
    let leading_inverse = operands.first().map_or(false, |op| op.inverted);
    if kind == OperatorKind::Multiplication && leading_inverse {
        write!(f, "1")?;
    }

    for (i, operand) in operands.iter().enumerate() {
        if i != 0 || operand.inverted {
            write!(f, "{}", kind.symbol(operand.inverted))?;
        }

        write_child(&operand.expression, kind, f)?;
    }

    Ok(())
}

fn write_child(
    expr: &Expression,
    parent: OperatorKind,
    f: &mut Formatter<'_>,
) -> fmt::Result {
    match expr.kind() {
        Some(kind) if kind.precedence() < parent.precedence() => {
            write!(f, "({})", expr)
        },
        _ => write!(f, "{}", expr),
    }
}

/// Renders an [`Expression`] with every node wrapped in square brackets and
/// every operand preceded by its operator, regardless of precedence.
///
/// ```rust
/// let expr = calculator::parse("1 - 2*x").unwrap();
/// assert_eq!(expr.bracketed().to_string(), "[+[1]-[*[2]*[X]]]");
/// ```
#[derive(Debug, Copy, Clone)]
pub struct Bracketed<'a>(&'a Expression);

impl<'a> Display for Bracketed<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let Bracketed(expr) = *self;

        match expr.kind() {
            None => write!(f, "[{}]", expr)?,
            Some(kind) => {
                write!(f, "[")?;
                for operand in expr.operands() {
                    write!(
                        f,
                        "{}{}",
                        kind.symbol(operand.inverted),
                        operand.expression.bracketed()
                    )?;
                }
                write!(f, "]")?;
            },
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> Expression { Expression::named("x") }

    #[test]
    fn display() {
        let inputs = vec![
            (Expression::number(3.0), "3"),
            (Expression::number(2.5), "2.5"),
            (x(), "x"),
            (-Expression::number(5.0), "-5"),
            (Expression::number(1.0) + Expression::number(1.0), "1+1"),
            (Expression::number(1.0) - Expression::number(1.0), "1-1"),
            (Expression::number(1.0) * Expression::number(1.0), "1*1"),
            (Expression::number(1.0) / Expression::number(1.0), "1/1"),
            (
                (Expression::number(1.0) + Expression::number(2.0))
                    / Expression::number(3.0),
                "(1+2)/3",
            ),
            (
                Expression::number(1.0)
                    - Expression::number(2.0) * Expression::number(3.0),
                "1-2*3",
            ),
            (-(x() + Expression::number(1.0)) * x(), "(-x+1)*x"),
            (
                Expression::Multiplication(vec![
                    Operand::inverse(x()),
                    Operand::plain(Expression::number(2.0)),
                ]),
                "1/x*2",
            ),
            (Expression::Addition(Vec::new()), ""),
        ];

        for (expr, should_be) in inputs {
            let got = expr.to_string();
            assert_eq!(got, should_be);
        }
    }

    #[test]
    fn bracketed_shows_every_operator() {
        let inputs = vec![
            (x(), "[x]"),
            (-x(), "[-[x]]"),
            (x() + Expression::number(2.0), "[+[x]+[2]]"),
            (
                (x() - Expression::number(1.0)) / x(),
                "[*[+[x]-[1]]/[x]]",
            ),
            // nested same-kind operators are not hidden
            (x() + (x() + x()), "[+[x]+[+[x]+[x]]]"),
        ];

        for (expr, should_be) in inputs {
            let got = expr.bracketed().to_string();
            assert_eq!(got, should_be);
        }
    }

    #[test]
    fn precedence_of_operators() {
        assert!(
            OperatorKind::Addition.precedence()
                < OperatorKind::Multiplication.precedence()
        );
        assert_eq!(x().kind(), None);
        assert_eq!((x() * x()).kind(), Some(OperatorKind::Multiplication));
    }

    #[test]
    fn only_unknown_names_are_variables() {
        let expr = Expression::named("3.5") * x()
            + Expression::number(2.0) / Expression::named("y");

        let got: Vec<_> = expr.variables().collect();

        assert_eq!(got, vec!["x", "y"]);
        assert_eq!(expr.leaves().count(), 4);
    }

    #[test]
    fn into_operands_only_unwraps_the_right_kind() {
        let sum = x() + x();

        let got = sum.clone().into_operands_of(OperatorKind::Multiplication);
        assert_eq!(got, Err(sum.clone()));

        let got = sum.into_operands_of(OperatorKind::Addition).unwrap();
        assert_eq!(got, vec![Operand::plain(x()), Operand::plain(x())]);
    }
}
