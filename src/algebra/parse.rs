use crate::algebra::{Expression, Operand, Variable};
use std::{
    error::Error,
    fmt::{self, Display, Formatter},
    str::FromStr,
};

/// The default limit on how deeply parentheses may be nested.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Parse an [`Expression`] tree from some text.
///
/// Whitespace is ignored and names are case-insensitive (they get
/// upper-cased). The resulting tree has already been simplified.
pub fn parse(s: &str) -> Result<Expression, ParseError> {
    Parser::default().parse(s)
}

/// Strip all whitespace and upper-case everything else.
pub fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

impl FromStr for Expression {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> { parse(s) }
}

/// Converts text into an [`Expression`] tree.
///
/// There is no separate tokenizing pass or grammar table. The input is read
/// left to right a single time, and every operand is attached to a running
/// [`Expression::Addition`] as soon as it has been read:
///
/// - `+` and `-` append the operand to the addition
/// - `*` and `/` rewrite the addition's last operand into a
///   [`Expression::Multiplication`] (or extend it, if it already is one)
/// - a bracketed group is parsed recursively and attached as a single operand
///
/// which is enough to give multiplication precedence over addition.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Parser {
    max_depth: usize,
}

impl Parser {
    pub fn new() -> Self { Parser::default() }

    /// Reject inputs with more than `max_depth` levels of nested brackets.
    pub fn with_max_depth(self, max_depth: usize) -> Self {
        Parser { max_depth }
    }

    pub fn max_depth(&self) -> usize { self.max_depth }

    pub fn parse(&self, src: &str) -> Result<Expression, ParseError> {
        let normalized = normalize(src);
        let raw = Scanner::new(&normalized, 0, 0, self.max_depth).scan()?;
        let expr = raw.simplify();

        log::debug!("Parsed \"{}\" as {}", src, expr.bracketed());

        Ok(expr)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Parser {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Possible errors that may occur while parsing.
///
/// All indices are byte offsets into the normalized input (see
/// [`normalize()`]).
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// The first operand was preceded by `*` or `/`.
    MissingLeftOperand { operator: char, index: usize },
    /// Two operands with nothing in between (e.g. `(1)(2)`).
    MissingOperator { index: usize },
    SuccessiveOperators { operator: char, index: usize },
    TrailingOperator { operator: char, index: usize },
    UnmatchedClosingBracket { index: usize },
    /// The opening bracket at `index` was never closed.
    UnterminatedBracket { index: usize },
    InvalidCharacter { character: char, index: usize },
    /// The input (or a pair of brackets) contained nothing.
    EmptyExpression { index: usize },
    TooDeeplyNested { max_depth: usize, index: usize },
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::MissingLeftOperand { operator, index } => write!(
                f,
                "no value left of the \"{}\" at index {}",
                operator, index
            ),
            ParseError::MissingOperator { index } => {
                write!(f, "missing an operator before index {}", index)
            },
            ParseError::SuccessiveOperators { operator, index } => write!(
                f,
                "two successive operators, found \"{}\" at index {}",
                operator, index
            ),
            ParseError::TrailingOperator { operator, index } => write!(
                f,
                "trailing operator \"{}\" at index {}",
                operator, index
            ),
            ParseError::UnmatchedClosingBracket { index } => write!(
                f,
                "no matching opening bracket for the \")\" at index {}",
                index
            ),
            ParseError::UnterminatedBracket { index } => write!(
                f,
                "no matching closing bracket for the \"(\" at index {}",
                index
            ),
            ParseError::InvalidCharacter { character, index } => write!(
                f,
                "character \"{}\" at index {} not recognized",
                character, index
            ),
            ParseError::EmptyExpression { index } => {
                write!(f, "expected an expression at index {}", index)
            },
            ParseError::TooDeeplyNested { max_depth, index } => write!(
                f,
                "brackets are nested more than {} levels deep at index {}",
                max_depth, index
            ),
        }
    }
}

impl Error for ParseError {}

#[derive(Debug, Copy, Clone, PartialEq)]
enum State {
    Idle,
    /// Reading a number or variable name.
    Name { start: usize },
    /// Looking for the bracket which closes the one just before `start`.
    Bracket { start: usize, depth: usize },
}

/// The state for parsing a single level of brackets.
#[derive(Debug, Clone, PartialEq)]
struct Scanner<'a> {
    src: &'a str,
    /// Where `src` starts in the full input.
    offset: usize,
    depth: usize,
    max_depth: usize,
    state: State,
    pending_operator: Option<(char, usize)>,
    terms: Vec<Operand>,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str, offset: usize, depth: usize, max_depth: usize) -> Self {
        Scanner {
            src,
            offset,
            depth,
            max_depth,
            state: State::Idle,
            pending_operator: None,
            terms: Vec::new(),
        }
    }

    fn scan(mut self) -> Result<Expression, ParseError> {
        let src = self.src;

        for (index, c) in src.char_indices() {
            if let State::Name { start } = self.state {
                if is_name_char(c) {
                    continue;
                }

                // the name ends here, but this character still needs to be
                // handled
                self.finish_name(start, index)?;
            }

            if let State::Bracket { start, depth } = self.state {
                self.bracketed(c, index, start, depth)?;
                continue;
            }

            match c {
                c if is_name_char(c) => {
                    self.state = State::Name { start: index }
                },
                '(' => {
                    self.state = State::Bracket {
                        start: index + 1,
                        depth: 1,
                    }
                },
                ')' => {
                    return Err(ParseError::UnmatchedClosingBracket {
                        index: self.offset + index,
                    })
                },
                '+' | '-' | '*' | '/' => self.set_operator(c, index)?,
                other => {
                    return Err(ParseError::InvalidCharacter {
                        character: other,
                        index: self.offset + index,
                    })
                },
            }
        }

        match self.state {
            State::Idle => {},
            State::Name { start } => self.finish_name(start, self.src.len())?,
            State::Bracket { start, .. } => {
                return Err(ParseError::UnterminatedBracket {
                    index: self.offset + start - 1,
                })
            },
        }

        if let Some((operator, index)) = self.pending_operator {
            return Err(ParseError::TrailingOperator {
                operator,
                index: self.offset + index,
            });
        }

        if self.terms.is_empty() {
            return Err(ParseError::EmptyExpression { index: self.offset });
        }

        Ok(Expression::Addition(self.terms))
    }

    fn finish_name(&mut self, start: usize, end: usize) -> Result<(), ParseError> {
        self.state = State::Idle;
        let name = &self.src[start..end];

        self.commit(Expression::Variable(Variable::named(name)), start)
    }

    fn bracketed(
        &mut self,
        c: char,
        index: usize,
        start: usize,
        depth: usize,
    ) -> Result<(), ParseError> {
        let depth = match c {
            '(' => depth + 1,
            ')' => depth - 1,
            _ => depth,
        };

        if depth > 0 {
            self.state = State::Bracket { start, depth };
            return Ok(());
        }

        self.state = State::Idle;
        let inner = self.sub_expression(start, index)?;
        self.commit(inner, start - 1)
    }

    fn sub_expression(
        &self,
        start: usize,
        end: usize,
    ) -> Result<Expression, ParseError> {
        if self.depth >= self.max_depth {
            return Err(ParseError::TooDeeplyNested {
                max_depth: self.max_depth,
                index: self.offset + start - 1,
            });
        }

        let src = &self.src[start..end];
        log::trace!("Parsing \"{}\" at depth {}", src, self.depth + 1);

        Scanner::new(src, self.offset + start, self.depth + 1, self.max_depth)
            .scan()
    }

    fn set_operator(&mut self, c: char, index: usize) -> Result<(), ParseError> {
        if self.pending_operator.is_some() {
            return Err(ParseError::SuccessiveOperators {
                operator: c,
                index: self.offset + index,
            });
        }

        self.pending_operator = Some((c, index));
        Ok(())
    }

    /// Attach a freshly parsed operand using the pending operator.
    fn commit(
        &mut self,
        expr: Expression,
        index: usize,
    ) -> Result<(), ParseError> {
        let pending = self.pending_operator.take();
        log::trace!("Committing {} with {:?}", expr.bracketed(), pending);

        if self.terms.is_empty() {
            let negated = match pending {
                None | Some(('+', _)) => false,
                Some(('-', _)) => true,
                Some((operator, index)) => {
                    return Err(ParseError::MissingLeftOperand {
                        operator,
                        index: self.offset + index,
                    })
                },
            };
            self.terms.push(Operand::new(expr, negated));
            return Ok(());
        }

        match pending {
            None => Err(ParseError::MissingOperator {
                index: self.offset + index,
            }),
            Some(('*', _)) => {
                self.multiply(expr, false);
                Ok(())
            },
            Some(('/', _)) => {
                self.multiply(expr, true);
                Ok(())
            },
            Some((operator, _)) => {
                self.terms.push(Operand::new(expr, operator == '-'));
                Ok(())
            },
        }
    }

    /// Multiply (or divide) the most recent term by `expr`.
    fn multiply(&mut self, expr: Expression, divide: bool) {
        let last = match self.terms.last_mut() {
            Some(last) => last,
            None => return,
        };

        if let Expression::Multiplication(factors) = &mut last.expression {
            factors.push(Operand::new(expr, divide));
        } else {
            // the term keeps its sign, so "-a*b" means "-(a*b)"
            let placeholder = Expression::Addition(Vec::new());
            let left = std::mem::replace(&mut last.expression, placeholder);
            last.expression = Expression::Multiplication(vec![
                Operand::plain(left),
                Operand::new(expr, divide),
            ]);
        }
    }
}

/// Characters which make up numbers and variable names.
fn is_name_char(c: char) -> bool { c.is_ascii_alphanumeric() || c == '.' }
